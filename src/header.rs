//! Decoding unstructured header values that contain encoded words.

use regex::Regex;

use crate::encoded_word::decode_word;
use crate::error::Error;

// No `\s` here, the regex unicode tables are not compiled in.
lazy_static::lazy_static! {
    static ref ENCODED_WORD_RE: Regex =
        Regex::new(r"=\?[^? \t\r\n]+\?[^? \t\r\n]+\?[^?]*\?=").unwrap();
}

fn is_linear_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Replace every encoded word in `header` with its decoded text.
///
/// Whitespace separating two adjacent encoded words is dropped, everything
/// else outside encoded words is kept as is.  The first word that fails to
/// decode fails the whole header.
pub fn decode_header<T: AsRef<str>>(header: T) -> Result<String, Error> {
    let header = header.as_ref();
    let mut out = String::with_capacity(header.len());
    let mut last_end = 0;
    let mut after_word = false;

    for found in ENCODED_WORD_RE.find_iter(header) {
        let gap = &header[last_end..found.start()];
        if !(after_word && gap.chars().all(is_linear_whitespace)) {
            out.push_str(gap);
        }

        out.push_str(&decode_word(found.as_str())?.decoded);
        last_end = found.end();
        after_word = true;
    }
    out.push_str(&header[last_end..]);

    Ok(out)
}
