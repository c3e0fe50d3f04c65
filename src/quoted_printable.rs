//! The byte level quoted-printable transform shared by every Q style codec.
//!
//! Encoding escapes every byte the active [`SafeSet`] rejects as `=XX` with
//! uppercase hex digits, and can optionally write space as `_`.  Decoding has no
//! configuration at all: `_` always becomes a space and any `=XX` escape is
//! accepted, so one decoder serves every variant.

use std::fmt;

use crate::error::DecodingError;

static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// The bytes an encoding variant may emit without escaping.
#[derive(Clone, Copy)]
pub struct SafeSet {
    predicate: fn(u8) -> bool,
}

impl SafeSet {
    /// Printable ASCII and space, except `=`, `?` and `_`.
    ///
    /// This is the set used by [`QCodec`](crate::QCodec) for unstructured text.
    pub const Q_TEXT: SafeSet = SafeSet { predicate: q_text };

    /// The RFC 2047 section 5(3) set for encoded words inside a `phrase`:
    /// letters, digits and `! * + - /`.
    pub const Q_PHRASE: SafeSet = SafeSet { predicate: q_phrase };

    /// Generic RFC 2045 quoted-printable: printable ASCII except `=`, plus tab
    /// and space.
    pub const QUOTED_PRINTABLE: SafeSet = SafeSet {
        predicate: quoted_printable,
    };

    pub const fn new(predicate: fn(u8) -> bool) -> Self {
        SafeSet { predicate }
    }

    pub fn contains(&self, byte: u8) -> bool {
        (self.predicate)(byte)
    }
}

impl fmt::Debug for SafeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes: String = (0u8..=0x7f)
            .filter(|b| self.contains(*b))
            .map(char::from)
            .collect();
        f.debug_tuple("SafeSet").field(&bytes).finish()
    }
}

fn q_text(byte: u8) -> bool {
    matches!(byte, b' '..=b'~') && !matches!(byte, b'=' | b'?' | b'_')
}

fn q_phrase(byte: u8) -> bool {
    matches!(
        byte,
        b'-' | b'!' | b'*' | b'+' | b'/' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z'
    )
}

fn quoted_printable(byte: u8) -> bool {
    matches!(byte, b'!'..=b'~' | b'\t' | b' ') && byte != b'='
}

/// `=` and `_` carry meaning to the decoder, so they are escaped whatever the
/// safe set says. Only printable ASCII, space and tab are ever literal.
fn is_literal(byte: u8, safe: &SafeSet) -> bool {
    matches!(byte, b' '..=b'~' | b'\t') && byte != b'=' && byte != b'_' && safe.contains(byte)
}

fn write_byte(out: &mut Vec<u8>, byte: u8, safe: &SafeSet, encode_blanks: bool) {
    if encode_blanks && byte == b' ' {
        out.push(b'_');
    } else if is_literal(byte, safe) {
        out.push(byte);
    } else {
        out.push(b'=');
        out.push(HEX_UPPER[usize::from(byte >> 4)]);
        out.push(HEX_UPPER[usize::from(byte & 0x0f)]);
    }
}

/// Quote `bytes`, escaping everything `safe` rejects.
///
/// With `encode_blanks` every space is written as `_` instead of going through
/// the safe set.
pub fn encode<T: AsRef<[u8]>>(bytes: T, safe: SafeSet, encode_blanks: bool) -> Vec<u8> {
    let bytes = bytes.as_ref();
    let mut out = Vec::with_capacity(bytes.len());

    for byte in bytes {
        write_byte(&mut out, *byte, &safe, encode_blanks);
    }

    out
}

/// The exact length [`encode`] would produce, without producing it.
pub fn encoded_len<T: AsRef<[u8]>>(bytes: T, safe: SafeSet, encode_blanks: bool) -> usize {
    bytes
        .as_ref()
        .iter()
        .map(|&byte| {
            if (encode_blanks && byte == b' ') || is_literal(byte, &safe) {
                1
            } else {
                3
            }
        })
        .sum()
}

/// Undo [`encode`]: `_` becomes a space and `=XX` becomes the byte `0xXX`.
///
/// Hex digits are accepted in either case.  A `=` without two hex digits after
/// it fails the whole decode.
pub fn decode<T: AsRef<[u8]>>(encoded: T) -> Result<Vec<u8>, DecodingError> {
    let encoded = encoded.as_ref();
    let mut out = Vec::with_capacity(encoded.len());
    let mut pos = 0;

    while pos < encoded.len() {
        match encoded[pos] {
            b'_' => {
                out.push(b' ');
                pos += 1;
            }
            b'=' => {
                let digits = encoded
                    .get(pos + 1..pos + 3)
                    .ok_or_else(|| invalid_escape(pos))?;
                let mut byte = [0u8; 1];
                hex::decode_to_slice(digits, &mut byte).map_err(|_| invalid_escape(pos))?;
                out.push(byte[0]);
                pos += 3;
            }
            other => {
                out.push(other);
                pos += 1;
            }
        }
    }

    Ok(out)
}

fn invalid_escape(offset: usize) -> DecodingError {
    tracing::debug!(offset, "invalid quoted-printable escape");
    DecodingError::InvalidQuotedPrintable { offset }
}

/// A quoted-printable variant: a safe set plus the blank handling policy.
///
/// Absent input passes straight through both directions.
#[derive(Debug, Clone, Copy)]
pub struct QuotedPrintable {
    pub safe: SafeSet,
    pub encode_blanks: bool,
}

impl QuotedPrintable {
    /// Generic RFC 2045 quoted-printable, blanks left as is.
    pub const RFC_2045: QuotedPrintable = QuotedPrintable {
        safe: SafeSet::QUOTED_PRINTABLE,
        encode_blanks: false,
    };

    pub const fn new(safe: SafeSet, encode_blanks: bool) -> Self {
        QuotedPrintable {
            safe,
            encode_blanks,
        }
    }

    pub fn encode(&self, bytes: Option<&[u8]>) -> Option<Vec<u8>> {
        bytes.map(|bytes| encode(bytes, self.safe, self.encode_blanks))
    }

    pub fn decode(&self, encoded: Option<&[u8]>) -> Result<Option<Vec<u8>>, DecodingError> {
        encoded.map(decode).transpose()
    }
}
