use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use charset::Charset as EncodingCharset;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};

use crate::error::{DecodingError, EncodingError, Error};

lazy_static::lazy_static! {
    static ref UTF7: Option<EncodingCharset> = EncodingCharset::for_label(b"UTF-7");
}

/// A character set as named in a MIME header.
///
/// Labels are resolved through the WHATWG registry in `encoding_rs`, plus the
/// handful of mail-only labels that registry does not know about.
/// Conversions in both directions are strict: text that cannot be represented
/// and bytes that are malformed are reported, never replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Charset {
    Ascii,
    Utf7,
    Unknown8Bit,
    Encoding(&'static Encoding),
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Encoding(encoding_rs::UTF_8)
    }
}

impl From<&'static Encoding> for Charset {
    fn from(enc: &'static Encoding) -> Self {
        Charset::Encoding(enc)
    }
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Ascii => "us-ascii",
            Charset::Utf7 => "utf-7",
            Charset::Unknown8Bit => "unknown-8bit",
            Charset::Encoding(encoding) => encoding.name(),
        }
    }

    /// Resolve a charset label, ignoring case and surrounding whitespace.
    pub fn for_label(label: &str) -> Result<Self, Error> {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "us-ascii" | "ascii" => return Ok(Charset::Ascii),
            "utf-7" => return Ok(Charset::Utf7),
            "unknown-8bit" => return Ok(Charset::Unknown8Bit),
            // Not a WHATWG label, but common in the wild.
            "latin-1" => return Ok(Charset::Encoding(encoding_rs::WINDOWS_1252)),
            _ => {}
        }

        match Encoding::for_label_no_replacement(normalized.as_bytes()) {
            Some(enc) => Ok(Charset::Encoding(enc)),
            None => {
                tracing::debug!(charset = label, "unsupported charset");
                Err(Error::unsupported_charset(label))
            }
        }
    }

    /// Convert text to bytes in this charset.
    pub fn encode(self, input: &str) -> Result<Cow<'_, [u8]>, EncodingError> {
        match self {
            Charset::Ascii => {
                if input.is_ascii() {
                    Ok(Cow::Borrowed(input.as_bytes()))
                } else {
                    Err(self.unmappable())
                }
            }
            // unknown-8bit is read as windows-1252, so it is written that way too.
            Charset::Unknown8Bit => {
                let (out, _, unmappable) = WINDOWS_1252.encode(input);
                if unmappable {
                    Err(self.unmappable())
                } else {
                    Ok(out)
                }
            }
            Charset::Utf7 => Ok(Cow::Owned(encode_utf7(input))),
            // encoding_rs only ever encodes UTF-16 labels as UTF-8.
            Charset::Encoding(enc) if enc == UTF_16BE => Ok(Cow::Owned(
                input.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            )),
            Charset::Encoding(enc) if enc == UTF_16LE => Ok(Cow::Owned(
                input.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            )),
            Charset::Encoding(enc) => {
                let (out, _, unmappable) = enc.encode(input);
                if unmappable {
                    Err(self.unmappable())
                } else {
                    Ok(out)
                }
            }
        }
    }

    /// Convert bytes in this charset to text. Byte order marks are not sniffed.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, DecodingError> {
        match self {
            Charset::Ascii => {
                if bytes.is_ascii() {
                    std::str::from_utf8(bytes)
                        .map(Cow::Borrowed)
                        .map_err(|_| self.undecodable())
                } else {
                    Err(self.undecodable())
                }
            }
            Charset::Unknown8Bit => Ok(WINDOWS_1252.decode_without_bom_handling(bytes).0),
            Charset::Utf7 => {
                let utf7 = UTF7.as_ref().ok_or_else(|| self.undecodable())?;
                let (out, malformed) = utf7.decode_without_bom_handling(bytes);
                if malformed {
                    Err(self.undecodable())
                } else {
                    Ok(out)
                }
            }
            Charset::Encoding(enc) => enc
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or_else(|| self.undecodable()),
        }
    }

    fn unmappable(self) -> EncodingError {
        tracing::debug!(charset = self.name(), "text not representable");
        EncodingError::Unmappable {
            charset: self.name().into(),
        }
    }

    fn undecodable(self) -> DecodingError {
        tracing::debug!(charset = self.name(), "bytes not decodable");
        DecodingError::UndecodableBytes {
            charset: self.name().into(),
        }
    }
}

// RFC 2152 set D, the optional characters of set O are base64 encoded.
fn is_utf7_direct(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z' | '0'..='9'
        | '\'' | '(' | ')' | ',' | '-' | '.' | '/' | ':' | '?'
        | ' ' | '\t' | '\r' | '\n')
}

fn encode_utf7(input: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut pending: Vec<u16> = Vec::new();

    for c in input.chars() {
        if is_utf7_direct(c) {
            flush_utf7(&mut out, &mut pending);
            out.push(c as u8);
        } else if c == '+' && pending.is_empty() {
            out.extend_from_slice(b"+-");
        } else {
            let mut units = [0u16; 2];
            pending.extend_from_slice(c.encode_utf16(&mut units));
        }
    }
    flush_utf7(&mut out, &mut pending);

    out
}

fn flush_utf7(out: &mut Vec<u8>, pending: &mut Vec<u16>) {
    if pending.is_empty() {
        return;
    }

    let bytes: Vec<u8> = pending.drain(..).flat_map(u16::to_be_bytes).collect();
    out.push(b'+');
    out.extend_from_slice(STANDARD_NO_PAD.encode(bytes).as_bytes());
    // Always terminate, so a following base64 character is never absorbed.
    out.push(b'-');
}
