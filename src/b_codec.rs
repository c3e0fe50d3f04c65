//! The RFC 2047 "B" encoding: base64 inside an encoded word.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::encoded_word::{EncodedWord, Encoding};
use crate::error::{DecodingError, Error};
use crate::q_codec::DEFAULT_CHARSET;

pub(crate) fn encode_b<T: AsRef<[u8]>>(bstring: T) -> String {
    STANDARD.encode(bstring)
}

pub(crate) fn encoded_len_b<T: AsRef<[u8]>>(bstring: T) -> usize {
    let len = bstring.as_ref().len();
    let groups_of_3 = len / 3;
    let leftover = len % 3;

    // 4 bytes out for each 3 bytes (or nonzero fraction thereof) in.
    let padding_len = if leftover > 0 { 4 } else { 0 };
    groups_of_3 * 4 + padding_len
}

pub(crate) fn decode_b<T: AsRef<[u8]>>(encoded: T) -> Result<Vec<u8>, DecodingError> {
    STANDARD.decode(encoded).map_err(|err| {
        tracing::debug!(error = %err, "invalid base64 payload");
        DecodingError::InvalidBase64
    })
}

/// Encodes and decodes `=?charset?B?...?=` words.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BCodec {
    charset: String,
}

impl Default for BCodec {
    fn default() -> Self {
        BCodec::with_charset(DEFAULT_CHARSET)
    }
}

impl BCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset<T: Into<String>>(charset: T) -> Self {
        BCodec {
            charset: charset.into(),
        }
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn set_charset<T: Into<String>>(&mut self, charset: T) {
        self.charset = charset.into();
    }

    pub fn encode(&self, text: Option<&str>) -> Result<Option<String>, Error> {
        self.encode_with_charset(text, &self.charset)
    }

    pub fn encode_with_charset(
        &self,
        text: Option<&str>,
        charset: &str,
    ) -> Result<Option<String>, Error> {
        let text = match text {
            Some(text) => text,
            None => return Ok(None),
        };

        let charset = charset.trim();
        let bytes = Charset::for_label(charset)?.encode(text)?;
        let payload = encode_b(&bytes);
        Ok(Some(
            EncodedWord::new(charset, Encoding::B, &payload).to_string(),
        ))
    }

    pub fn decode(&self, word: Option<&str>) -> Result<Option<String>, Error> {
        let word = match word {
            Some(word) => EncodedWord::parse(word)?,
            None => return Ok(None),
        };

        word.expect_encoding(Encoding::B)?;
        word.decode().map(|decoded| Some(decoded.decoded))
    }
}
