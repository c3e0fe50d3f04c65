//! Routines for manipulating RFC 2047 encoded words.
//!
//! An encoded word looks like this: `=?charset[*lang]?cte?encoded_string?=`.
//!
//! `charset` is a MIME charset label, resolved through [`Charset`].  `cte`
//! (Content Transfer Encoding) is either `Q` or `B`, ignoring case.  `Q` is
//! the quoted-printable variant from the [`quoted_printable`] module, `B` is
//! base64.  `lang` is the optional RFC 2231 language suffix; it is almost never
//! encountered in practice.
//!
//! [`EncodedWord`] only deals with the envelope.  The codecs in [`QCodec`] and
//! [`BCodec`] build on it, and [`decode_word`] and [`encode`] work with either
//! encoding.
//!
//! [`quoted_printable`]: crate::quoted_printable
//! [`QCodec`]: crate::QCodec
//! [`BCodec`]: crate::BCodec

use std::fmt;

use crate::b_codec;
use crate::charset::Charset;
use crate::error::{DecodingError, Error};
use crate::quoted_printable::{self, SafeSet};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Encoding {
    Q,
    B,
}

impl Encoding {
    pub fn tag(self) -> &'static str {
        match self {
            Encoding::Q => "Q",
            Encoding::B => "B",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("q") {
            Some(Encoding::Q)
        } else if tag.eq_ignore_ascii_case("b") {
            Some(Encoding::B)
        } else {
            None
        }
    }

    /// Undo the content transfer encoding of a payload.
    pub fn decode<T: AsRef<[u8]>>(self, payload: T) -> Result<Vec<u8>, DecodingError> {
        match self {
            Encoding::Q => quoted_printable::decode(payload),
            Encoding::B => b_codec::decode_b(payload),
        }
    }
}

/// The parts of an encoded word, borrowed from the text they were parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedWord<'a> {
    pub charset: &'a str,
    pub lang: Option<&'a str>,
    /// The content transfer encoding tag, as written.
    pub tag: &'a str,
    pub payload: &'a str,
}

fn malformed(reason: &'static str) -> DecodingError {
    tracing::debug!(reason, "malformed encoded word");
    DecodingError::MalformedWord { reason }
}

fn split_token(s: &str) -> Option<(&str, &str)> {
    s.find('?').map(|index| (&s[..index], &s[index + 1..]))
}

impl<'a> EncodedWord<'a> {
    pub fn new(charset: &'a str, encoding: Encoding, payload: &'a str) -> Self {
        EncodedWord {
            charset,
            lang: None,
            tag: encoding.tag(),
            payload,
        }
    }

    pub fn with_lang(mut self, lang: Option<&'a str>) -> Self {
        self.lang = lang;
        self
    }

    /// Split an encoded word into its parts.
    ///
    /// Only the envelope is checked here; neither the charset nor the encoding
    /// tag have to be known.  The payload is everything after the third `?` up
    /// to the closing `?=`.
    pub fn parse(word: &'a str) -> Result<Self, DecodingError> {
        let inner = word
            .strip_prefix("=?")
            .and_then(|rest| rest.strip_suffix("?="))
            .ok_or_else(|| malformed("expected =?charset?cte?text?="))?;

        let (charset, rest) =
            split_token(inner).ok_or_else(|| malformed("charset token not found"))?;
        let (tag, payload) =
            split_token(rest).ok_or_else(|| malformed("encoding token not found"))?;

        let (charset, lang) = match charset.find('*') {
            Some(index) => (&charset[..index], Some(&charset[index + 1..])),
            None => (charset, None),
        };
        if charset.is_empty() {
            return Err(malformed("charset not specified"));
        }
        if !payload.is_ascii() {
            return Err(malformed("encoded text is not ASCII"));
        }

        tracing::trace!(charset, tag, len = payload.len(), "parsed encoded word");
        Ok(EncodedWord {
            charset,
            lang,
            tag,
            payload,
        })
    }

    pub fn encoding(&self) -> Result<Encoding, DecodingError> {
        Encoding::from_tag(self.tag).ok_or_else(|| {
            tracing::debug!(encoding = self.tag, "unsupported content transfer encoding");
            DecodingError::UnsupportedEncoding {
                encoding: self.tag.into(),
            }
        })
    }

    /// Fail unless this word uses `expected`.
    pub fn expect_encoding(&self, expected: Encoding) -> Result<(), DecodingError> {
        match self.encoding()? {
            found if found == expected => Ok(()),
            _ => Err(DecodingError::UnsupportedEncoding {
                encoding: self.tag.into(),
            }),
        }
    }

    /// Decode the payload and then the resulting bytes in the declared charset.
    pub fn decode(&self) -> Result<DecodedWord, Error> {
        let encoding = self.encoding()?;
        let charset = Charset::for_label(self.charset)?;
        let bytes = encoding.decode(self.payload)?;
        let decoded = charset.decode(&bytes)?.into_owned();

        Ok(DecodedWord {
            decoded,
            charset,
            lang: self.lang.unwrap_or_default().into(),
            encoding,
        })
    }
}

impl fmt::Display for EncodedWord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lang {
            Some(lang) => write!(
                f,
                "=?{}*{}?{}?{}?=",
                self.charset, lang, self.tag, self.payload
            ),
            None => write!(f, "=?{}?{}?{}?=", self.charset, self.tag, self.payload),
        }
    }
}

/// The result from decoding an encoded word.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWord {
    pub decoded: String,
    pub charset: Charset,
    pub lang: String,
    pub encoding: Encoding,
}

/// Decode an encoded word in either encoding.
///
/// The charset and language are returned along with the text.  The default
/// for language, which is rarely if ever encountered, is the empty string.
pub fn decode_word<T: AsRef<str>>(ew: T) -> Result<DecodedWord, Error> {
    EncodedWord::parse(ew.as_ref())?.decode()
}

/// Flags for types of header encodings
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EncodingFlag {
    /// Quoted printable encoding.
    QuotedPrintable,
    /// Base64 encoding.
    Base64,
    /// The shorter of `QuotedPrintable` or `Base64`.
    Shortest,
}

/// Encode a string as a single encoded word.
///
/// The string is converted to bytes in `charset` first, and the label is
/// written into the word without surrounding whitespace.  `Q` encoding here uses the strict phrase
/// safe set and writes blanks as `_`, so the result is usable anywhere in a
/// header.  With [`EncodingFlag::Shortest`] the encoding producing the shorter
/// payload is chosen, except that `Q` is preferred if it is up to five
/// characters longer.  `lang` adds an RFC 2231 language suffix.
pub fn encode<T: AsRef<str>>(
    text: T,
    charset: &str,
    encoding_flag: EncodingFlag,
    lang: Option<&str>,
) -> Result<String, Error> {
    let charset = charset.trim();
    let bstring = Charset::for_label(charset)?.encode(text.as_ref())?;

    let encoding = match encoding_flag {
        EncodingFlag::Base64 => Encoding::B,
        EncodingFlag::QuotedPrintable => Encoding::Q,
        EncodingFlag::Shortest => {
            let q_len = quoted_printable::encoded_len(&bstring, SafeSet::Q_PHRASE, true);
            let b_len = b_codec::encoded_len_b(&bstring);

            // Bias toward q. 5 is arbitrary.
            if q_len < b_len + 5 {
                Encoding::Q
            } else {
                Encoding::B
            }
        }
    };

    let payload: String = match encoding {
        Encoding::Q => quoted_printable::encode(&bstring, SafeSet::Q_PHRASE, true)
            .into_iter()
            .map(char::from)
            .collect(),
        Encoding::B => b_codec::encode_b(&bstring),
    };

    Ok(EncodedWord::new(charset, encoding, &payload)
        .with_lang(lang)
        .to_string())
}
