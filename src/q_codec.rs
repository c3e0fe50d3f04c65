//! The RFC 2047 "Q" codec.
//!
//! Text is converted to bytes in the configured charset, quoted with
//! [`SafeSet::Q_TEXT`] and wrapped as `=?charset?Q?text?=`.  By default blanks
//! are left as literal spaces; with [`QCodec::set_encode_blanks`] they are
//! written as `_` instead.  Decoding always reads `_` as a space, so words
//! produced with either setting decode the same way.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::encoded_word::{EncodedWord, Encoding};
use crate::error::Error;
use crate::quoted_printable::{self, SafeSet};

pub(crate) const DEFAULT_CHARSET: &str = "UTF-8";

/// Encodes and decodes `=?charset?Q?...?=` words.
///
/// The charset label is only resolved when a word is encoded or decoded, so
/// constructing a codec with an unknown charset succeeds and the error shows
/// up on first use.
///
/// ```
/// use q_codec::QCodec;
///
/// let mut codec = QCodec::new();
/// assert_eq!(
///     codec.encode(Some("1+1 = 2")).unwrap().as_deref(),
///     Some("=?UTF-8?Q?1+1 =3D 2?=")
/// );
///
/// codec.set_encode_blanks(true);
/// assert_eq!(
///     codec.encode(Some("1+1 = 2")).unwrap().as_deref(),
///     Some("=?UTF-8?Q?1+1_=3D_2?=")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QCodec {
    charset: String,
    encode_blanks: bool,
}

impl Default for QCodec {
    fn default() -> Self {
        QCodec::with_charset(DEFAULT_CHARSET)
    }
}

impl QCodec {
    /// A codec for UTF-8 that leaves blanks alone.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset<T: Into<String>>(charset: T) -> Self {
        QCodec {
            charset: charset.into(),
            encode_blanks: false,
        }
    }

    pub fn with_encode_blanks(mut self, encode_blanks: bool) -> Self {
        self.encode_blanks = encode_blanks;
        self
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn set_charset<T: Into<String>>(&mut self, charset: T) {
        self.charset = charset.into();
    }

    pub fn encode_blanks(&self) -> bool {
        self.encode_blanks
    }

    pub fn set_encode_blanks(&mut self, encode_blanks: bool) {
        self.encode_blanks = encode_blanks;
    }

    /// Encode `text` in the configured charset.
    pub fn encode(&self, text: Option<&str>) -> Result<Option<String>, Error> {
        self.encode_with_charset(text, &self.charset)
    }

    /// Encode `text` in `charset`, which is also the label written into the
    /// word, minus any surrounding whitespace.
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
        // Every byte is ASCII once quoted.
        let payload: String =
            quoted_printable::encode(&bytes, SafeSet::Q_TEXT, self.encode_blanks)
                .into_iter()
                .map(char::from)
                .collect();

        Ok(Some(
            EncodedWord::new(charset, Encoding::Q, &payload).to_string(),
        ))
    }

    /// Decode a `Q` encoded word back to text, using the charset it declares.
    pub fn decode(&self, word: Option<&str>) -> Result<Option<String>, Error> {
        let word = match word {
            Some(word) => EncodedWord::parse(word)?,
            None => return Ok(None),
        };

        word.expect_encoding(Encoding::Q)?;
        word.decode().map(|decoded| Some(decoded.decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::error::{DecodingError, EncodingError};

    const SWISS_GERMAN_STUFF: &str = "Gr\u{fc}ezi_z\u{e4}m\u{e4}";
    const RUSSIAN_STUFF: &str =
        "\u{412}\u{441}\u{435}\u{43c}_\u{43f}\u{440}\u{438}\u{432}\u{435}\u{442}";

    fn encode(codec: &QCodec, text: &str) -> String {
        codec.encode(Some(text)).unwrap().unwrap()
    }

    fn decode(codec: &QCodec, word: &str) -> String {
        codec.decode(Some(word)).unwrap().unwrap()
    }

    #[test]
    fn test_null_input() {
        let codec = QCodec::new();
        assert_eq!(codec.encode(None), Ok(None));
        assert_eq!(codec.decode(None), Ok(None));
        assert_eq!(codec.encode_with_charset(None, "charset"), Ok(None));
    }

    #[test]
    fn test_utf8_round_trip() {
        let codec = QCodec::with_charset("UTF-8");
        assert_eq!(
            encode(&codec, RUSSIAN_STUFF),
            "=?UTF-8?Q?=D0=92=D1=81=D0=B5=D0=BC=5F=D0=BF=D1=80=D0=B8=D0=B2=D0=B5=D1=82?="
        );
        assert_eq!(
            encode(&codec, SWISS_GERMAN_STUFF),
            "=?UTF-8?Q?Gr=C3=BCezi=5Fz=C3=A4m=C3=A4?="
        );

        assert_eq!(decode(&codec, &encode(&codec, RUSSIAN_STUFF)), RUSSIAN_STUFF);
        assert_eq!(
            decode(&codec, &encode(&codec, SWISS_GERMAN_STUFF)),
            SWISS_GERMAN_STUFF
        );
    }

    #[test]
    fn test_basic_encode_decode() {
        let codec = QCodec::new();
        let plain = "= Hello there =\r\n";
        let encoded = encode(&codec, plain);
        assert_eq!(encoded, "=?UTF-8?Q?=3D Hello there =3D=0D=0A?=");
        assert_eq!(decode(&codec, &encoded), plain);
    }

    #[test]
    fn test_unsafe_encode_decode() {
        let codec = QCodec::new();
        let plain = "?_=\r\n";
        let encoded = encode(&codec, plain);
        assert_eq!(encoded, "=?UTF-8?Q?=3F=5F=3D=0D=0A?=");
        assert_eq!(decode(&codec, &encoded), plain);
    }

    #[test]
    fn test_encode_decode_strings() {
        let codec = QCodec::new();
        assert_eq!(encode(&codec, "1+1 = 2"), "=?UTF-8?Q?1+1 =3D 2?=");
        assert_eq!(decode(&codec, "=?UTF-8?Q?1+1 =3D 2?="), "1+1 = 2");
    }

    #[test]
    fn test_invalid_encoding() {
        let codec = QCodec::with_charset("NONSENSE");
        assert_eq!(
            codec.encode(Some("Hello there!")),
            Err(Error::UnsupportedCharset {
                charset: "NONSENSE".into()
            })
        );
        assert_eq!(
            codec.decode(Some("=?NONSENSE?Q?Hello there!?=")),
            Err(Error::UnsupportedCharset {
                charset: "NONSENSE".into()
            })
        );
    }

    #[test]
    fn test_charset_override() {
        let codec = QCodec::with_charset("NONSENSE");
        assert_eq!(
            codec
                .encode_with_charset(Some("Gr\u{fc}ezi"), "ISO-8859-1")
                .unwrap()
                .unwrap(),
            "=?ISO-8859-1?Q?Gr=FCezi?="
        );
        assert_eq!(codec.charset(), "NONSENSE");
    }

    #[test]
    fn test_charset_label_is_trimmed() {
        assert_eq!(
            QCodec::new()
                .encode_with_charset(Some("x"), " utf-8 ")
                .unwrap()
                .unwrap(),
            "=?utf-8?Q?x?="
        );
    }

    #[test]
    fn test_decode_question_mark_in_payload() {
        assert_eq!(decode(&QCodec::new(), "=?UTF-8?Q?a?b?="), "a?b");
    }

    #[test]
    fn test_unknown_8bit_round_trip() {
        let codec = QCodec::with_charset("unknown-8bit");
        let word = encode(&codec, "caf\u{e9}");
        assert_eq!(word, "=?unknown-8bit?Q?caf=E9?=");
        assert_eq!(decode(&codec, &word), "caf\u{e9}");
    }

    #[test]
    fn test_unmappable_text() {
        assert_eq!(
            QCodec::with_charset("US-ASCII").encode(Some("Gr\u{fc}ezi")),
            Err(Error::Encoding(EncodingError::Unmappable {
                charset: "us-ascii".into()
            }))
        );
    }

    #[test]
    fn test_encode_decode_blanks() {
        let plain = "Mind those pesky blanks";
        let encoded1 = "=?UTF-8?Q?Mind those pesky blanks?=";
        let encoded2 = "=?UTF-8?Q?Mind_those_pesky_blanks?=";

        let mut codec = QCodec::new();
        codec.set_encode_blanks(false);
        assert_eq!(encode(&codec, plain), encoded1);
        codec.set_encode_blanks(true);
        assert_eq!(encode(&codec, plain), encoded2);
        assert_eq!(decode(&codec, encoded1), plain);
        assert_eq!(decode(&codec, encoded2), plain);
    }

    #[test]
    fn test_encode_blanks_accessors() {
        let mut codec = QCodec::new();
        assert!(!codec.encode_blanks());
        codec.set_encode_blanks(true);
        assert!(codec.encode_blanks());
        codec.set_encode_blanks(false);
        assert!(!codec.encode_blanks());
        assert!(QCodec::new().with_encode_blanks(true).encode_blanks());
    }

    #[test]
    fn test_decode_lowercase_tag() {
        assert_eq!(decode(&QCodec::new(), "=?utf-8?q?=C3=89ric?="), "\u{c9}ric");
    }

    #[test]
    fn test_decode_rejects_b() {
        assert_eq!(
            QCodec::new().decode(Some("=?UTF-8?B?Zm9v?=")),
            Err(Error::Decoding(DecodingError::UnsupportedEncoding {
                encoding: "B".into()
            }))
        );
    }

    #[test]
    fn test_decode_malformed_envelope() {
        let codec = QCodec::new();
        for word in ["foo", "=?UTF-8?Q?foo", "=?UTF-8?foo?=", "=?UTF-8?=", "=??Q?foo?="].iter() {
            assert!(
                matches!(
                    codec.decode(Some(*word)),
                    Err(Error::Decoding(DecodingError::MalformedWord { .. }))
                ),
                "{}",
                word
            );
        }
    }

    #[test]
    fn test_decode_invalid_escape() {
        let codec = QCodec::new();
        assert_eq!(
            codec.decode(Some("=?UTF-8?Q?abc=?=")),
            Err(Error::Decoding(DecodingError::InvalidQuotedPrintable {
                offset: 3
            }))
        );
        assert_eq!(
            codec.decode(Some("=?UTF-8?Q?=ZZ?=")),
            Err(Error::Decoding(DecodingError::InvalidQuotedPrintable {
                offset: 0
            }))
        );
    }

    #[test]
    fn test_decode_undecodable_bytes() {
        assert!(matches!(
            QCodec::new().decode(Some("=?UTF-8?Q?=FF?=")),
            Err(Error::Decoding(DecodingError::UndecodableBytes { .. }))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let codec: QCodec = serde_json::from_str(r#"{"encode_blanks": true}"#).unwrap();
        assert_eq!(codec, QCodec::new().with_encode_blanks(true));
        assert_eq!(
            serde_json::to_string(&QCodec::with_charset("ISO-8859-1")).unwrap(),
            r#"{"charset":"ISO-8859-1","encode_blanks":false}"#
        );
    }

    proptest! {
        #[test]
        fn test_round_trip(text in "\\PC*", blanks in any::<bool>()) {
            let codec = QCodec::new().with_encode_blanks(blanks);
            let word = codec.encode(Some(text.as_str())).unwrap();
            prop_assert_eq!(codec.decode(word.as_deref()).unwrap(), Some(text));
        }

        #[test]
        fn test_round_trip_every_charset(
            text in prop_oneof!["\\PC*", "[ -~\u{a0}-\u{ff}]*"],
            blanks in any::<bool>(),
            charset in prop_oneof![
                Just("UTF-8"),
                Just("ISO-8859-1"),
                Just("UTF-16BE"),
                Just("UTF-16LE"),
                Just("UTF-7"),
                Just("US-ASCII"),
                Just("unknown-8bit"),
            ],
        ) {
            let codec = QCodec::with_charset(charset).with_encode_blanks(blanks);
            let word = match codec.encode(Some(text.as_str())) {
                Err(Error::Encoding(_)) => return Ok(()),
                word => word.unwrap(),
            };
            prop_assert_eq!(codec.decode(word.as_deref()).unwrap(), Some(text));
        }

        #[test]
        fn test_payload_alphabet(text in "\\PC*", blanks in any::<bool>()) {
            let codec = QCodec::new().with_encode_blanks(blanks);
            let word = codec.encode(Some(text.as_str())).unwrap().unwrap();
            let payload = &word["=?UTF-8?Q?".len()..word.len() - 2];
            prop_assert!(!payload.contains('?'));
            prop_assert!(payload.bytes().all(|b| b >= b' ' && b <= b'~'));
        }
    }
}
