//! Errors

use thiserror::Error;

/// Everything that can go wrong while encoding or decoding an encoded word.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The charset label is not known to the text-encoding service.
    #[error("unsupported charset: {}", charset)]
    UnsupportedCharset { charset: String },
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
}

impl Error {
    pub(crate) fn unsupported_charset<T: Into<String>>(charset: T) -> Self {
        Error::UnsupportedCharset {
            charset: charset.into(),
        }
    }
}

/// Text could not be converted to bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("text is not representable in {}", charset)]
    Unmappable { charset: String },
}

/// Malformed input found while decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodingError {
    #[error("invalid quoted-printable encoding at offset {}", offset)]
    InvalidQuotedPrintable { offset: usize },
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("malformed encoded word: {}", reason)]
    MalformedWord { reason: &'static str },
    #[error("cannot decode {:?} encoded content", encoding)]
    UnsupportedEncoding { encoding: String },
    #[error("bytes are not valid {}", charset)]
    UndecodableBytes { charset: String },
}
