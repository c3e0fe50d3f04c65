//! RFC 2047 encoded words for MIME headers.
//!
//! [`QCodec`] and [`BCodec`] turn text in any supported charset into a single
//! `=?charset?Q?...?=` or `=?charset?B?...?=` token and back.  The byte level
//! quoted-printable transform they share lives in [`quoted_printable`], and
//! [`decode_header`] decodes every encoded word in an unstructured header value.

mod b_codec;
mod charset;
mod encoded_word;
mod error;
mod header;
mod q_codec;
pub mod quoted_printable;

pub use self::b_codec::BCodec;
pub use self::charset::Charset;
pub use self::encoded_word::*;
pub use self::error::{DecodingError, EncodingError, Error};
pub use self::header::decode_header;
pub use self::q_codec::QCodec;

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
pub struct ReadmeDoctests;
