use std::fmt::Display;
use serde::{de, ser};
use objpack::{DecoderError, EncodeError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Decode
    #[error("Decoding error: {0}")]
    Decode(#[from] DecoderError),
    #[error("Unexpected object: expected {expected}, found {found}")]
    UnexpectedObject { expected: &'static str, found: String },
    #[error("Integer didn't fit into target type")]
    Int,
    #[error("{0} elements left over")]
    TrailingElements(usize),
    #[error("Enum must be a string or a dict with exactly one string key")]
    Enum,
    // Encode
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Map keys and values are unbalanced")]
    Unbalanced,
    // Both
    #[error("{0}")]
    Message(String),
}

impl Error {
    pub(crate) fn unexpected(expected: &'static str, found: &objpack::Object) -> Self {
        Error::UnexpectedObject { expected, found: found.type_name().to_owned() }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(_e: std::num::TryFromIntError) -> Error {
        Error::Int
    }
}
