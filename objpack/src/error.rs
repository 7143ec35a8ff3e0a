use thiserror::Error;

/// Boxed error returned by user callbacks (fallback and ext hook).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A decoding failure together with the input position where it happened.
#[derive(Debug, Error)]
#[error("{inner} at input position {at}")]
pub struct DecoderError {
    #[source]
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn kind(&self) -> &DecodeError {
        &self.inner
    }

    pub fn position(&self) -> usize {
        self.at
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unexpected end of buffer while decoding")]
    Eof,
    #[error("Invalid type marker 0x{0:02x}")]
    InvalidMarker(u8),
    #[error("String slice was not valid Utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Extension type {0} found but no ext_hook was given")]
    UnexpectedExtension(i8),
    #[error("Map key must be str, found {0}")]
    NonStringKey(&'static str),
    #[error("{0} cannot be used as a map key")]
    InvalidKey(&'static str),
    #[error("{0} trailing bytes after the decoded value")]
    TrailingBytes(usize),
    #[error("Recursion limit reached")]
    RecursionLimit,
    #[error("Length {0} exceeds maximum {max}", max = usize::MAX)]
    Length(u64),
    #[error("ext_hook failed: {0}")]
    ExtHook(#[source] BoxError),
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Type is not msgpack serializable: {0}")]
    UnsupportedType(String),
    #[error("Circular reference detected")]
    CircularReference,
    #[error("Integer {0} exceeds 64-bit range")]
    IntegerOutOfRange(i128),
    #[error("Dict integer key {0} must be within the range [-2^63, 2^64-1]")]
    KeyRange(i128),
    #[error("Invalid dict key: {0}")]
    KeyType(String),
    #[error("str is not valid UTF-8: surrogates not allowed")]
    InvalidString,
    #[error("time must not have a time zone set")]
    TimeHasTzinfo,
    #[error("ndarray is not C contiguous; convert it in the fallback")]
    NdArrayNotContiguous,
    #[error("unsupported ndarray datatype: {0}")]
    NdArrayDtype(String),
    #[error("ndarray with {0} dimensions is not supported")]
    NdArrayDimension(usize),
    #[error("ndarray is malformed")]
    NdArrayMalformed,
    #[error("Ext tag {0} is outside of 0..=127")]
    InvalidExtTag(u8),
    #[error("Length {0} exceeds maximum {max}", max = u32::MAX)]
    Length(usize),
    #[error("Recursion limit reached")]
    RecursionLimit,
    #[error("fallback failed: {0}")]
    Fallback(#[source] BoxError),
}
