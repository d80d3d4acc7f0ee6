//! Error types for pakt operations.

use std::fmt;

/// Error type for pakt operations.
///
/// Readers surface errors only from validation ([`Value::from_data`](crate::Value::from_data));
/// traversal accessors return sentinel empty/undefined views instead of failing.
/// Encoder errors are sticky: the first one latches on the session and every
/// later write reports it again.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Array index or iterator position out of range.
    OutOfRange { index: usize, count: usize },
    /// Bad input data (malformed header, pointer out of bounds, NUL in string, ...).
    InvalidData(&'static str),
    /// Structural error while encoding (unbalanced begin/end, key outside a dict, ...).
    EncodeError(&'static str),
    /// Error parsing or producing JSON.
    JsonError(String),
    /// Unparseable data in a value (corrupt, or from some distant future).
    UnknownValue { byte: u8 },
    /// Something that should not happen.
    InternalError(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange { index, count } => {
                write!(f, "index {index} out of range (count={count})")
            }
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::EncodeError(msg) => write!(f, "encode error: {msg}"),
            Error::JsonError(msg) => write!(f, "JSON error: {msg}"),
            Error::UnknownValue { byte } => write!(f, "unknown value (first byte {byte:#04x})"),
            Error::InternalError(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for pakt operations.
pub type Result<T> = std::result::Result<T, Error>;
