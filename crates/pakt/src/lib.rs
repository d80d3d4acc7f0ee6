//! pakt: a compact binary encoding for JSON-equivalent data, with zero-copy
//! reads, a single-pass streaming encoder, and a mutable overlay for editing
//! encoded trees.

pub mod array;
pub mod dict;
pub mod encoder;
pub mod error;
pub mod json;
pub mod mutable;
pub mod tag;
pub mod value;
pub(crate) mod varint;

pub use array::Array;
pub use dict::{Dict, DictKey};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use json::{encode_json, from_json, to_json};
pub use mutable::{
    MutableArray, MutableArrayRef, MutableDict, MutableDictRef, NewValue, ValueRef,
};
pub use value::{TypedValue, Value, ValueType};
