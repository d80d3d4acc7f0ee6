//! Zero-copy value views over encoded buffers.
//!
//! A [`Value`] is a lightweight wrapper around a byte slice plus the offset of
//! one value's first byte. Accessors read directly from the underlying bytes
//! on demand, without allocation. Composite children that are stored as
//! back-pointers are dereferenced transparently before a view is handed out.
//!
//! # `TypedValue` Access
//!
//! Use the [`Value::typed()`] method to get a type-safe enum representation:
//!
//! ```
//! use pakt::{Value, TypedValue};
//!
//! let data = [0x00, 0x2A, 0x80, 0x01]; // short int 42 + root pointer
//! let value = Value::from_data(&data).unwrap();
//!
//! match value.typed().unwrap() {
//!     TypedValue::Int(n) => assert_eq!(n, 42),
//!     _ => panic!("expected int"),
//! }
//! ```

use std::collections::HashMap;

use crate::array::Array;
use crate::dict::Dict;
use crate::error::{Error, Result};
use crate::tag::{
    LONG_COUNT, LONG_LENGTH, SPECIAL_FALSE, SPECIAL_NULL, SPECIAL_TRUE, SPECIAL_UNDEFINED,
    TAG_ARRAY, TAG_DATA, TAG_DICT, TAG_FLOAT, TAG_INT, TAG_SHORT_INT, TAG_SPECIAL, TAG_STRING, Tag,
};
use crate::varint::read_uvarint;

/// Data types of pakt values. Basically JSON, with the addition of Data (raw
/// blob) and the Undefined marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Data,
    Array,
    Dict,
}

/// A typed view of a value for pattern matching.
#[derive(Debug, Clone)]
pub enum TypedValue<'a> {
    /// The undefined marker (also used for missing values).
    Undefined,
    /// Explicitly-stored null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (short or sized form).
    Int(i64),
    /// Unsigned integer that does not fit in `i64`.
    UInt(u64),
    /// Floating point number (32- or 64-bit payload).
    Float(f64),
    /// UTF-8 string (zero-copy reference).
    Str(&'a str),
    /// Binary data (zero-copy reference).
    Data(&'a [u8]),
    /// Array view.
    Array(Array<'a>),
    /// Dictionary view.
    Dict(Dict<'a>),
}

/// A zero-copy view into an encoded value.
///
/// This does NOT store parsed data - it stores a reference to the buffer and
/// the absolute offset of the value's first byte, and reads on demand via
/// accessor methods. Accessors are null-safe in the sense of the format:
/// malformed or mismatched types coerce to zero/empty rather than failing.
///
/// Equality compares identity (same buffer, same offset), not contents.
#[derive(Clone, Copy)]
pub struct Value<'a> {
    data: &'a [u8],
    addr: usize,
}

/// Header fields of an encoded array or dict.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompositeHeader {
    /// Entry count (pairs, for a dict).
    pub count: u32,
    /// Absolute offset of the first child slot.
    pub first: usize,
    /// True for 4-byte slots, false for 2-byte slots.
    pub wide: bool,
}

/// Parse a composite header at `addr`, including the long-count varint.
pub(crate) fn parse_composite(data: &[u8], addr: usize) -> Option<CompositeHeader> {
    let b0 = *data.get(addr)?;
    let b1 = *data.get(addr + 1)?;
    let wide = Tag::from_byte(b0).is_wide();
    let mut count = (u32::from(b0 & 0x07) << 8) | u32::from(b1);
    let mut first = addr + 2;
    if count == LONG_COUNT {
        let (extra, n) = read_uvarint(data.get(first..)?)?;
        count = count.checked_add(u32::try_from(extra).ok()?)?;
        first += n + (n & 1);
    }
    Some(CompositeHeader { count, first, wide })
}

/// Resolve the target of a back-pointer at `pos`.
///
/// Reads `width`-sized big-endian bytes, masks the flag bit, scales by 2, and
/// subtracts from `pos`. Returns `None` when truncated, zero, or out of range.
fn pointer_target(data: &[u8], pos: usize, wide: bool) -> Option<usize> {
    let off = if wide {
        let bytes: [u8; 4] = data.get(pos..pos + 4)?.try_into().ok()?;
        ((u32::from_be_bytes(bytes) & 0x7FFF_FFFF) as usize) * 2
    } else {
        let bytes: [u8; 2] = data.get(pos..pos + 2)?.try_into().ok()?;
        ((u16::from_be_bytes(bytes) & 0x7FFF) as usize) * 2
    };
    if off == 0 || off > pos {
        return None;
    }
    Some(pos - off)
}

/// Interpret the slot at `pos` as a value, resolving pointer indirection.
///
/// A pointer may target another pointer (the root chain); chained pointers are
/// always wide. Targets strictly decrease, so the walk terminates.
pub(crate) fn deref_slot(data: &[u8], pos: usize, wide: bool) -> Option<Value<'_>> {
    let b0 = *data.get(pos)?;
    if b0 & 0x80 == 0 {
        return Some(Value { data, addr: pos });
    }
    let mut target = pointer_target(data, pos, wide)?;
    while *data.get(target)? & 0x80 != 0 {
        target = pointer_target(data, target, true)?;
    }
    Some(Value { data, addr: target })
}

impl<'a> Value<'a> {
    /// Create a view at a known-good offset.
    #[inline]
    pub(crate) fn new(data: &'a [u8], addr: usize) -> Self {
        Self { data, addr }
    }

    /// View over a single encoded value's own bytes (offset 0).
    #[inline]
    pub(crate) fn from_encoded(bytes: &'a [u8]) -> Self {
        Self {
            data: bytes,
            addr: 0,
        }
    }

    /// Returns the root value of an encoded buffer, validating everything
    /// reachable from it first.
    ///
    /// The walk verifies that the trailing root pointer resolves, that every
    /// pointer offset stays inside the buffer and lands on a well-formed
    /// header at an even offset, and that composite counts and string lengths
    /// fit. It never reads out of bounds.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` on the first violation, or
    /// `Error::UnknownValue` for a header byte this format cannot produce.
    pub fn from_data(data: &'a [u8]) -> Result<Self> {
        let root = Self::root(data)?;
        let mut sizes = HashMap::new();
        validate_value(data, root.addr, &mut sizes)?;
        Ok(root)
    }

    /// Returns the root value of an encoded buffer without the validation
    /// walk. Much faster, but accessors on corrupt data will return garbage
    /// (they still never read out of bounds).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` if the trailing root pointer is missing
    /// or does not resolve.
    pub fn from_trusted_data(data: &'a [u8]) -> Result<Self> {
        Self::root(data)
    }

    fn root(data: &'a [u8]) -> Result<Self> {
        if data.len() < 2 || data.len() % 2 != 0 {
            return Err(Error::InvalidData("buffer is empty or odd-sized"));
        }
        let pos = data.len() - 2;
        if data[pos] & 0x80 == 0 {
            return Err(Error::InvalidData("missing trailing root pointer"));
        }
        deref_slot(data, pos, false)
            .ok_or(Error::InvalidData("root pointer does not resolve"))
    }

    /// Absolute offset of this value's first byte.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> usize {
        self.addr
    }

    /// The whole backing buffer.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    fn byte(&self, i: usize) -> u8 {
        self.data.get(self.addr + i).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn tag(&self) -> Tag {
        Tag::from_byte(self.byte(0))
    }

    /// Get the data type of this value.
    #[must_use]
    pub fn type_of(&self) -> ValueType {
        let t = self.tag();
        if t.is_pointer() {
            return ValueType::Undefined;
        }
        match t.tag() {
            TAG_SHORT_INT | TAG_INT | TAG_FLOAT => ValueType::Number,
            TAG_SPECIAL => match t.tiny() {
                SPECIAL_NULL => ValueType::Null,
                SPECIAL_FALSE | SPECIAL_TRUE => ValueType::Bool,
                _ => ValueType::Undefined,
            },
            TAG_STRING => ValueType::String,
            TAG_DATA => ValueType::Data,
            TAG_ARRAY => ValueType::Array,
            TAG_DICT => ValueType::Dict,
            _ => ValueType::Undefined,
        }
    }

    /// True if the value is the undefined marker.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.type_of() == ValueType::Undefined
    }

    /// True if the value is stored as an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self.tag().tag(), TAG_SHORT_INT | TAG_INT) && !self.tag().is_pointer()
    }

    /// True if the value is an unsigned integer that can only be represented
    /// natively as a `u64`. In that case `as_int` will return an incorrect
    /// (negative) value; call [`Value::as_unsigned`] instead.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        let t = self.tag();
        !t.is_pointer() && t.tag() == TAG_INT && t.int_is_unsigned()
    }

    /// True if the value is stored as a 64-bit float.
    #[must_use]
    pub fn is_double(&self) -> bool {
        let t = self.tag();
        !t.is_pointer() && t.tag() == TAG_FLOAT && t.float_is_double()
    }

    /// Coerce to boolean: false for undefined, null, false, and numeric zero,
    /// true for everything else.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        let t = self.tag();
        if t.is_pointer() {
            return false;
        }
        match t.tag() {
            TAG_SPECIAL => t.tiny() == SPECIAL_TRUE,
            TAG_SHORT_INT | TAG_INT => self.as_int() != 0,
            TAG_FLOAT => self.as_double() != 0.0,
            _ => true,
        }
    }

    /// Coerce to a signed integer. Booleans become 0/1 and floats truncate;
    /// all other types become 0.
    ///
    /// Large unsigned integers (2^63 and above) come out wrong here; check
    /// [`Value::is_unsigned`] and use [`Value::as_unsigned`] for those.
    #[must_use]
    pub fn as_int(&self) -> i64 {
        let t = self.tag();
        if t.is_pointer() {
            return 0;
        }
        match t.tag() {
            TAG_SHORT_INT => {
                let raw = (u16::from(t.tiny()) << 8) | u16::from(self.byte(1));
                i64::from(((raw << 4) as i16) >> 4)
            }
            TAG_INT => {
                let size = t.int_size();
                let mut buf = [0u8; 8];
                match self.data.get(self.addr + 1..self.addr + 1 + size) {
                    Some(payload) => buf[..size].copy_from_slice(payload),
                    None => return 0,
                }
                let raw = u64::from_le_bytes(buf);
                if t.int_is_unsigned() {
                    raw as i64
                } else {
                    let shift = 64 - 8 * size as u32;
                    ((raw as i64) << shift) >> shift
                }
            }
            TAG_FLOAT => self.as_double() as i64,
            TAG_SPECIAL => i64::from(t.tiny() == SPECIAL_TRUE),
            _ => 0,
        }
    }

    /// Coerce to an unsigned integer. Same as [`Value::as_int`] except that it
    /// correctly returns stored `u64` values of 2^63 and up.
    #[must_use]
    pub fn as_unsigned(&self) -> u64 {
        let t = self.tag();
        if !t.is_pointer() && t.tag() == TAG_INT && t.int_is_unsigned() {
            let size = t.int_size();
            let mut buf = [0u8; 8];
            match self.data.get(self.addr + 1..self.addr + 1 + size) {
                Some(payload) => buf[..size].copy_from_slice(payload),
                None => return 0,
            }
            u64::from_le_bytes(buf)
        } else {
            self.as_int() as u64
        }
    }

    /// Coerce to a 32-bit float.
    #[must_use]
    pub fn as_float(&self) -> f32 {
        self.as_double() as f32
    }

    /// Coerce to a 64-bit float. Stored integers reconstruct losslessly, so a
    /// float the encoder compressed to an integer reads back unchanged.
    #[must_use]
    pub fn as_double(&self) -> f64 {
        let t = self.tag();
        if t.is_pointer() {
            return 0.0;
        }
        match t.tag() {
            TAG_FLOAT => {
                if t.float_is_double() {
                    match self.data.get(self.addr + 2..self.addr + 10) {
                        Some(b) => f64::from_le_bytes(b.try_into().unwrap_or([0; 8])),
                        None => 0.0,
                    }
                } else {
                    match self.data.get(self.addr + 2..self.addr + 6) {
                        Some(b) => f64::from(f32::from_le_bytes(b.try_into().unwrap_or([0; 4]))),
                        None => 0.0,
                    }
                }
            }
            _ if self.is_unsigned() => self.as_unsigned() as f64,
            _ => self.as_int() as f64,
        }
    }

    /// The exact contents of a string value, or `""` for all other types (and
    /// for strings holding invalid UTF-8).
    #[must_use]
    pub fn as_string(&self) -> &'a str {
        if self.tag().is_pointer() || self.tag().tag() != TAG_STRING {
            return "";
        }
        std::str::from_utf8(self.payload().unwrap_or(&[])).unwrap_or("")
    }

    /// The exact contents of a data (blob) value, or `&[]` for other types.
    #[must_use]
    pub fn as_data(&self) -> &'a [u8] {
        if self.tag().is_pointer() || self.tag().tag() != TAG_DATA {
            return &[];
        }
        self.payload().unwrap_or(&[])
    }

    /// Raw bytes of a string value, without the UTF-8 check. `None` for other
    /// types. Dict key comparison works on these.
    pub(crate) fn str_bytes(&self) -> Option<&'a [u8]> {
        let t = self.tag();
        if t.is_pointer() || t.tag() != TAG_STRING {
            return None;
        }
        self.payload()
    }

    /// String/data payload slice after the inline or varint length.
    fn payload(&self) -> Option<&'a [u8]> {
        let tiny = self.tag().tiny();
        if tiny < LONG_LENGTH {
            self.data.get(self.addr + 1..self.addr + 1 + tiny as usize)
        } else {
            let (len, n) = read_uvarint(self.data.get(self.addr + 1..)?)?;
            let start = self.addr + 1 + n;
            self.data.get(start..start + usize::try_from(len).ok()?)
        }
    }

    /// View this value as an array. Returns the empty singleton for
    /// non-arrays, so it is always safe to iterate the result.
    #[must_use]
    pub fn as_array(&self) -> Array<'a> {
        if !self.tag().is_pointer() && self.tag().tag() == TAG_ARRAY {
            Array::new(*self)
        } else {
            Array::empty()
        }
    }

    /// View this value as a dictionary. Returns the empty singleton for
    /// non-dicts.
    #[must_use]
    pub fn as_dict(&self) -> Dict<'a> {
        if !self.tag().is_pointer() && self.tag().tag() == TAG_DICT {
            Dict::new(*self)
        } else {
            Dict::empty()
        }
    }

    /// Get a typed view of this value for pattern matching.
    ///
    /// # Errors
    ///
    /// Returns an error if the value data is truncated, a string holds
    /// invalid UTF-8, or the header byte is not one this format produces.
    pub fn typed(&self) -> Result<TypedValue<'a>> {
        let t = self.tag();
        if t.is_pointer() {
            return Err(Error::UnknownValue { byte: t.raw() });
        }
        match t.tag() {
            TAG_SHORT_INT => Ok(TypedValue::Int(self.as_int())),
            TAG_INT => {
                if self.addr + 1 + t.int_size() > self.data.len() {
                    return Err(Error::InvalidData("truncated int value"));
                }
                if t.int_is_unsigned() {
                    let u = self.as_unsigned();
                    if u > i64::MAX as u64 {
                        Ok(TypedValue::UInt(u))
                    } else {
                        Ok(TypedValue::Int(u as i64))
                    }
                } else {
                    Ok(TypedValue::Int(self.as_int()))
                }
            }
            TAG_FLOAT => {
                let size = if t.float_is_double() { 10 } else { 6 };
                if self.addr + size > self.data.len() {
                    return Err(Error::InvalidData("truncated float value"));
                }
                Ok(TypedValue::Float(self.as_double()))
            }
            TAG_SPECIAL => match t.tiny() {
                SPECIAL_NULL => Ok(TypedValue::Null),
                SPECIAL_UNDEFINED => Ok(TypedValue::Undefined),
                SPECIAL_FALSE => Ok(TypedValue::Bool(false)),
                SPECIAL_TRUE => Ok(TypedValue::Bool(true)),
                _ => Err(Error::UnknownValue { byte: t.raw() }),
            },
            TAG_STRING => {
                let bytes = self
                    .payload()
                    .ok_or(Error::InvalidData("truncated string value"))?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|_| Error::InvalidData("invalid UTF-8 in string value"))?;
                Ok(TypedValue::Str(s))
            }
            TAG_DATA => {
                let bytes = self
                    .payload()
                    .ok_or(Error::InvalidData("truncated data value"))?;
                Ok(TypedValue::Data(bytes))
            }
            TAG_ARRAY => Ok(TypedValue::Array(Array::new(*self))),
            TAG_DICT => Ok(TypedValue::Dict(Dict::new(*self))),
            _ => Err(Error::UnknownValue { byte: t.raw() }),
        }
    }

    /// Encoded byte size of this value (header through payload; for
    /// composites, header through last slot). Zero when truncated.
    #[must_use]
    pub fn data_size(&self) -> usize {
        let t = self.tag();
        if t.is_pointer() {
            return 0;
        }
        match t.tag() {
            TAG_SHORT_INT => 2,
            TAG_INT => 1 + t.int_size(),
            TAG_FLOAT => {
                if t.float_is_double() {
                    10
                } else {
                    6
                }
            }
            TAG_SPECIAL => 1,
            TAG_STRING | TAG_DATA => {
                let tiny = t.tiny();
                if tiny < LONG_LENGTH {
                    1 + tiny as usize
                } else {
                    match read_uvarint(self.data.get(self.addr + 1..).unwrap_or(&[])) {
                        Some((len, n)) => 1 + n + len as usize,
                        None => 0,
                    }
                }
            }
            TAG_ARRAY | TAG_DICT => match parse_composite(self.data, self.addr) {
                Some(h) => {
                    let slots = if t.tag() == TAG_DICT {
                        h.count as usize * 2
                    } else {
                        h.count as usize
                    };
                    let width = if h.wide { 4 } else { 2 };
                    h.first - self.addr + slots * width
                }
                None => 0,
            },
            _ => 0,
        }
    }

    /// Raw encoded bytes of this value. Empty when truncated.
    pub(crate) fn encoded_bytes(&self) -> &'a [u8] {
        self.data
            .get(self.addr..self.addr + self.data_size())
            .unwrap_or(&[])
    }
}

/// Identity comparison: same buffer and same offset.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr()) && self.addr == other.addr
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.typed() {
            Ok(TypedValue::Undefined) => write!(f, "Value::Undefined"),
            Ok(TypedValue::Null) => write!(f, "Value::Null"),
            Ok(TypedValue::Bool(b)) => write!(f, "Value::Bool({b:?})"),
            Ok(TypedValue::Int(n)) => write!(f, "Value::Int({n:?})"),
            Ok(TypedValue::UInt(n)) => write!(f, "Value::UInt({n:?})"),
            Ok(TypedValue::Float(n)) => write!(f, "Value::Float({n:?})"),
            Ok(TypedValue::Str(s)) => write!(f, "Value::Str({s:?})"),
            Ok(TypedValue::Data(b)) => write!(f, "Value::Data({b:?})"),
            Ok(TypedValue::Array(_)) => write!(f, "Value::Array(@{:#x})", self.addr),
            Ok(TypedValue::Dict(_)) => write!(f, "Value::Dict(@{:#x})", self.addr),
            Err(e) => write!(f, "Value::Invalid({e})"),
        }
    }
}

/// Validate the value at `pos`, returning its encoded size.
///
/// `sizes` memoizes already-validated composite offsets so shared subtrees are
/// walked once. Pointers only go backwards, so the walk terminates.
fn validate_value(data: &[u8], pos: usize, sizes: &mut HashMap<usize, usize>) -> Result<usize> {
    if pos % 2 != 0 {
        return Err(Error::InvalidData("value at odd offset"));
    }
    let b0 = *data
        .get(pos)
        .ok_or(Error::InvalidData("value offset out of bounds"))?;
    let t = Tag::from_byte(b0);
    if t.is_pointer() {
        return Err(Error::InvalidData("pointer where a value header was expected"));
    }
    let remaining = data.len() - pos;
    match t.tag() {
        TAG_SHORT_INT => {
            if remaining < 2 {
                return Err(Error::InvalidData("truncated short int"));
            }
            Ok(2)
        }
        TAG_INT => {
            let size = 1 + t.int_size();
            if remaining < size {
                return Err(Error::InvalidData("truncated int value"));
            }
            Ok(size)
        }
        TAG_FLOAT => {
            if t.tiny() != 0 && t.tiny() != 8 {
                return Err(Error::UnknownValue { byte: b0 });
            }
            let size = if t.float_is_double() { 10 } else { 6 };
            if remaining < size {
                return Err(Error::InvalidData("truncated float value"));
            }
            Ok(size)
        }
        TAG_SPECIAL => {
            if t.tiny() > SPECIAL_TRUE {
                return Err(Error::UnknownValue { byte: b0 });
            }
            Ok(1)
        }
        TAG_STRING | TAG_DATA => {
            let tiny = t.tiny();
            let size = if tiny < LONG_LENGTH {
                1 + tiny as usize
            } else {
                let (len, n) = read_uvarint(data.get(pos + 1..).unwrap_or(&[]))
                    .ok_or(Error::InvalidData("truncated string length"))?;
                let len =
                    usize::try_from(len).map_err(|_| Error::InvalidData("string length overflow"))?;
                1usize
                    .checked_add(n)
                    .and_then(|s| s.checked_add(len))
                    .ok_or(Error::InvalidData("string length overflow"))?
            };
            if remaining < size {
                return Err(Error::InvalidData("string payload out of bounds"));
            }
            Ok(size)
        }
        TAG_ARRAY | TAG_DICT => {
            if let Some(&size) = sizes.get(&pos) {
                return Ok(size);
            }
            let header = parse_composite(data, pos)
                .ok_or(Error::InvalidData("truncated composite header"))?;
            let slots = if t.tag() == TAG_DICT {
                (header.count as usize)
                    .checked_mul(2)
                    .ok_or(Error::InvalidData("composite count overflow"))?
            } else {
                header.count as usize
            };
            let width = if header.wide { 4 } else { 2 };
            let end = slots
                .checked_mul(width)
                .and_then(|n| header.first.checked_add(n))
                .ok_or(Error::InvalidData("composite count overflow"))?;
            if end > data.len() {
                return Err(Error::InvalidData("composite slots out of bounds"));
            }
            let size = end - pos;
            sizes.insert(pos, size);
            for i in 0..slots {
                let slot = header.first + i * width;
                validate_slot(data, slot, header.wide, sizes)?;
            }
            Ok(size)
        }
        _ => Err(Error::UnknownValue { byte: b0 }),
    }
}

/// Validate one composite slot: an inline value that fits the slot width, or
/// a back-pointer (possibly chained) to an earlier value.
fn validate_slot(
    data: &[u8],
    pos: usize,
    wide: bool,
    sizes: &mut HashMap<usize, usize>,
) -> Result<()> {
    let b0 = *data
        .get(pos)
        .ok_or(Error::InvalidData("slot out of bounds"))?;
    if b0 & 0x80 == 0 {
        let size = validate_value(data, pos, sizes)?;
        let width = if wide { 4 } else { 2 };
        if size > width {
            return Err(Error::InvalidData("inline value overflows its slot"));
        }
        return Ok(());
    }
    let mut target = pointer_target(data, pos, wide)
        .ok_or(Error::InvalidData("pointer offset out of bounds"))?;
    while *data
        .get(target)
        .ok_or(Error::InvalidData("pointer offset out of bounds"))?
        & 0x80
        != 0
    {
        target = pointer_target(data, target, true)
            .ok_or(Error::InvalidData("pointer offset out of bounds"))?;
    }
    validate_value(data, target, sizes)?;
    Ok(())
}
