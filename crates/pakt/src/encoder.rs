//! Streaming encoder for pakt buffers.
//!
//! The encoder builds a buffer in a single forward pass. Scalars small enough
//! to live inside a composite slot are held as pending items of the open
//! frame; everything else is written to the output immediately and referenced
//! by a back-pointer. When a frame closes, the collection header and its child
//! slots are written, choosing narrow (2-byte) or wide (4-byte) slots by what
//! the children need.
//!
//! Errors are sticky: the first failure latches on the session, every later
//! write becomes a no-op reporting the same failure, and [`Encoder::finish`]
//! returns it. This lets callers write straight-line code and check once at
//! the end.
//!
//! ```
//! use pakt::Encoder;
//!
//! let mut enc = Encoder::new();
//! enc.begin_dict(1).unwrap();
//! enc.write_key("answer").unwrap();
//! enc.write_int(42).unwrap();
//! enc.end_dict().unwrap();
//! let data = enc.finish().unwrap();
//!
//! let root = pakt::Value::from_data(&data).unwrap();
//! assert_eq!(root.as_dict().get("answer").unwrap().as_int(), 42);
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::tag::{
    LONG_COUNT, LONG_LENGTH, SPECIAL_FALSE, SPECIAL_NULL, SPECIAL_TRUE, SPECIAL_UNDEFINED,
    TAG_ARRAY, TAG_DATA, TAG_DICT, TAG_FLOAT, TAG_INT, TAG_SHORT_INT, TAG_SPECIAL, TAG_STRING, Tag,
};
use crate::value::{Value, ValueType};
use crate::varint::write_uvarint;

/// Default output reservation for a new session.
const DEFAULT_RESERVE: usize = 256;

/// Strings shorter than this are always stored immediate, never interned.
const MIN_SHARED_STRING: usize = 2;

/// Largest encoded scalar kept pending inside a frame; anything bigger is
/// written out and referenced by pointer.
const MAX_IMMEDIATE: usize = 4;

/// A pending child of an open frame (or the finished root).
#[derive(Clone, Copy)]
enum Pending {
    /// Encoded form small enough to sit in a slot.
    Immediate { len: u8, buf: [u8; MAX_IMMEDIATE] },
    /// Absolute offset of a value already in the output (or the base).
    Written(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Array,
    Dict,
}

/// Sort form of a queued dict key. Int key aliases order before all strings.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum KeySlot {
    Int(i64),
    Str(Vec<u8>),
}

struct Frame {
    kind: Collection,
    /// Pending children; for a dict, interleaved key/value.
    items: Vec<Pending>,
    /// Dict only: sort forms parallel to the item pairs.
    keys: Vec<KeySlot>,
    /// Dict only: a key has been written and its value has not.
    expecting_value: bool,
}

/// A streaming encoder session.
///
/// Owns its output buffer exclusively from construction to [`Encoder::finish`]
/// or [`Encoder::reset`]. The string-interning table is scoped to one session
/// and never shared.
pub struct Encoder {
    out: Vec<u8>,
    frames: Vec<Frame>,
    root: Option<Pending>,
    /// Interned string bytes -> absolute offset of the stored value.
    strings: HashMap<Vec<u8>, usize>,
    unique_strings: bool,
    sort_keys: bool,
    /// Identity of the declared delta base (pointer, length).
    base: Option<(usize, usize)>,
    /// Length of the base buffer; all absolute offsets are shifted by this.
    base_len: usize,
    err: Option<Error>,
    done: bool,
}

impl Encoder {
    /// Create an encoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DEFAULT_RESERVE, true, true)
    }

    /// Create an encoder with custom options.
    ///
    /// - `reserve_size`: bytes to preallocate for the output.
    /// - `unique_strings`: write each repeated string once and reference the
    ///   first copy with a pointer. Key-pointer caching in
    ///   [`DictKey`](crate::DictKey) relies on this.
    /// - `sort_keys`: write dictionary keys in sorted order. Turning this off
    ///   means the resulting dicts only support
    ///   [`Dict::get_unsorted`](crate::Dict::get_unsorted).
    #[must_use]
    pub fn with_options(reserve_size: usize, unique_strings: bool, sort_keys: bool) -> Self {
        Self {
            out: Vec::with_capacity(reserve_size),
            frames: Vec::new(),
            root: None,
            strings: HashMap::new(),
            unique_strings,
            sort_keys,
            base: None,
            base_len: 0,
            err: None,
            done: false,
        }
    }

    /// Declare that the output will be appended to `base` (a delta write).
    ///
    /// All offsets shift past the base, and [`Encoder::write_value`] on a
    /// value inside `base` emits a single back-pointer instead of copying the
    /// subtree. The finished output is only meaningful concatenated onto
    /// `base`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EncodeError` if output has already been produced, or
    /// `Error::InvalidData` for an odd-sized base.
    pub fn set_base(&mut self, base: &[u8]) -> Result<()> {
        self.ready()?;
        if !self.out.is_empty() || self.root.is_some() || !self.frames.is_empty() {
            return Err(self.fail(Error::EncodeError("base must be set before any write")));
        }
        if base.len() % 2 != 0 {
            return Err(self.fail(Error::InvalidData("delta base has odd length")));
        }
        self.base = Some((base.as_ptr() as usize, base.len()));
        self.base_len = base.len();
        Ok(())
    }

    /// The latched error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Human-readable message for the latched error, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.err.as_ref().map(ToString::to_string)
    }

    /// Reset the session for reuse: output, frames, interning table, delta
    /// base, and any latched error are all cleared. Options are kept.
    pub fn reset(&mut self) {
        self.out.clear();
        self.frames.clear();
        self.root = None;
        self.strings.clear();
        self.base = None;
        self.base_len = 0;
        self.err = None;
        self.done = false;
    }

    // --- scalars ---

    /// Write an explicitly-stored `null`.
    pub fn write_null(&mut self) -> Result<()> {
        self.ready()?;
        self.push_scalar(&[Tag::make(TAG_SPECIAL, SPECIAL_NULL)])
    }

    /// Write the undefined marker.
    pub fn write_undefined(&mut self) -> Result<()> {
        self.ready()?;
        self.push_scalar(&[Tag::make(TAG_SPECIAL, SPECIAL_UNDEFINED)])
    }

    /// Write a boolean.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.ready()?;
        let tiny = if value { SPECIAL_TRUE } else { SPECIAL_FALSE };
        self.push_scalar(&[Tag::make(TAG_SPECIAL, tiny)])
    }

    /// Write an integer in its smallest legal form.
    pub fn write_int(&mut self, value: i64) -> Result<()> {
        self.ready()?;
        let mut buf = [0u8; 9];
        let n = put_int(&mut buf, value);
        self.push_scalar(&buf[..n])
    }

    /// Write an unsigned integer. Only values of 2^63 and up need this; the
    /// rest are routed through [`Encoder::write_int`].
    pub fn write_uint(&mut self, value: u64) -> Result<()> {
        if let Ok(v) = i64::try_from(value) {
            return self.write_int(v);
        }
        self.ready()?;
        let mut buf = [0u8; 9];
        buf[0] = Tag::make(TAG_INT, 0x08 | 0x07);
        buf[1..9].copy_from_slice(&value.to_le_bytes());
        self.push_scalar(&buf)
    }

    /// Write a 32-bit float. A finite value with no fractional part is
    /// emitted as an integer; a reader asking for a float reconstructs it
    /// losslessly.
    pub fn write_float(&mut self, value: f32) -> Result<()> {
        if let Some(i) = float_as_int(f64::from(value)) {
            return self.write_int(i);
        }
        self.ready()?;
        let mut buf = [0u8; 6];
        buf[0] = Tag::make(TAG_FLOAT, 0);
        buf[2..6].copy_from_slice(&value.to_le_bytes());
        self.push_scalar(&buf)
    }

    /// Write a 64-bit float, compressed to an integer or a 32-bit float when
    /// the value survives the narrower form exactly.
    pub fn write_double(&mut self, value: f64) -> Result<()> {
        if let Some(i) = float_as_int(value) {
            return self.write_int(i);
        }
        #[allow(clippy::float_cmp)]
        if f64::from(value as f32) == value {
            return self.write_float(value as f32);
        }
        self.ready()?;
        let mut buf = [0u8; 10];
        buf[0] = Tag::make(TAG_FLOAT, 0x08);
        buf[2..10].copy_from_slice(&value.to_le_bytes());
        self.push_scalar(&buf)
    }

    /// Write a string. Must not contain NUL bytes. With `unique_strings`, a
    /// repeat of an earlier string becomes a pointer to the first copy.
    ///
    /// Do not use this for a dictionary key; use [`Encoder::write_key`].
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_string_bytes(value.as_bytes())
    }

    pub(crate) fn write_string_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ready()?;
        let item = self.string_item(bytes, TAG_STRING)?;
        self.begin_value()?;
        self.push_item(item);
        Ok(())
    }

    /// Write a raw data (blob) value. May contain anything, including NULs;
    /// never interned.
    pub fn write_data(&mut self, bytes: &[u8]) -> Result<()> {
        self.ready()?;
        let item = self.string_item(bytes, TAG_DATA)?;
        self.begin_value()?;
        self.push_item(item);
        Ok(())
    }

    // --- composites ---

    /// Begin an array. Subsequent writes become items until
    /// [`Encoder::end_array`].
    pub fn begin_array(&mut self, reserve: usize) -> Result<()> {
        self.ready()?;
        self.begin_value()?;
        self.frames.push(Frame {
            kind: Collection::Array,
            items: Vec::with_capacity(reserve),
            keys: Vec::new(),
            expecting_value: false,
        });
        Ok(())
    }

    /// End the open array.
    pub fn end_array(&mut self) -> Result<()> {
        self.ready()?;
        match self.frames.last() {
            Some(f) if f.kind == Collection::Array => {}
            _ => return Err(self.fail(Error::EncodeError("end_array without an open array"))),
        }
        self.end_collection()
    }

    /// Begin a dictionary. Each entry is written as [`Encoder::write_key`]
    /// followed by one value, until [`Encoder::end_dict`].
    pub fn begin_dict(&mut self, reserve: usize) -> Result<()> {
        self.ready()?;
        self.begin_value()?;
        self.frames.push(Frame {
            kind: Collection::Dict,
            items: Vec::with_capacity(reserve * 2),
            keys: Vec::with_capacity(reserve),
            expecting_value: false,
        });
        Ok(())
    }

    /// Write the key for the next value of the open dictionary. Keys are
    /// interned through the same table as string values, so any key can later
    /// be matched by pointer identity.
    pub fn write_key(&mut self, key: &str) -> Result<()> {
        self.write_key_bytes(key.as_bytes())
    }

    pub(crate) fn write_key_bytes(&mut self, key: &[u8]) -> Result<()> {
        self.ready()?;
        match self.frames.last() {
            Some(f) if f.kind == Collection::Dict && !f.expecting_value => {}
            _ => return Err(self.fail(Error::EncodeError("key written outside a dictionary"))),
        }
        let item = self.string_item(key, TAG_STRING)?;
        let frame = self.frames.last_mut().expect("dict frame checked above");
        frame.items.push(item);
        frame.keys.push(KeySlot::Str(key.to_vec()));
        frame.expecting_value = true;
        Ok(())
    }

    /// Write a small-integer key alias (for external shared-key tables).
    pub fn write_int_key(&mut self, key: i64) -> Result<()> {
        self.ready()?;
        match self.frames.last() {
            Some(f) if f.kind == Collection::Dict && !f.expecting_value => {}
            _ => return Err(self.fail(Error::EncodeError("key written outside a dictionary"))),
        }
        let mut buf = [0u8; 9];
        let n = put_int(&mut buf, key);
        let item = if n <= MAX_IMMEDIATE {
            let mut ibuf = [0u8; MAX_IMMEDIATE];
            ibuf[..n].copy_from_slice(&buf[..n]);
            Pending::Immediate {
                len: n as u8,
                buf: ibuf,
            }
        } else {
            Pending::Written(self.write_raw(&buf[..n]))
        };
        let frame = self.frames.last_mut().expect("dict frame checked above");
        frame.items.push(item);
        frame.keys.push(KeySlot::Int(key));
        frame.expecting_value = true;
        Ok(())
    }

    /// End the open dictionary, sorting its keys if the session says so.
    pub fn end_dict(&mut self) -> Result<()> {
        self.ready()?;
        match self.frames.last() {
            Some(f) if f.kind == Collection::Dict => {
                if f.expecting_value {
                    return Err(self.fail(Error::EncodeError("dictionary key is missing a value")));
                }
            }
            _ => return Err(self.fail(Error::EncodeError("end_dict without an open dictionary"))),
        }
        self.end_collection()
    }

    // --- re-encoding ---

    /// Write an already-encoded value.
    ///
    /// If the value lives inside the declared delta base it is emitted as a
    /// single back-pointer; otherwise scalars are copied byte-for-byte
    /// (strings go through the interning table) and composites are rebuilt
    /// child by child.
    pub fn write_value(&mut self, value: &Value<'_>) -> Result<()> {
        self.ready()?;
        if self.value_in_base(value) {
            self.begin_value()?;
            self.push_item(Pending::Written(value.addr()));
            return Ok(());
        }
        match value.type_of() {
            ValueType::Undefined | ValueType::Null | ValueType::Bool | ValueType::Number => {
                let bytes = value.encoded_bytes();
                if bytes.is_empty() {
                    return Err(self.fail(Error::InvalidData("truncated value")));
                }
                self.push_scalar(bytes)
            }
            ValueType::String => self.write_string_bytes(value.str_bytes().unwrap_or(&[])),
            ValueType::Data => self.write_data(value.as_data()),
            ValueType::Array => {
                let arr = value.as_array();
                self.begin_array(arr.count() as usize)?;
                for item in arr.iter() {
                    self.write_value(&item)?;
                }
                self.end_array()
            }
            ValueType::Dict => {
                let dict = value.as_dict();
                self.begin_dict(dict.count() as usize)?;
                for (key, val) in dict.iter() {
                    match key.str_bytes() {
                        Some(bytes) => self.write_key_bytes(bytes)?,
                        None => self.write_int_key(key.as_int())?,
                    }
                    self.write_value(&val)?;
                }
                self.end_dict()
            }
        }
    }

    /// True if `value` points into the declared delta base buffer.
    pub(crate) fn value_in_base(&self, value: &Value<'_>) -> bool {
        match self.base {
            Some((ptr, len)) => {
                value.data().as_ptr() as usize == ptr && value.data().len() == len
            }
            None => false,
        }
    }

    // --- session end ---

    /// Finish encoding and return the buffer.
    ///
    /// Appends the trailing narrow root pointer (chaining through a wide
    /// pointer when the root is too far back for a narrow one). The encoder
    /// must be [`Encoder::reset`] before it can be used again.
    ///
    /// # Errors
    ///
    /// Returns the latched error if any write failed, or `Error::EncodeError`
    /// if collections remain open or nothing was written.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.ready()?;
        if !self.frames.is_empty() {
            return Err(self.fail(Error::EncodeError("unclosed collection at finish")));
        }
        let Some(root) = self.root.take() else {
            return Err(self.fail(Error::EncodeError("no value was written")));
        };
        let root_off = match root {
            Pending::Written(off) => off,
            Pending::Immediate { len, buf } => self.write_raw(&buf[..len as usize]),
        };
        self.pad_even();
        let mut ptr_pos = self.base_len + self.out.len();
        let mut dist = (ptr_pos - root_off) / 2;
        if dist > 0x7FFF {
            // Root is out of narrow range: write a wide pointer to it and a
            // narrow pointer to that.
            if dist > 0x7FFF_FFFF {
                return Err(self.fail(Error::EncodeError("root too distant to address")));
            }
            self.out
                .extend_from_slice(&(0x8000_0000u32 | dist as u32).to_be_bytes());
            ptr_pos += 4;
            dist = 2;
        }
        self.out
            .extend_from_slice(&(0x8000u16 | dist as u16).to_be_bytes());
        self.done = true;
        Ok(std::mem::take(&mut self.out))
    }

    // --- internals ---

    fn ready(&mut self) -> Result<()> {
        if let Some(e) = &self.err {
            return Err(e.clone());
        }
        if self.done {
            return Err(Error::EncodeError("session finished; reset before reuse"));
        }
        Ok(())
    }

    fn fail(&mut self, e: Error) -> Error {
        self.err = Some(e.clone());
        e
    }

    /// Account for the start of a value: consume the dict key state or claim
    /// the root slot.
    fn begin_value(&mut self) -> Result<()> {
        match self.frames.last_mut() {
            Some(f) if f.kind == Collection::Dict => {
                if !f.expecting_value {
                    return Err(self.fail(Error::EncodeError("dictionary value written without a key")));
                }
                f.expecting_value = false;
                Ok(())
            }
            Some(_) => Ok(()),
            None => {
                if self.root.is_some() {
                    Err(self.fail(Error::EncodeError("multiple top-level values")))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn push_item(&mut self, item: Pending) {
        match self.frames.last_mut() {
            Some(f) => f.items.push(item),
            None => self.root = Some(item),
        }
    }

    /// Route a freshly encoded scalar: small forms stay pending, the rest go
    /// to the output now.
    fn push_scalar(&mut self, bytes: &[u8]) -> Result<()> {
        self.begin_value()?;
        let item = if bytes.len() <= MAX_IMMEDIATE {
            let mut buf = [0u8; MAX_IMMEDIATE];
            buf[..bytes.len()].copy_from_slice(bytes);
            Pending::Immediate {
                len: bytes.len() as u8,
                buf,
            }
        } else {
            Pending::Written(self.write_raw(bytes))
        };
        self.push_item(item);
        Ok(())
    }

    /// Build the pending item for a string/data value, interning when
    /// allowed.
    fn string_item(&mut self, bytes: &[u8], tag: u8) -> Result<Pending> {
        if tag == TAG_STRING && bytes.contains(&0) {
            return Err(self.fail(Error::InvalidData("string contains a NUL byte")));
        }
        if tag == TAG_STRING && self.unique_strings && bytes.len() >= MIN_SHARED_STRING {
            if let Some(&off) = self.strings.get(bytes) {
                return Ok(Pending::Written(off));
            }
            let encoded = encode_str(tag, bytes);
            let off = self.write_raw(&encoded);
            self.strings.insert(bytes.to_vec(), off);
            return Ok(Pending::Written(off));
        }
        let encoded = encode_str(tag, bytes);
        if encoded.len() <= MAX_IMMEDIATE {
            let mut buf = [0u8; MAX_IMMEDIATE];
            buf[..encoded.len()].copy_from_slice(&encoded);
            Ok(Pending::Immediate {
                len: encoded.len() as u8,
                buf,
            })
        } else {
            Ok(Pending::Written(self.write_raw(&encoded)))
        }
    }

    /// Write a collection header and its slots from the popped frame.
    fn end_collection(&mut self) -> Result<()> {
        let frame = self.frames.pop().expect("frame checked by caller");
        let is_dict = frame.kind == Collection::Dict;
        let mut items = frame.items;
        if is_dict {
            if items.len() != frame.keys.len() * 2 {
                return Err(self.fail(Error::InternalError("dict frame out of balance")));
            }
            if self.sort_keys {
                let mut order: Vec<usize> = (0..frame.keys.len()).collect();
                order.sort_by(|&a, &b| frame.keys[a].cmp(&frame.keys[b]));
                let mut sorted = Vec::with_capacity(items.len());
                for &p in &order {
                    sorted.push(items[2 * p]);
                    sorted.push(items[2 * p + 1]);
                }
                items = sorted;
            }
        }
        let count = if is_dict { items.len() / 2 } else { items.len() };
        if count > u32::MAX as usize {
            return Err(self.fail(Error::EncodeError("collection count overflow")));
        }

        // Long counts spill into a varint after the header, padded to even.
        let mut extra = Vec::new();
        if count >= LONG_COUNT as usize {
            write_uvarint(&mut extra, (count - LONG_COUNT as usize) as u64);
            if extra.len() % 2 == 1 {
                extra.push(0);
            }
        }

        let pos = self.base_len + self.out.len();
        let header_abs = pos + (pos & 1);
        let slots_abs = header_abs + 2 + extra.len();

        // Narrow unless some immediate child needs more than 2 bytes or some
        // back-pointer cannot span the distance.
        let mut wide = false;
        for (i, item) in items.iter().enumerate() {
            match *item {
                Pending::Immediate { len, .. } => {
                    if len > 2 {
                        wide = true;
                        break;
                    }
                }
                Pending::Written(off) => {
                    if (slots_abs + 2 * i - off) / 2 > 0x7FFF {
                        wide = true;
                        break;
                    }
                }
            }
        }
        let width: usize = if wide { 4 } else { 2 };

        self.pad_even();
        let inline = count.min(LONG_COUNT as usize) as u32;
        let tag = if is_dict { TAG_DICT } else { TAG_ARRAY };
        let b0 = (tag << 4) | (if wide { 0x08 } else { 0 }) | ((inline >> 8) as u8 & 0x07);
        self.out.push(b0);
        self.out.push(inline as u8);
        self.out.extend_from_slice(&extra);

        for item in &items {
            let slot_abs = self.base_len + self.out.len();
            match *item {
                Pending::Immediate { len, buf } => {
                    self.out.extend_from_slice(&buf[..len as usize]);
                    for _ in len as usize..width {
                        self.out.push(0);
                    }
                }
                Pending::Written(off) => {
                    let dist = (slot_abs - off) / 2;
                    if wide {
                        if dist > 0x7FFF_FFFF {
                            return Err(self.fail(Error::EncodeError("value too distant to address")));
                        }
                        self.out
                            .extend_from_slice(&(0x8000_0000u32 | dist as u32).to_be_bytes());
                    } else {
                        self.out
                            .extend_from_slice(&(0x8000u16 | dist as u16).to_be_bytes());
                    }
                }
            }
        }

        self.push_item(Pending::Written(header_abs));
        Ok(())
    }

    /// Append a value's bytes at the next even offset, returning its absolute
    /// offset.
    fn write_raw(&mut self, bytes: &[u8]) -> usize {
        self.pad_even();
        let off = self.base_len + self.out.len();
        self.out.extend_from_slice(bytes);
        off
    }

    fn pad_even(&mut self) {
        if (self.base_len + self.out.len()) % 2 == 1 {
            self.out.push(0);
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an int in its smallest form into `buf`, returning the length.
pub(crate) fn put_int(buf: &mut [u8; 9], value: i64) -> usize {
    if (-2048..=2047).contains(&value) {
        buf[0] = Tag::make(TAG_SHORT_INT, ((value >> 8) & 0x0F) as u8);
        buf[1] = (value & 0xFF) as u8;
        2
    } else {
        let size = signed_size(value);
        buf[0] = Tag::make(TAG_INT, (size - 1) as u8);
        buf[1..1 + size].copy_from_slice(&value.to_le_bytes()[..size]);
        1 + size
    }
}

/// Bytes needed to store `value` as little-endian two's complement.
fn signed_size(value: i64) -> usize {
    for size in 1..8 {
        let shift = 64 - 8 * size as u32;
        if (value << shift) >> shift == value {
            return size;
        }
    }
    8
}

/// If a float is finite, fractionless, and fits in an i64, its exact integer.
fn float_as_int(value: f64) -> Option<i64> {
    if value.is_finite()
        && value >= -9_223_372_036_854_775_808.0
        && value < 9_223_372_036_854_775_808.0
    {
        let i = value as i64;
        #[allow(clippy::float_cmp)]
        if i as f64 == value {
            return Some(i);
        }
    }
    None
}

/// Encode a string/data header + payload.
pub(crate) fn encode_str(tag: u8, bytes: &[u8]) -> Vec<u8> {
    if bytes.len() < LONG_LENGTH as usize {
        let mut v = Vec::with_capacity(1 + bytes.len());
        v.push(Tag::make(tag, bytes.len() as u8));
        v.extend_from_slice(bytes);
        v
    } else {
        let mut v = Vec::with_capacity(2 + bytes.len());
        v.push(Tag::make(tag, LONG_LENGTH));
        write_uvarint(&mut v, bytes.len() as u64);
        v.extend_from_slice(bytes);
        v
    }
}
