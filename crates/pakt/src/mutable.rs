//! Mutable overlay for editing encoded trees.
//!
//! Encoded buffers are never mutated in place. Instead, a changed collection
//! is shadowed by a heap-resident [`MutableArray`] or [`MutableDict`] whose
//! slots either hold a scalar inline (in the same tag layout as encoded
//! values), own a reference-counted heap value (a long string/blob or a
//! nested mutable collection), or reference an unchanged subtree of the
//! original buffer. Re-encoding a mixed tree with [`MutableArray::write_to`]
//! / [`MutableDict::write_to`] copies what changed and, for delta writes,
//! emits single back-pointers to what did not.
//!
//! Handles are `Rc<RefCell<...>>`: the overlay is single-threaded by
//! contract, so ref counts need not be atomic. Cycles are refused at
//! assignment time.
//!
//! ```
//! use pakt::{Encoder, MutableDict, Value};
//!
//! let mut enc = Encoder::new();
//! enc.begin_dict(1).unwrap();
//! enc.write_key("n").unwrap();
//! enc.write_int(1).unwrap();
//! enc.end_dict().unwrap();
//! let data = enc.finish().unwrap();
//!
//! let root = Value::from_data(&data).unwrap();
//! let mut dict = MutableDict::from_dict(&root.as_dict(), true).unwrap();
//! dict.set("n", 2).unwrap();
//! assert_eq!(dict.get("n").as_value().unwrap().as_int(), 2);
//! assert!(dict.is_changed());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::array::Array;
use crate::dict::Dict;
use crate::encoder::{Encoder, encode_str, put_int};
use crate::error::{Error, Result};
use crate::tag::{
    SPECIAL_FALSE, SPECIAL_NULL, SPECIAL_TRUE, SPECIAL_UNDEFINED, TAG_DATA, TAG_FLOAT, TAG_INT,
    TAG_SPECIAL, TAG_STRING, Tag,
};
use crate::value::{Value, ValueType};

/// Inline capacity of a mutable slot, in bytes. Covers every number form
/// (the largest is a 10-byte double) and strings up to 13 bytes.
const INLINE_CAPACITY: usize = 14;

/// Shared handle to a mutable array.
pub type MutableArrayRef<'a> = Rc<RefCell<MutableArray<'a>>>;
/// Shared handle to a mutable dict.
pub type MutableDictRef<'a> = Rc<RefCell<MutableDict<'a>>>;

/// One slot of a mutable collection.
#[derive(Clone)]
enum MutValue<'a> {
    /// Scalar encoded inline, same tag layout as stored values.
    Inline { len: u8, buf: [u8; INLINE_CAPACITY] },
    /// Ref-counted heap copy of an encoded scalar too big to inline.
    HeapScalar(Rc<[u8]>),
    /// Nested mutable array.
    Array(MutableArrayRef<'a>),
    /// Nested mutable dict.
    Dict(MutableDictRef<'a>),
    /// Unchanged value in the original buffer.
    Source(Value<'a>),
}

/// A value to store into a mutable collection.
///
/// Conversions exist for the common Rust types, so `dict.set("n", 2)` and
/// `arr.push("text")` read naturally.
pub enum NewValue<'a> {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Str(String),
    Data(Vec<u8>),
    /// Copy of an encoded value (small scalars are inlined, the rest stay
    /// references into their buffer).
    Value(Value<'a>),
    Array(MutableArrayRef<'a>),
    Dict(MutableDictRef<'a>),
}

impl From<bool> for NewValue<'_> {
    fn from(v: bool) -> Self {
        NewValue::Bool(v)
    }
}
impl From<i32> for NewValue<'_> {
    fn from(v: i32) -> Self {
        NewValue::Int(i64::from(v))
    }
}
impl From<i64> for NewValue<'_> {
    fn from(v: i64) -> Self {
        NewValue::Int(v)
    }
}
impl From<u64> for NewValue<'_> {
    fn from(v: u64) -> Self {
        NewValue::UInt(v)
    }
}
impl From<f32> for NewValue<'_> {
    fn from(v: f32) -> Self {
        NewValue::Float(v)
    }
}
impl From<f64> for NewValue<'_> {
    fn from(v: f64) -> Self {
        NewValue::Double(v)
    }
}
impl From<&str> for NewValue<'_> {
    fn from(v: &str) -> Self {
        NewValue::Str(v.to_string())
    }
}
impl From<String> for NewValue<'_> {
    fn from(v: String) -> Self {
        NewValue::Str(v)
    }
}
impl<'a> From<Value<'a>> for NewValue<'a> {
    fn from(v: Value<'a>) -> Self {
        NewValue::Value(v)
    }
}
impl<'a> From<MutableArrayRef<'a>> for NewValue<'a> {
    fn from(v: MutableArrayRef<'a>) -> Self {
        NewValue::Array(v)
    }
}
impl<'a> From<MutableDictRef<'a>> for NewValue<'a> {
    fn from(v: MutableDictRef<'a>) -> Self {
        NewValue::Dict(v)
    }
}

/// A non-owning view of a slot, indistinguishable from a view into encoded
/// data: scalar and unchanged-subtree slots come out as plain [`Value`]s.
pub enum ValueRef<'s, 'a> {
    /// Missing entry or out-of-range index.
    Undefined,
    /// Scalar or immutable composite, viewed as encoded bytes.
    Value(Value<'s>),
    /// Nested mutable array (shared handle).
    Array(MutableArrayRef<'a>),
    /// Nested mutable dict (shared handle).
    Dict(MutableDictRef<'a>),
}

impl<'s, 'a> ValueRef<'s, 'a> {
    /// Data type of the referenced value.
    #[must_use]
    pub fn type_of(&self) -> ValueType {
        match self {
            ValueRef::Undefined => ValueType::Undefined,
            ValueRef::Value(v) => v.type_of(),
            ValueRef::Array(_) => ValueType::Array,
            ValueRef::Dict(_) => ValueType::Dict,
        }
    }

    /// The plain encoded view, when this is not a mutable collection.
    #[must_use]
    pub fn as_value(&self) -> Option<Value<'s>> {
        match self {
            ValueRef::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// True when the entry was missing.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, ValueRef::Undefined)
    }

    /// Coerce to an integer; collections and missing values become 0.
    #[must_use]
    pub fn as_int(&self) -> i64 {
        self.as_value().map_or(0, |v| v.as_int())
    }

    /// Coerce to a boolean, with the encoded-value rules.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            ValueRef::Undefined => false,
            ValueRef::Value(v) => v.as_bool(),
            _ => true,
        }
    }

    /// Coerce to a double; collections and missing values become 0.
    #[must_use]
    pub fn as_double(&self) -> f64 {
        self.as_value().map_or(0.0, |v| v.as_double())
    }

    /// String contents, or `""` for anything that is not a string.
    #[must_use]
    pub fn as_string(&self) -> &'s str {
        match self {
            ValueRef::Value(v) => v.as_string(),
            _ => "",
        }
    }
}

/// Heap-resident editable shadow of an array.
pub struct MutableArray<'a> {
    slots: Vec<MutValue<'a>>,
    /// The immutable value this was copied from, for delta re-encoding.
    source: Option<Value<'a>>,
    changed: bool,
}

impl<'a> MutableArray<'a> {
    /// Create an empty mutable array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            source: None,
            changed: false,
        }
    }

    /// Shallow-copy an encoded array. Children stay shared with the buffer
    /// (small scalars are copied inline).
    #[must_use]
    pub fn from_array(array: &Array<'a>) -> Self {
        let slots = (0..array.count())
            .map(|i| match array.get(i) {
                Some(v) => value_slot(v),
                None => undefined_slot(),
            })
            .collect();
        Self {
            slots,
            source: Some(array.value()),
            changed: false,
        }
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> MutableArrayRef<'a> {
        Rc::new(RefCell::new(self))
    }

    /// Number of items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// True if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True iff any slot has been assigned since construction.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Get the item at an index; out of range yields the undefined sentinel.
    #[must_use]
    pub fn get(&self, index: usize) -> ValueRef<'_, 'a> {
        match self.slots.get(index) {
            Some(slot) => slot_ref(slot),
            None => ValueRef::Undefined,
        }
    }

    /// Replace the item at an index.
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` for a bad index, `Error::InvalidData` if the new
    /// value transitively contains this array.
    pub fn set(&mut self, index: usize, value: impl Into<NewValue<'a>>) -> Result<()> {
        if index >= self.slots.len() {
            return Err(Error::OutOfRange {
                index,
                count: self.slots.len(),
            });
        }
        let slot = self.guarded_slot(value.into())?;
        self.slots[index] = slot;
        self.changed = true;
        Ok(())
    }

    /// Append an item.
    ///
    /// # Errors
    ///
    /// `Error::InvalidData` if the value transitively contains this array.
    pub fn push(&mut self, value: impl Into<NewValue<'a>>) -> Result<()> {
        let slot = self.guarded_slot(value.into())?;
        self.slots.push(slot);
        self.changed = true;
        Ok(())
    }

    /// Insert an item at an index, shifting the rest up.
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` if `index > count`, `Error::InvalidData` on a
    /// cycle.
    pub fn insert(&mut self, index: usize, value: impl Into<NewValue<'a>>) -> Result<()> {
        if index > self.slots.len() {
            return Err(Error::OutOfRange {
                index,
                count: self.slots.len(),
            });
        }
        let slot = self.guarded_slot(value.into())?;
        self.slots.insert(index, slot);
        self.changed = true;
        Ok(())
    }

    /// Remove the item at an index.
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` for a bad index.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.slots.len() {
            return Err(Error::OutOfRange {
                index,
                count: self.slots.len(),
            });
        }
        self.slots.remove(index);
        self.changed = true;
        Ok(())
    }

    /// Get the item at `index` as a mutable array, promoting an encoded array
    /// child to a fresh mutable copy in place. Returns `None` if the item is
    /// not an array.
    pub fn get_mutable_array(&mut self, index: usize) -> Option<MutableArrayRef<'a>> {
        let promote = match self.slots.get(index)? {
            MutValue::Array(rc) => return Some(rc.clone()),
            MutValue::Source(v) if v.type_of() == ValueType::Array => *v,
            _ => return None,
        };
        let rc = MutableArray::from_array(&promote.as_array()).into_ref();
        self.slots[index] = MutValue::Array(rc.clone());
        self.changed = true;
        Some(rc)
    }

    /// Get the item at `index` as a mutable dict, promoting an encoded dict
    /// child in place. Returns `None` if the item is not a dict.
    pub fn get_mutable_dict(&mut self, index: usize) -> Option<MutableDictRef<'a>> {
        let promote = match self.slots.get(index)? {
            MutValue::Dict(rc) => return Some(rc.clone()),
            MutValue::Source(v) if v.type_of() == ValueType::Dict => *v,
            _ => return None,
        };
        let rc = MutableDict::from_dict_lenient(&promote.as_dict()).into_ref();
        self.slots[index] = MutValue::Dict(rc.clone());
        self.changed = true;
        Some(rc)
    }

    /// Re-encode this (possibly mixed) tree.
    ///
    /// An unchanged array whose source lives in the encoder's delta base is
    /// emitted as a single back-pointer; otherwise the array is opened as a
    /// composite and its slots written in order.
    pub fn write_to(&self, enc: &mut Encoder) -> Result<()> {
        if !self.changed
            && let Some(src) = self.source
            && enc.value_in_base(&src)
        {
            return enc.write_value(&src);
        }
        enc.begin_array(self.slots.len())?;
        for slot in &self.slots {
            write_slot(slot, enc)?;
        }
        enc.end_array()
    }

    fn guarded_slot(&self, value: NewValue<'a>) -> Result<MutValue<'a>> {
        let slot = make_slot(value);
        let target = std::ptr::from_ref(self).cast::<()>();
        if slot_contains(&slot, target) {
            return Err(Error::InvalidData("value would contain the collection it is stored in"));
        }
        Ok(slot)
    }
}

impl Default for MutableArray<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Heap-resident editable shadow of a dict. Keys are strings; a dict built
/// from a sorted source (or from scratch) keeps its entries in unsigned
/// lexicographic key order across every mutation.
pub struct MutableDict<'a> {
    entries: Vec<(String, MutValue<'a>)>,
    source: Option<Value<'a>>,
    sorted: bool,
    changed: bool,
}

impl<'a> MutableDict<'a> {
    /// Create an empty mutable dict (sorted).
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            source: None,
            sorted: true,
            changed: false,
        }
    }

    /// Shallow-copy an encoded dict.
    ///
    /// The tag layout does not record key order, so the caller states whether
    /// the source was written with sorted keys; an unsorted overlay keeps
    /// insertion order and uses linear lookup.
    ///
    /// # Errors
    ///
    /// `Error::InvalidData` when a key is not a UTF-8 string (int key aliases
    /// belong to external shared-key tables, not the overlay).
    pub fn from_dict(dict: &Dict<'a>, sorted: bool) -> Result<Self> {
        let mut entries = Vec::with_capacity(dict.count() as usize);
        for (key, value) in dict.iter() {
            let Some(bytes) = key.str_bytes() else {
                return Err(Error::InvalidData("dictionary key is not a string"));
            };
            let key = std::str::from_utf8(bytes)
                .map_err(|_| Error::InvalidData("dictionary key is not a string"))?;
            entries.push((key.to_string(), value_slot(value)));
        }
        Ok(Self {
            entries,
            source: Some(dict.value()),
            sorted,
            changed: false,
        })
    }

    /// `from_dict` for promotion paths: assumes sorted keys (the encoder
    /// default) and drops entries with non-string keys instead of failing.
    fn from_dict_lenient(dict: &Dict<'a>) -> Self {
        let mut entries = Vec::with_capacity(dict.count() as usize);
        for (key, value) in dict.iter() {
            if let Some(bytes) = key.str_bytes()
                && let Ok(key) = std::str::from_utf8(bytes)
            {
                entries.push((key.to_string(), value_slot(value)));
            }
        }
        Self {
            entries,
            source: Some(dict.value()),
            sorted: true,
            changed: false,
        }
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> MutableDictRef<'a> {
        Rc::new(RefCell::new(self))
    }

    /// Number of entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff any entry has been assigned since construction.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    fn find(&self, key: &str) -> std::result::Result<usize, usize> {
        if self.sorted {
            self.entries
                .binary_search_by(|(k, _)| k.as_str().cmp(key))
        } else {
            match self.entries.iter().position(|(k, _)| k == key) {
                Some(i) => Ok(i),
                None => Err(self.entries.len()),
            }
        }
    }

    /// Get the value for a key; missing keys yield the undefined sentinel.
    #[must_use]
    pub fn get(&self, key: &str) -> ValueRef<'_, 'a> {
        match self.find(key) {
            Ok(i) => slot_ref(&self.entries[i].1),
            Err(_) => ValueRef::Undefined,
        }
    }

    /// Set the value for a key: an existing key is updated in place, a new
    /// one is inserted at its lexicographic position (in a sorted dict).
    ///
    /// # Errors
    ///
    /// `Error::InvalidData` if the value transitively contains this dict.
    pub fn set(&mut self, key: &str, value: impl Into<NewValue<'a>>) -> Result<()> {
        let slot = self.guarded_slot(value.into())?;
        match self.find(key) {
            Ok(i) => self.entries[i].1 = slot,
            Err(i) => self.entries.insert(i, (key.to_string(), slot)),
        }
        self.changed = true;
        Ok(())
    }

    /// Conditional insert: the callback receives the existing value (or the
    /// undefined sentinel) and may return a replacement to commit. Returning
    /// `None` leaves the dict untouched.
    ///
    /// Returns whether a change was committed.
    ///
    /// # Errors
    ///
    /// Same as [`MutableDict::set`].
    pub fn insert<F>(&mut self, key: &str, f: F) -> Result<bool>
    where
        F: FnOnce(ValueRef<'_, 'a>) -> Option<NewValue<'a>>,
    {
        let existing = match self.find(key) {
            Ok(i) => slot_ref(&self.entries[i].1),
            Err(_) => ValueRef::Undefined,
        };
        match f(existing) {
            Some(value) => {
                self.set(key, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.find(key) {
            Ok(i) => {
                self.entries.remove(i);
                self.changed = true;
                true
            }
            Err(_) => false,
        }
    }

    /// Get the value for `key` as a mutable array, promoting an encoded
    /// array child to a fresh mutable copy in place. Returns `None` if the
    /// value is not an array.
    pub fn get_mutable_array(&mut self, key: &str) -> Option<MutableArrayRef<'a>> {
        let i = self.find(key).ok()?;
        let promote = match &self.entries[i].1 {
            MutValue::Array(rc) => return Some(rc.clone()),
            MutValue::Source(v) if v.type_of() == ValueType::Array => *v,
            _ => return None,
        };
        let rc = MutableArray::from_array(&promote.as_array()).into_ref();
        self.entries[i].1 = MutValue::Array(rc.clone());
        self.changed = true;
        Some(rc)
    }

    /// Get the value for `key` as a mutable dict, promoting an encoded dict
    /// child in place. Returns `None` if the value is not a dict.
    pub fn get_mutable_dict(&mut self, key: &str) -> Option<MutableDictRef<'a>> {
        let i = self.find(key).ok()?;
        let promote = match &self.entries[i].1 {
            MutValue::Dict(rc) => return Some(rc.clone()),
            MutValue::Source(v) if v.type_of() == ValueType::Dict => *v,
            _ => return None,
        };
        let rc = MutableDict::from_dict_lenient(&promote.as_dict()).into_ref();
        self.entries[i].1 = MutValue::Dict(rc.clone());
        self.changed = true;
        Some(rc)
    }

    /// Iterate over `(key, value)` entries in stored order.
    pub fn iter<'s>(&'s self) -> impl Iterator<Item = (&'s str, ValueRef<'s, 'a>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), slot_ref(v)))
    }

    /// Re-encode this (possibly mixed) tree; see
    /// [`MutableArray::write_to`].
    pub fn write_to(&self, enc: &mut Encoder) -> Result<()> {
        if !self.changed
            && let Some(src) = self.source
            && enc.value_in_base(&src)
        {
            return enc.write_value(&src);
        }
        enc.begin_dict(self.entries.len())?;
        for (key, slot) in &self.entries {
            enc.write_key(key)?;
            write_slot(slot, enc)?;
        }
        enc.end_dict()
    }

    fn guarded_slot(&self, value: NewValue<'a>) -> Result<MutValue<'a>> {
        let slot = make_slot(value);
        let target = std::ptr::from_ref(self).cast::<()>();
        if slot_contains(&slot, target) {
            return Err(Error::InvalidData("value would contain the collection it is stored in"));
        }
        Ok(slot)
    }
}

impl Default for MutableDict<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// --- slot plumbing ---

fn inline_slot<'a>(bytes: &[u8]) -> MutValue<'a> {
    debug_assert!(bytes.len() <= INLINE_CAPACITY);
    let mut buf = [0u8; INLINE_CAPACITY];
    buf[..bytes.len()].copy_from_slice(bytes);
    MutValue::Inline {
        len: bytes.len() as u8,
        buf,
    }
}

fn undefined_slot<'a>() -> MutValue<'a> {
    inline_slot(&[Tag::make(TAG_SPECIAL, SPECIAL_UNDEFINED)])
}

/// Encode a string/data into a slot: inline when small, ref-counted heap
/// bytes otherwise.
fn str_slot<'a>(tag: u8, bytes: &[u8]) -> MutValue<'a> {
    let encoded = encode_str(tag, bytes);
    if encoded.len() <= INLINE_CAPACITY {
        inline_slot(&encoded)
    } else {
        MutValue::HeapScalar(encoded.into())
    }
}

/// Store a copy of an encoded value: small scalars inline, everything else
/// as a reference into its buffer.
fn value_slot(value: Value<'_>) -> MutValue<'_> {
    match value.type_of() {
        ValueType::Array | ValueType::Dict => MutValue::Source(value),
        _ => {
            let bytes = value.encoded_bytes();
            if bytes.is_empty() || bytes.len() > INLINE_CAPACITY {
                MutValue::Source(value)
            } else {
                inline_slot(bytes)
            }
        }
    }
}

fn make_slot(value: NewValue<'_>) -> MutValue<'_> {
    match value {
        NewValue::Null => inline_slot(&[Tag::make(TAG_SPECIAL, SPECIAL_NULL)]),
        NewValue::Undefined => undefined_slot(),
        NewValue::Bool(b) => {
            let tiny = if b { SPECIAL_TRUE } else { SPECIAL_FALSE };
            inline_slot(&[Tag::make(TAG_SPECIAL, tiny)])
        }
        NewValue::Int(i) => {
            let mut buf = [0u8; 9];
            let n = put_int(&mut buf, i);
            inline_slot(&buf[..n])
        }
        NewValue::UInt(u) => match i64::try_from(u) {
            Ok(i) => make_slot(NewValue::Int(i)),
            Err(_) => {
                let mut buf = [0u8; 9];
                buf[0] = Tag::make(TAG_INT, 0x08 | 0x07);
                buf[1..9].copy_from_slice(&u.to_le_bytes());
                inline_slot(&buf)
            }
        },
        NewValue::Float(f) => {
            let mut buf = [0u8; 6];
            buf[0] = Tag::make(TAG_FLOAT, 0);
            buf[2..6].copy_from_slice(&f.to_le_bytes());
            inline_slot(&buf)
        }
        NewValue::Double(d) => {
            let mut buf = [0u8; 10];
            buf[0] = Tag::make(TAG_FLOAT, 0x08);
            buf[2..10].copy_from_slice(&d.to_le_bytes());
            inline_slot(&buf)
        }
        NewValue::Str(s) => str_slot(TAG_STRING, s.as_bytes()),
        NewValue::Data(d) => str_slot(TAG_DATA, &d),
        NewValue::Value(v) => value_slot(v),
        NewValue::Array(rc) => MutValue::Array(rc),
        NewValue::Dict(rc) => MutValue::Dict(rc),
    }
}

fn slot_ref<'s, 'a>(slot: &'s MutValue<'a>) -> ValueRef<'s, 'a> {
    match slot {
        MutValue::Inline { len, buf } => {
            ValueRef::Value(Value::from_encoded(&buf[..*len as usize]))
        }
        MutValue::HeapScalar(bytes) => ValueRef::Value(Value::from_encoded(bytes)),
        MutValue::Array(rc) => ValueRef::Array(rc.clone()),
        MutValue::Dict(rc) => ValueRef::Dict(rc.clone()),
        MutValue::Source(v) => ValueRef::Value(*v),
    }
}

/// True if `slot` is, or transitively contains, the collection at `target`.
/// A collection that is currently mutably borrowed is conservatively treated
/// as containing the target (it is the receiver or an ancestor mid-mutation).
fn slot_contains(slot: &MutValue<'_>, target: *const ()) -> bool {
    match slot {
        MutValue::Array(rc) => {
            rc.as_ptr().cast_const().cast::<()>() == target
                || match rc.try_borrow() {
                    Ok(arr) => arr.slots.iter().any(|s| slot_contains(s, target)),
                    Err(_) => true,
                }
        }
        MutValue::Dict(rc) => {
            rc.as_ptr().cast_const().cast::<()>() == target
                || match rc.try_borrow() {
                    Ok(dict) => dict.entries.iter().any(|(_, s)| slot_contains(s, target)),
                    Err(_) => true,
                }
        }
        _ => false,
    }
}

/// Re-encode one slot. Scalars held by the overlay are decoded and re-emitted
/// through the typed write ops, so the session can intern and compress them.
fn write_slot(slot: &MutValue<'_>, enc: &mut Encoder) -> Result<()> {
    match slot {
        MutValue::Inline { len, buf } => {
            write_scalar(&Value::from_encoded(&buf[..*len as usize]), enc)
        }
        MutValue::HeapScalar(bytes) => write_scalar(&Value::from_encoded(bytes), enc),
        MutValue::Source(v) => enc.write_value(v),
        MutValue::Array(rc) => match rc.try_borrow() {
            Ok(arr) => arr.write_to(enc),
            Err(_) => Err(Error::InternalError("collection borrowed during re-encode")),
        },
        MutValue::Dict(rc) => match rc.try_borrow() {
            Ok(dict) => dict.write_to(enc),
            Err(_) => Err(Error::InternalError("collection borrowed during re-encode")),
        },
    }
}

fn write_scalar(value: &Value<'_>, enc: &mut Encoder) -> Result<()> {
    match value.type_of() {
        ValueType::Null => enc.write_null(),
        ValueType::Undefined => enc.write_undefined(),
        ValueType::Bool => enc.write_bool(value.as_bool()),
        ValueType::Number => {
            if value.is_unsigned() {
                enc.write_uint(value.as_unsigned())
            } else if value.is_integer() {
                enc.write_int(value.as_int())
            } else if value.is_double() {
                enc.write_double(value.as_double())
            } else {
                enc.write_float(value.as_float())
            }
        }
        ValueType::String | ValueType::Data => enc.write_value(value),
        // Overlay slots never hold composites inline.
        _ => enc.write_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dict() -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.begin_dict(2).unwrap();
        enc.write_key("a").unwrap();
        enc.write_int(1).unwrap();
        enc.write_key("b").unwrap();
        enc.write_int(2).unwrap();
        enc.end_dict().unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_array_from_scratch() {
        let mut arr = MutableArray::new();
        assert!(!arr.is_changed());
        arr.push(1i64).unwrap();
        arr.push("two").unwrap();
        arr.push(true).unwrap();
        assert_eq!(arr.count(), 3);
        assert!(arr.is_changed());
        assert_eq!(arr.get(0).as_int(), 1);
        assert_eq!(arr.get(1).as_string(), "two");
        assert!(arr.get(2).as_bool());
        assert!(arr.get(3).is_undefined());
    }

    #[test]
    fn test_array_set_and_remove() {
        let mut arr = MutableArray::new();
        arr.push(1i64).unwrap();
        arr.push(2i64).unwrap();
        arr.set(0, 10i64).unwrap();
        assert_eq!(arr.get(0).as_int(), 10);
        assert!(matches!(arr.set(5, 0i64), Err(Error::OutOfRange { .. })));
        arr.remove(0).unwrap();
        assert_eq!(arr.count(), 1);
        assert_eq!(arr.get(0).as_int(), 2);
    }

    #[test]
    fn test_dict_set_get_remove() {
        let data = sample_dict();
        let root = Value::from_data(&data).unwrap();
        let mut dict = MutableDict::from_dict(&root.as_dict(), true).unwrap();
        assert!(!dict.is_changed());
        assert_eq!(dict.get("a").as_int(), 1);

        dict.set("a", 10i64).unwrap();
        assert_eq!(dict.get("a").as_int(), 10);
        assert!(dict.is_changed());

        // New keys land in sorted position.
        dict.set("aa", 5i64).unwrap();
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "aa", "b"]);

        assert!(dict.remove("aa"));
        assert!(!dict.remove("zz"));
        assert_eq!(dict.count(), 2);
        assert!(dict.get("aa").is_undefined());
    }

    #[test]
    fn test_dict_insert_callback() {
        let mut dict = MutableDict::new();
        // Insert when missing.
        let committed = dict
            .insert("n", |existing| {
                assert!(existing.is_undefined());
                Some(NewValue::Int(1))
            })
            .unwrap();
        assert!(committed);

        // Bump when present.
        let committed = dict
            .insert("n", |existing| Some(NewValue::Int(existing.as_int() + 1)))
            .unwrap();
        assert!(committed);
        assert_eq!(dict.get("n").as_int(), 2);

        // Decline: dict untouched, reported as a no-op.
        let before = dict.get("n").as_int();
        let committed = dict.insert("n", |_| None).unwrap();
        assert!(!committed);
        assert_eq!(dict.get("n").as_int(), before);
    }

    #[test]
    fn test_long_string_goes_to_heap() {
        let mut dict = MutableDict::new();
        let long = "a string much longer than the inline slot capacity";
        dict.set("s", long).unwrap();
        assert_eq!(dict.get("s").as_string(), long);
    }

    #[test]
    fn test_promotion() {
        let mut enc = Encoder::new();
        enc.begin_dict(1).unwrap();
        enc.write_key("items").unwrap();
        enc.begin_array(2).unwrap();
        enc.write_int(1).unwrap();
        enc.write_int(2).unwrap();
        enc.end_array().unwrap();
        enc.end_dict().unwrap();
        let data = enc.finish().unwrap();
        let root = Value::from_data(&data).unwrap();

        let mut dict = MutableDict::from_dict(&root.as_dict(), true).unwrap();
        let arr = dict.get_mutable_array("items").unwrap();
        arr.borrow_mut().set(0, 100i64).unwrap();
        // The same handle comes back on repeat calls.
        let again = dict.get_mutable_array("items").unwrap();
        assert!(Rc::ptr_eq(&arr, &again));
        assert_eq!(again.borrow().get(0).as_int(), 100);
        // Promotion assigned the slot, so the parent is changed.
        assert!(dict.is_changed());
        // Asking for the wrong collection kind is a miss.
        assert!(dict.get_mutable_dict("items").is_none());
    }

    #[test]
    fn test_cycle_refused() {
        let arr = MutableArray::new().into_ref();
        let err = {
            let mut inner = arr.borrow_mut();
            inner.push(arr.clone()).unwrap_err()
        };
        assert!(matches!(err, Error::InvalidData(_)));

        // Indirect cycle: a -> b, then b -> a.
        let a = MutableArray::new().into_ref();
        let b = MutableArray::new().into_ref();
        a.borrow_mut().push(b.clone()).unwrap();
        let err = b.borrow_mut().push(a.clone()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_write_to_rebuilds() {
        let data = sample_dict();
        let root = Value::from_data(&data).unwrap();
        let mut dict = MutableDict::from_dict(&root.as_dict(), true).unwrap();
        dict.set("a", 10i64).unwrap();

        let mut enc = Encoder::new();
        dict.write_to(&mut enc).unwrap();
        let out = enc.finish().unwrap();

        // Identical to encoding the edited map directly.
        let mut direct = Encoder::new();
        direct.begin_dict(2).unwrap();
        direct.write_key("a").unwrap();
        direct.write_int(10).unwrap();
        direct.write_key("b").unwrap();
        direct.write_int(2).unwrap();
        direct.end_dict().unwrap();
        assert_eq!(out, direct.finish().unwrap());
    }

    #[test]
    fn test_write_to_delta() {
        let data = sample_dict();
        let root = Value::from_data(&data).unwrap();
        let dict = MutableDict::from_dict(&root.as_dict(), true).unwrap();

        // Unchanged dict against its own base: a bare pointer.
        let mut enc = Encoder::new();
        enc.set_base(&data).unwrap();
        dict.write_to(&mut enc).unwrap();
        let delta = enc.finish().unwrap();
        assert_eq!(delta.len(), 2);

        let mut combined = data.clone();
        combined.extend_from_slice(&delta);
        let reread = Value::from_data(&combined).unwrap();
        assert_eq!(reread.as_dict().get("b").unwrap().as_int(), 2);
    }

    #[test]
    fn test_unsorted_overlay_keeps_order() {
        let mut enc = Encoder::with_options(256, true, false);
        enc.begin_dict(2).unwrap();
        enc.write_key("b").unwrap();
        enc.write_int(2).unwrap();
        enc.write_key("a").unwrap();
        enc.write_int(1).unwrap();
        enc.end_dict().unwrap();
        let data = enc.finish().unwrap();
        let root = Value::from_trusted_data(&data).unwrap();

        let mut dict = MutableDict::from_dict(&root.as_dict(), false).unwrap();
        assert_eq!(dict.get("a").as_int(), 1);
        dict.set("c", 3i64).unwrap();
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
