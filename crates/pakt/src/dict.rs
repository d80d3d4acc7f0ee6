//! Zero-copy dictionary views and keyed lookup.
//!
//! A dict is laid out like an array of 2·N slots: even slots hold keys, odd
//! slots hold values. Keys are strings (or small integers acting as key
//! aliases for an external shared-key table; those order before all string
//! keys). A dict written with key sorting enabled keeps its keys in unsigned
//! lexicographic byte order, which admits binary search; the tag layout does
//! not record sort order, so [`Dict::get`] is only valid on sorted dicts and
//! [`Dict::get_unsorted`] must be used otherwise.

use std::cell::Cell;
use std::cmp::Ordering;

use crate::value::{Value, deref_slot, parse_composite};

/// Encoded form of an empty dict: zero count, narrow.
static EMPTY_DICT: [u8; 2] = [0x70, 0x00];

/// Zero-copy view into a dictionary value.
#[derive(Clone, Copy)]
pub struct Dict<'a> {
    value: Value<'a>,
    /// Number of key/value pairs.
    count: u32,
    first: usize,
    wide: bool,
}

impl<'a> Dict<'a> {
    /// Create a view over a dict value; malformed headers produce an empty
    /// view.
    #[must_use]
    pub(crate) fn new(value: Value<'a>) -> Self {
        match parse_composite(value.data(), value.addr()) {
            Some(h) => Self {
                value,
                count: h.count,
                first: h.first,
                wide: h.wide,
            },
            None => Self {
                value,
                count: 0,
                first: value.addr(),
                wide: false,
            },
        }
    }

    /// The process-wide empty dict singleton.
    #[must_use]
    pub fn empty() -> Dict<'static> {
        Dict::new(Value::from_encoded(&EMPTY_DICT))
    }

    /// The dict as a plain value view.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Value<'a> {
        self.value
    }

    /// Number of key/value pairs.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// True if the dict has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn width(&self) -> usize {
        if self.wide { 4 } else { 2 }
    }

    /// Absolute offset of the slot at physical index `i` (over 2·count slots).
    #[inline]
    fn slot_addr(&self, i: usize) -> usize {
        self.first + i * self.width()
    }

    fn slot(&self, i: usize) -> Option<Value<'a>> {
        deref_slot(self.value.data(), self.slot_addr(i), self.wide)
    }

    /// Key value of entry `i`.
    fn key_at(&self, i: usize) -> Option<Value<'a>> {
        self.slot(2 * i)
    }

    /// Value of entry `i`.
    fn value_at(&self, i: usize) -> Option<Value<'a>> {
        self.slot(2 * i + 1)
    }

    /// If the key slot of entry `i` is a back-pointer (an interned key),
    /// return the target's absolute offset.
    fn key_target_addr(&self, i: usize) -> Option<usize> {
        let pos = self.slot_addr(2 * i);
        let data = self.value.data();
        if *data.get(pos)? & 0x80 == 0 {
            return None;
        }
        deref_slot(data, pos, self.wide).map(|v| v.addr())
    }

    /// Look up a key in a **sorted** dict by binary search over the key bytes
    /// (unsigned lexicographic). On an unsorted dict the result is
    /// meaningless; use [`Dict::get_unsorted`] there.
    #[must_use]
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Value<'a>> {
        self.search(key.as_ref()).and_then(|i| self.value_at(i))
    }

    fn search(&self, key: &[u8]) -> Option<usize> {
        let mut lo = 0usize;
        let mut hi = self.count as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.key_at(mid)?;
            match cmp_key(entry, key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Some(mid),
            }
        }
        None
    }

    /// Look up a key by linear scan. Slower than [`Dict::get`], but valid on
    /// dicts of any (or unknown) key order.
    #[must_use]
    pub fn get_unsorted(&self, key: impl AsRef<[u8]>) -> Option<Value<'a>> {
        let key = key.as_ref();
        for i in 0..self.count as usize {
            let entry = self.key_at(i)?;
            if entry.str_bytes() == Some(key) {
                return self.value_at(i);
            }
        }
        None
    }

    /// Look up a pre-built [`DictKey`], using and refreshing its cached hint.
    ///
    /// On the first use against a given buffer this resolves the key by bytes
    /// and, if the dict's key slot is an interned pointer and the key permits
    /// caching, records the target offset. Later lookups against the same
    /// buffer compare by identity first and fall back to bytes. Requires a
    /// sorted dict, like [`Dict::get`].
    #[must_use]
    pub fn get_with_key(&self, key: &DictKey) -> Option<Value<'a>> {
        let buf = buffer_id(self.value.data());
        if let Some(h) = key.hint.get()
            && h.buf == buf
            && h.index < self.count
            && let Some(addr) = self.key_target_addr(h.index as usize)
            && addr == h.key_addr
        {
            return self.value_at(h.index as usize);
        }
        let index = self.search(&key.bytes)?;
        if key.cache_pointers
            && let Some(key_addr) = self.key_target_addr(index)
        {
            key.hint.set(Some(KeyHint {
                buf,
                key_addr,
                index: index as u32,
            }));
        }
        self.value_at(index)
    }

    /// Look up multiple keys in one merged linear pass over a sorted dict.
    ///
    /// `keys` MUST be in ascending byte order. Found values are written to
    /// the matching position of `values` (missing keys get `None`). Returns
    /// the number of keys found.
    pub fn get_with_keys(&self, keys: &[DictKey], values: &mut [Option<Value<'a>>]) -> usize {
        let n = keys.len().min(values.len());
        for v in values[..n].iter_mut() {
            *v = None;
        }
        let mut found = 0;
        let mut ki = 0;
        for i in 0..self.count as usize {
            if ki >= n {
                break;
            }
            let Some(entry) = self.key_at(i) else { break };
            let Some(entry_bytes) = entry.str_bytes() else {
                continue; // int key aliases order before all string keys
            };
            while ki < n && keys[ki].bytes.as_slice() < entry_bytes {
                ki += 1;
            }
            if ki < n && keys[ki].bytes.as_slice() == entry_bytes {
                values[ki] = self.value_at(i);
                found += 1;
                ki += 1;
            }
        }
        found
    }

    /// Iterate over `(key, value)` pairs in stored order.
    #[must_use]
    pub fn iter(&self) -> DictIter<'a> {
        DictIter {
            dict: *self,
            index: 0,
        }
    }
}

impl<'a> IntoIterator for &Dict<'a> {
    type Item = (Value<'a>, Value<'a>);
    type IntoIter = DictIter<'a>;

    fn into_iter(self) -> DictIter<'a> {
        self.iter()
    }
}

impl std::fmt::Debug for Dict<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dict")
            .field("addr", &format_args!("{:#x}", self.value.addr()))
            .field("count", &self.count)
            .field("wide", &self.wide)
            .finish()
    }
}

/// Compare an entry's key against probe bytes. Int key aliases compare as
/// less than every string probe.
fn cmp_key(entry: Value<'_>, probe: &[u8]) -> Ordering {
    match entry.str_bytes() {
        Some(bytes) => bytes.cmp(probe),
        None => Ordering::Less,
    }
}

fn buffer_id(data: &[u8]) -> (usize, usize) {
    (data.as_ptr() as usize, data.len())
}

/// Iterator over dict entries, yielding dereferenced `(key, value)` pairs.
pub struct DictIter<'a> {
    dict: Dict<'a>,
    index: u32,
}

impl<'a> Iterator for DictIter<'a> {
    type Item = (Value<'a>, Value<'a>);

    fn next(&mut self) -> Option<(Value<'a>, Value<'a>)> {
        if self.index >= self.dict.count {
            return None;
        }
        let i = self.index as usize;
        self.index += 1;
        let key = self.dict.key_at(i)?;
        let value = self.dict.value_at(i)?;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.dict.count - self.index) as usize;
        (left, Some(left))
    }
}

/// A pre-built dictionary key that remembers lookup hints.
///
/// Holds the raw key bytes plus space for a cached pointer to the interned
/// key value inside a specific buffer. The hint is only recorded when
/// `cache_pointers` is true, and is only consulted when the same buffer is
/// queried again; lookups against other buffers fall back to byte comparison.
#[derive(Debug)]
pub struct DictKey {
    bytes: Vec<u8>,
    cache_pointers: bool,
    hint: Cell<Option<KeyHint>>,
}

#[derive(Debug, Clone, Copy)]
struct KeyHint {
    buf: (usize, usize),
    key_addr: usize,
    index: u32,
}

impl DictKey {
    /// Create a key for repeated lookups.
    ///
    /// Pass `cache_pointers = true` when the key will only ever be used
    /// against dicts living in one stored buffer; pointer hints make repeat
    /// lookups skip the search.
    #[must_use]
    pub fn new(key: impl AsRef<[u8]>, cache_pointers: bool) -> Self {
        Self {
            bytes: key.as_ref().to_vec(),
            cache_pointers,
            hint: Cell::new(None),
        }
    }

    /// The raw key bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // {"a": 1, "b": 2} with inline one-byte keys, narrow slots.
    const SMALL_DICT: [u8; 10] = [
        0x70, 0x02, // dict, count 2
        0x41, b'a', // key "a"
        0x00, 0x01, // short int 1
        0x41, b'b', // key "b"
        0x00, 0x02, // short int 2
    ];

    #[test]
    fn test_get_sorted() {
        let dict = Value::from_encoded(&SMALL_DICT).as_dict();
        assert_eq!(dict.count(), 2);
        assert_eq!(dict.get("a").unwrap().as_int(), 1);
        assert_eq!(dict.get("b").unwrap().as_int(), 2);
        assert!(dict.get("c").is_none());
        assert!(dict.get("").is_none());
    }

    #[test]
    fn test_get_unsorted_agrees() {
        let dict = Value::from_encoded(&SMALL_DICT).as_dict();
        for key in ["a", "b", "c"] {
            let sorted = dict.get(key);
            let linear = dict.get_unsorted(key);
            assert_eq!(sorted.is_some(), linear.is_some(), "key {key}");
            if let (Some(s), Some(l)) = (sorted, linear) {
                assert!(s == l, "key {key} resolved to different values");
            }
        }
    }

    #[test]
    fn test_iter_pairs() {
        let dict = Value::from_encoded(&SMALL_DICT).as_dict();
        let pairs: Vec<(String, i64)> = dict
            .iter()
            .map(|(k, v)| (k.as_string().to_string(), v.as_int()))
            .collect();
        assert_eq!(pairs, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_empty_singleton() {
        let dict = Dict::empty();
        assert_eq!(dict.count(), 0);
        assert!(dict.get("a").is_none());
        assert_eq!(dict.iter().count(), 0);
    }

    #[test]
    fn test_dict_key_without_interning() {
        // Inline keys are not pointers, so no hint gets cached, but lookup
        // still resolves by bytes.
        let dict = Value::from_encoded(&SMALL_DICT).as_dict();
        let key = DictKey::new("b", true);
        assert_eq!(dict.get_with_key(&key).unwrap().as_int(), 2);
        assert!(key.hint.get().is_none());
        assert_eq!(dict.get_with_key(&key).unwrap().as_int(), 2);
    }

    #[test]
    fn test_get_with_keys_merged() {
        let dict = Value::from_encoded(&SMALL_DICT).as_dict();
        let keys = [
            DictKey::new("a", false),
            DictKey::new("b", false),
            DictKey::new("z", false),
        ];
        let mut values = [None; 3];
        let found = dict.get_with_keys(&keys, &mut values);
        assert_eq!(found, 2);
        assert_eq!(values[0].unwrap().as_int(), 1);
        assert_eq!(values[1].unwrap().as_int(), 2);
        assert!(values[2].is_none());
    }
}
