//! Property-based tests for encode/decode roundtrips across generated inputs.

use proptest::prelude::*;

use pakt::{Encoder, Value, from_json, to_json};

proptest! {
    #[test]
    fn prop_int_roundtrip(n in any::<i64>()) {
        let mut enc = Encoder::new();
        enc.write_int(n).unwrap();
        let data = enc.finish().unwrap();
        let v = Value::from_data(&data).unwrap();
        prop_assert!(v.is_integer());
        prop_assert_eq!(v.as_int(), n);
    }

    #[test]
    fn prop_uint_roundtrip(n in any::<u64>()) {
        let mut enc = Encoder::new();
        enc.write_uint(n).unwrap();
        let data = enc.finish().unwrap();
        let v = Value::from_data(&data).unwrap();
        prop_assert_eq!(v.as_unsigned(), n);
    }

    #[test]
    fn prop_double_roundtrip(d in any::<f64>()) {
        let mut enc = Encoder::new();
        enc.write_double(d).unwrap();
        let data = enc.finish().unwrap();
        let v = Value::from_data(&data).unwrap();
        let back = v.as_double();
        if d.is_nan() {
            prop_assert!(back.is_nan());
        } else if d == 0.0 {
            // -0.0 compresses to integer zero.
            prop_assert_eq!(back, 0.0);
        } else {
            prop_assert_eq!(back.to_bits(), d.to_bits());
        }
    }

    #[test]
    fn prop_float_roundtrip(f in any::<f32>()) {
        let mut enc = Encoder::new();
        enc.write_float(f).unwrap();
        let data = enc.finish().unwrap();
        let back = Value::from_data(&data).unwrap().as_float();
        if f.is_nan() {
            prop_assert!(back.is_nan());
        } else if f == 0.0 {
            prop_assert_eq!(back, 0.0);
        } else {
            prop_assert_eq!(back.to_bits(), f.to_bits());
        }
    }

    #[test]
    fn prop_string_roundtrip(s in "[a-zA-Z0-9 _./-]{0,48}") {
        let mut enc = Encoder::new();
        enc.write_string(&s).unwrap();
        let data = enc.finish().unwrap();
        prop_assert_eq!(Value::from_data(&data).unwrap().as_string(), s);
    }

    #[test]
    fn prop_data_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut enc = Encoder::new();
        enc.write_data(&bytes).unwrap();
        let data = enc.finish().unwrap();
        prop_assert_eq!(Value::from_data(&data).unwrap().as_data(), &bytes[..]);
    }

    #[test]
    fn prop_array_roundtrip(items in prop::collection::vec(any::<i64>(), 0..32)) {
        let mut enc = Encoder::new();
        enc.begin_array(items.len()).unwrap();
        for &n in &items {
            enc.write_int(n).unwrap();
        }
        enc.end_array().unwrap();
        let data = enc.finish().unwrap();

        let arr = Value::from_data(&data).unwrap().as_array();
        prop_assert_eq!(arr.count() as usize, items.len());
        for (i, &n) in items.iter().enumerate() {
            prop_assert_eq!(arr.get(i as u32).unwrap().as_int(), n);
        }
        let collected: Vec<i64> = arr.iter().map(|v| v.as_int()).collect();
        prop_assert_eq!(collected, items);
    }

    #[test]
    fn prop_dict_roundtrip(
        entries in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..24)
    ) {
        let mut enc = Encoder::new();
        enc.begin_dict(entries.len()).unwrap();
        for (k, &v) in &entries {
            enc.write_key(k).unwrap();
            enc.write_int(v).unwrap();
        }
        enc.end_dict().unwrap();
        let data = enc.finish().unwrap();

        let dict = Value::from_data(&data).unwrap().as_dict();
        prop_assert_eq!(dict.count() as usize, entries.len());
        for (k, &v) in &entries {
            prop_assert_eq!(dict.get(k).unwrap().as_int(), v);
            // Sorted and linear lookup agree in presence and identity.
            prop_assert!(dict.get(k).unwrap() == dict.get_unsorted(k).unwrap());
        }
        // Keys iterate in strictly ascending byte order.
        let keys: Vec<String> = dict.iter().map(|(k, _)| k.as_string().to_string()).collect();
        for pair in keys.windows(2) {
            prop_assert!(pair[0].as_bytes() < pair[1].as_bytes());
        }
    }

    #[test]
    fn prop_json_document_roundtrip(items in prop::collection::vec(any::<i64>(), 0..12)) {
        let json = serde_json::to_string(&items).unwrap();
        let data = from_json(&json).unwrap();
        let back = to_json(&Value::from_data(&data).unwrap()).unwrap();
        prop_assert_eq!(json, back);
    }

    #[test]
    fn prop_from_data_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..96)) {
        // Arbitrary garbage must be rejected or parsed, never read out of
        // bounds or panic.
        let _ = Value::from_data(&bytes);
    }

    #[test]
    fn prop_reencode_is_identity(
        entries in prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..12)
    ) {
        let json = serde_json::to_string(&entries).unwrap();
        let data = from_json(&json).unwrap();
        let root = Value::from_data(&data).unwrap();
        let mut enc = Encoder::new();
        enc.write_value(&root).unwrap();
        prop_assert_eq!(enc.finish().unwrap(), data);
    }
}
