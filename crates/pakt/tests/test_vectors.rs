//! Byte-level test vectors: JSON documents paired with their exact encoding.

use serde::Deserialize;

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Deserialize)]
struct VectorCase {
    description: String,
    json: serde_json::Value,
    hex: String,
}

/// Each case: the document, and the buffer the default encoder must produce
/// for it (values first, trailing narrow pointer to the root last).
const VECTORS: &str = r#"[
    {"description": "null", "json": null, "hex": "30008001"},
    {"description": "false", "json": false, "hex": "32008001"},
    {"description": "true", "json": true, "hex": "33008001"},
    {"description": "zero", "json": 0, "hex": "00008001"},
    {"description": "small int", "json": 42, "hex": "002a8001"},
    {"description": "negative short int", "json": -1, "hex": "0fff8001"},
    {"description": "largest short int", "json": 2047, "hex": "07ff8001"},
    {"description": "smallest sized int", "json": 2048, "hex": "110008008002"},
    {"description": "smallest short int", "json": -2048, "hex": "08008001"},
    {"description": "three byte int", "json": 123456, "hex": "1240e2018002"},
    {"description": "i64 max", "json": 9223372036854775807, "hex": "17ffffffffffffff7f008005"},
    {"description": "u64 max", "json": 18446744073709551615, "hex": "1fffffffffffffffff008005"},
    {"description": "float stored narrow", "json": 1.5, "hex": "20000000c03f8003"},
    {"description": "double", "json": 1.23, "hex": "2800ae47e17a14aef33f8005"},
    {"description": "empty string", "json": "", "hex": "40008001"},
    {"description": "one char string", "json": "a", "hex": "41618001"},
    {"description": "short string", "json": "hello", "hex": "4568656c6c6f8003"},
    {"description": "binary blob", "json": "b64:3q2+7w==", "hex": "54deadbeef008003"},
    {"description": "empty array", "json": [], "hex": "60008001"},
    {"description": "empty dict", "json": {}, "hex": "70008001"},
    {"description": "int array", "json": [1, 2], "hex": "6002000100028003"},
    {"description": "small dict", "json": {"a": 1, "b": 2}, "hex": "700241610001416200028005"},
    {"description": "interned strings", "json": ["hello", "hello"],
     "hex": "4568656c6c6f6002800480058003"}
]"#;

fn cases() -> Vec<VectorCase> {
    serde_json::from_str(VECTORS).expect("failed to parse test vectors")
}

#[test]
fn test_vectors_encode() {
    for case in cases() {
        let json_str = serde_json::to_string(&case.json).unwrap();
        let data = pakt::from_json(&json_str)
            .unwrap_or_else(|e| panic!("from_json failed for '{}': {}", case.description, e));
        let expected = hex_to_bytes(&case.hex);
        assert_eq!(
            data, expected,
            "byte mismatch for '{}'\nexpected: {:02x?}\nactual:   {:02x?}",
            case.description, expected, data
        );
    }
}

#[test]
fn test_vectors_decode() {
    for case in cases() {
        let data = hex_to_bytes(&case.hex);
        let root = pakt::Value::from_data(&data)
            .unwrap_or_else(|e| panic!("from_data failed for '{}': {}", case.description, e));
        let json = pakt::to_json(&root)
            .unwrap_or_else(|e| panic!("to_json failed for '{}': {}", case.description, e));
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, case.json, "decode mismatch for '{}'", case.description);
    }
}

#[test]
fn test_vectors_reencode_identical() {
    // encode(decode(B)) == B for sorted, default-option buffers.
    for case in cases() {
        let data = hex_to_bytes(&case.hex);
        let root = pakt::Value::from_data(&data).unwrap();
        let mut enc = pakt::Encoder::new();
        enc.write_value(&root).unwrap();
        let reencoded = enc.finish().unwrap();
        assert_eq!(reencoded, data, "re-encode changed '{}'", case.description);
    }
}

#[test]
fn test_every_buffer_is_even_and_pointer_terminated() {
    for case in cases() {
        let data = hex_to_bytes(&case.hex);
        assert_eq!(data.len() % 2, 0, "'{}' has odd length", case.description);
        assert!(
            data[data.len() - 2] & 0x80 != 0,
            "'{}' does not end in a pointer",
            case.description
        );
    }
}

#[test]
fn test_large_dict_long_count() {
    // 3000 entries overflow the 11-bit inline count into a varint, and the
    // reverse insertion order exercises the sorting pass.
    let mut enc = pakt::Encoder::new();
    enc.begin_dict(3000).unwrap();
    for i in (0..3000).rev() {
        enc.write_key(&format!("k{i:04}")).unwrap();
        enc.write_int(i).unwrap();
    }
    enc.end_dict().unwrap();
    let data = enc.finish().unwrap();

    let root = pakt::Value::from_data(&data).unwrap();
    let dict = root.as_dict();
    assert_eq!(dict.count(), 3000);
    assert_eq!(dict.get("k1500").unwrap().as_int(), 1500);
    assert_eq!(dict.get("k0000").unwrap().as_int(), 0);
    assert_eq!(dict.get("k2999").unwrap().as_int(), 2999);
    assert!(dict.get("k3000").is_none());

    // Iteration comes out in lexicographic key order.
    let mut prev: Option<String> = None;
    for (key, value) in dict.iter() {
        let key = key.as_string().to_string();
        if let Some(p) = &prev {
            assert!(p.as_bytes() < key.as_bytes(), "{p} !< {key}");
        }
        assert_eq!(format!("k{:04}", value.as_int()), key);
        prev = Some(key);
    }
}

#[test]
fn test_large_array_long_count() {
    let mut enc = pakt::Encoder::new();
    enc.begin_array(2500).unwrap();
    for i in 0..2500 {
        enc.write_int(i).unwrap();
    }
    enc.end_array().unwrap();
    let data = enc.finish().unwrap();

    let arr = pakt::Value::from_data(&data).unwrap().as_array();
    assert_eq!(arr.count(), 2500);
    assert_eq!(arr.get(0).unwrap().as_int(), 0);
    assert_eq!(arr.get(2047).unwrap().as_int(), 2047);
    assert_eq!(arr.get(2499).unwrap().as_int(), 2499);
    assert!(arr.get(2500).is_none());
    assert_eq!(arr.iter().count(), 2500);
}

#[test]
fn test_dict_key_cache() {
    // Interned (multi-byte) keys let DictKey record pointer hints.
    let data = pakt::from_json(r#"{"alpha": 1, "beta": 2, "gamma": 3}"#).unwrap();
    let dict = pakt::Value::from_data(&data).unwrap().as_dict();

    let key = pakt::DictKey::new("beta", true);
    assert_eq!(dict.get_with_key(&key).unwrap().as_int(), 2);
    // Second lookup hits the identity fast path.
    assert_eq!(dict.get_with_key(&key).unwrap().as_int(), 2);

    // The same key object still works against a different buffer.
    let data2 = pakt::from_json(r#"{"beta": 20}"#).unwrap();
    let dict2 = pakt::Value::from_data(&data2).unwrap().as_dict();
    assert_eq!(dict2.get_with_key(&key).unwrap().as_int(), 20);

    let missing = pakt::DictKey::new("delta", true);
    assert!(dict.get_with_key(&missing).is_none());
}

#[test]
fn test_bulk_key_lookup() {
    let data = pakt::from_json(r#"{"a": 1, "b": 2, "c": 3, "d": 4}"#).unwrap();
    let dict = pakt::Value::from_data(&data).unwrap().as_dict();

    let keys = [
        pakt::DictKey::new("a", false),
        pakt::DictKey::new("c", false),
        pakt::DictKey::new("x", false),
    ];
    let mut values = [None; 3];
    assert_eq!(dict.get_with_keys(&keys, &mut values), 2);
    assert_eq!(values[0].unwrap().as_int(), 1);
    assert_eq!(values[1].unwrap().as_int(), 3);
    assert!(values[2].is_none());
}
