//! Example of drilling into a nested document with zero-copy views.
//!
//! cargo run --package pakt --example nested_access

use pakt::{Value, from_json};

fn main() -> Result<(), pakt::Error> {
    let data = from_json(r#"{"users": [{"name": "Amy"}, {"name": "Bob"}]}"#)?;

    let root = Value::from_data(&data)?;
    let users = root.as_dict().get("users").expect("users").as_array();
    let second = users.get(1).expect("index 1").as_dict();
    let name = second.get("name").expect("name").as_string();

    println!("{name}");
    Ok(())
}
