//! Integration tests for Value and ScalarType

use whyprov_foundation::{ScalarType, Value};

#[test]
fn raw_and_literal_forms() {
    let n = Value::Int(-4);
    let s = Value::str("str10");

    assert_eq!(n.raw(), "-4");
    assert_eq!(n.literal(), "-4");
    assert_eq!(s.raw(), "str10");
    assert_eq!(s.literal(), "\"str10\"");
}

#[test]
fn literals_parse_by_shape() {
    assert_eq!(Value::parse_literal("12"), Value::Int(12));
    assert_eq!(Value::parse_literal("\"12\""), Value::str("12"));
    assert_eq!(Value::parse_literal("'x'"), Value::str("x"));
    assert_eq!(Value::parse_literal(" bare "), Value::str("bare"));
}

#[test]
fn value_types() {
    assert_eq!(Value::from(3).value_type(), ScalarType::Int);
    assert_eq!(Value::from("a").value_type(), ScalarType::String);
}

#[test]
fn scalar_type_tags() {
    assert_eq!("int".parse::<ScalarType>().unwrap(), ScalarType::Int);
    assert_eq!("string".parse::<ScalarType>().unwrap(), ScalarType::String);
    assert_eq!(
        "symbol".parse::<ScalarType>().unwrap(),
        ScalarType::Other("symbol".to_string())
    );
    assert_eq!(ScalarType::String.to_string(), "string");
}
