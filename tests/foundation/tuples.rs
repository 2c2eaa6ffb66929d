//! Integration tests for Tuple matching

use proptest::prelude::*;
use whyprov_foundation::{Tuple, Value, WILDCARD};

#[test]
fn display_and_line_forms() {
    let tuple = Tuple::from_fields(["0", "1", "str10"]);
    assert_eq!(tuple.to_string(), "(0,1,str10)");
    assert_eq!(tuple.to_line(), "0,1,str10");
    assert_eq!(Tuple::from_line("0,1,str10"), tuple);
}

#[test]
fn user_tuples_are_normalized() {
    assert_eq!(Tuple::parse("(0, \"str10\")"), Tuple::from_fields(["0", "str10"]));
    assert_eq!(Tuple::parse("[1, 'a']"), Tuple::from_fields(["1", "a"]));
}

#[test]
fn values_render_raw() {
    let values = [Value::Int(0), Value::str("str10")];
    assert_eq!(Tuple::from(&values[..]), Tuple::from_fields(["0", "str10"]));
}

#[test]
fn wildcard_patterns() {
    let pattern = Tuple::from_fields([WILDCARD, "str2"]);
    assert!(pattern.has_wildcard());
    assert!(Tuple::from_fields(["2", "str2"]).matches_pattern(&pattern));
    assert!(!Tuple::from_fields(["2", "str3"]).matches_pattern(&pattern));
    assert!(!Tuple::from_fields(["str2"]).matches_pattern(&pattern));
}

#[test]
fn prefix_alignment() {
    let provenance = Tuple::from_fields(["0", "1", "str10"]);
    assert!(provenance.aligns_with(&Tuple::from_fields(["0", "1"])));
    assert!(!provenance.aligns_with(&Tuple::from_fields(["1", "0"])));
    assert!(!Tuple::from_fields(["0"]).aligns_with(&Tuple::from_fields(["0", "1"])));
}

fn field() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,4}"
}

proptest! {
    #[test]
    fn tuple_aligns_with_each_of_its_prefixes(fields in prop::collection::vec(field(), 0..6)) {
        let tuple = Tuple::from_fields(fields.clone());
        for cut in 0..=fields.len() {
            prop_assert!(tuple.aligns_with(&Tuple::from_fields(fields[..cut].to_vec())));
        }
    }

    #[test]
    fn masking_any_position_still_matches(
        fields in prop::collection::vec(field(), 1..6),
        mask in prop::collection::vec(any::<bool>(), 6),
    ) {
        let tuple = Tuple::from_fields(fields.clone());
        let pattern: Tuple = fields
            .iter()
            .zip(&mask)
            .map(|(f, hide)| if *hide { WILDCARD.to_string() } else { f.clone() })
            .collect();
        prop_assert!(tuple.matches_pattern(&pattern));
    }
}
