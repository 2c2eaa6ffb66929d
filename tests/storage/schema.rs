//! Integration tests for SchemaRegistry

use whyprov_foundation::{ErrorKind, ScalarType};
use whyprov_storage::SchemaRegistry;

#[test]
fn declaration_order_is_kept() {
    let mut registry = SchemaRegistry::new();
    registry.declare("a", vec![ScalarType::Int, ScalarType::Int]);
    registry.declare("b", vec![ScalarType::Int, ScalarType::String]);
    registry.declare("a_prov0", vec![ScalarType::Int, ScalarType::Int, ScalarType::String]);

    let relations: Vec<_> = registry.relations().collect();
    assert_eq!(relations, vec!["a", "b", "a_prov0"]);
}

#[test]
fn redeclaring_overwrites_in_place() {
    let mut registry = SchemaRegistry::new();
    registry.declare("a", vec![ScalarType::Int]);
    registry.declare("b", vec![ScalarType::Int]);
    registry.declare("a", vec![ScalarType::String]);

    assert_eq!(registry.lookup("a").unwrap(), &[ScalarType::String]);
    let relations: Vec<_> = registry.relations().collect();
    assert_eq!(relations, vec!["a", "b"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn unknown_relation() {
    let registry = SchemaRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.get("z").is_none());
    let err = registry.lookup("z").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownRelation(ref r) if r == "z"));
}
