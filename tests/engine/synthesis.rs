//! Integration tests for provenance-rule synthesis

use whyprov_engine::{ProvenanceSynthesizer, provenance_base, provenance_name};
use whyprov_foundation::{ErrorKind, ScalarType};
use whyprov_language::Rule;
use whyprov_storage::SchemaRegistry;

fn schema(entries: &[(&str, &[ScalarType])]) -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    for (relation, types) in entries {
        registry.declare(*relation, types.to_vec());
    }
    registry
}

fn join_schema() -> SchemaRegistry {
    schema(&[
        ("a", &[ScalarType::Int, ScalarType::Int]),
        ("b", &[ScalarType::Int, ScalarType::String]),
        ("c", &[ScalarType::String, ScalarType::Int]),
    ])
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn names_follow_the_counter() {
    assert_eq!(provenance_name("a", 0), "a_prov0");
    assert_eq!(provenance_name("path", 12), "path_prov12");
}

#[test]
fn base_requires_trailing_digits() {
    assert_eq!(provenance_base("a_prov0"), Some("a"));
    assert_eq!(provenance_base("a_prov12"), Some("a"));
    assert_eq!(provenance_base("a_prov1_prov2"), Some("a_prov1"));
    assert_eq!(provenance_base("a_prov"), None);
    assert_eq!(provenance_base("a_provx"), None);
    assert_eq!(provenance_base("a_prov1x"), None);
    assert_eq!(provenance_base("_prov1"), None);
    assert_eq!(provenance_base("provenance"), None);
}

// =============================================================================
// Synthesis
// =============================================================================

#[test]
fn join_rule_exposes_the_join_variable() {
    let mut schema = join_schema();
    let mut synthesizer = ProvenanceSynthesizer::new();
    let rule = Rule::parse("a(X,Y) :- b(X,Z), c(Z,Y);").unwrap();

    let (provenance, types) = synthesizer.synthesize(&rule, &mut schema).unwrap();

    assert_eq!(provenance.render(), "a_prov0(X,Y,Z) :- b(X,Z),c(Z,Y);");
    assert!(provenance.is_provenance);
    assert!(provenance.body_eq(&rule));
    assert_eq!(types, vec![ScalarType::Int, ScalarType::Int, ScalarType::String]);
    assert_eq!(schema.get("a_prov0"), Some(types.as_slice()));
    assert_eq!(synthesizer.counter(), 1);
}

#[test]
fn wildcards_are_not_exposed() {
    let mut schema = schema(&[
        ("a", &[ScalarType::String, ScalarType::String]),
        ("b", &[ScalarType::Int, ScalarType::String]),
        ("c", &[ScalarType::Int, ScalarType::String]),
    ]);
    let rule = Rule::parse("a(X,Y) :- b(_,X),c(_,Y);").unwrap();

    let (provenance, types) = ProvenanceSynthesizer::new().synthesize(&rule, &mut schema).unwrap();

    assert_eq!(provenance.render(), "a_prov0(X,Y) :- b(_,X),c(_,Y);");
    assert_eq!(types, vec![ScalarType::String, ScalarType::String]);
}

#[test]
fn first_occurrence_decides_the_type() {
    let mut schema = schema(&[
        ("a", &[ScalarType::Int]),
        ("b", &[ScalarType::Int, ScalarType::Other("float".to_string())]),
        ("c", &[ScalarType::String, ScalarType::Int]),
    ]);
    let rule = Rule::parse("a(X) :- b(X,Y), c(Y,X);").unwrap();

    let (_, types) = ProvenanceSynthesizer::new().synthesize(&rule, &mut schema).unwrap();

    assert_eq!(types, vec![ScalarType::Int, ScalarType::Other("float".to_string())]);
}

#[test]
fn negated_subgoal_variables_are_exposed() {
    let mut schema = schema(&[
        ("a", &[ScalarType::Int, ScalarType::Int]),
        ("b", &[ScalarType::Int, ScalarType::Int]),
        ("d", &[ScalarType::Int, ScalarType::Int]),
    ]);
    let rule = Rule::parse("a(X,Y) :- b(X,Y), notin d(X,Y);").unwrap();

    let (provenance, _) = ProvenanceSynthesizer::new().synthesize(&rule, &mut schema).unwrap();

    assert_eq!(provenance.render(), "a_prov0(X,Y) :- b(X,Y),notin d(X,Y);");
}

#[test]
fn counter_spans_every_goal() {
    let mut schema = schema(&[
        ("a", &[ScalarType::Int]),
        ("b", &[ScalarType::Int, ScalarType::Int]),
        ("d", &[ScalarType::Int, ScalarType::Int]),
    ]);
    let rules = vec![
        Rule::parse("a(X) :- b(_,X);").unwrap(),
        Rule::parse("d(X,Y) :- b(X,Y);").unwrap(),
        Rule::parse("a(X) :- d(X,_);").unwrap(),
    ];

    let names: Vec<String> = ProvenanceSynthesizer::new()
        .synthesize_all(&rules, &mut schema)
        .unwrap()
        .iter()
        .map(|r| r.goal_name().to_string())
        .collect();

    assert_eq!(names, vec!["a_prov0", "d_prov1", "a_prov2"]);
}

#[test]
fn unresolvable_head_attribute_consumes_no_number() {
    let mut schema = join_schema();
    let mut synthesizer = ProvenanceSynthesizer::new();

    let bad = Rule::parse("a(X,W) :- b(X,Z);").unwrap();
    let err = synthesizer.synthesize(&bad, &mut schema).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::UnresolvableAttributeType { ref attribute, .. } if attribute == "W"
    ));
    assert_eq!(synthesizer.counter(), 0);
    assert!(!schema.contains("a_prov0"));

    let good = Rule::parse("a(X,Y) :- b(X,Z),c(Z,Y);").unwrap();
    let (provenance, _) = synthesizer.synthesize(&good, &mut schema).unwrap();
    assert_eq!(provenance.goal_name(), "a_prov0");
}

#[test]
fn undeclared_subgoal_relation() {
    let mut schema = join_schema();
    let rule = Rule::parse("a(X,Y) :- e(X,Y);").unwrap();
    let err = ProvenanceSynthesizer::new().synthesize(&rule, &mut schema).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownRelation(ref r) if r == "e"));
}

#[test]
fn subgoal_wider_than_its_schema() {
    let mut schema = join_schema();
    let rule = Rule::parse("a(X,Y) :- b(X,Z,Y);").unwrap();
    let err = ProvenanceSynthesizer::new().synthesize(&rule, &mut schema).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { expected: 2, actual: 3, .. }));
}
