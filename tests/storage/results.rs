//! Integration tests for ResultsTable

use proptest::prelude::*;
use whyprov_foundation::{ErrorKind, Tuple};
use whyprov_storage::{RESULT_SEPARATOR, ResultsTable};

fn stream(blocks: &[(&str, &[&str])]) -> Vec<String> {
    let mut lines = Vec::new();
    for (relation, tuples) in blocks {
        lines.push(RESULT_SEPARATOR.to_string());
        lines.push((*relation).to_string());
        lines.extend(tuples.iter().map(ToString::to_string));
    }
    lines
}

#[test]
fn separator_is_27_dashes() {
    assert_eq!(RESULT_SEPARATOR.len(), 27);
    assert!(RESULT_SEPARATOR.chars().all(|c| c == '-'));
}

#[test]
fn negation_scenario_stream() {
    let lines = stream(&[
        ("a", &["0,1", "0,3"]),
        ("b", &["0,1", "0,3"]),
        ("d", &["1,4", "2,4", "1,5", "2,5"]),
        ("a_prov0", &["0,1", "0,3"]),
    ]);
    let table = ResultsTable::parse_lines(&lines).unwrap();

    assert_eq!(table.len(), 4);
    assert!(table.contains("d", &Tuple::from_fields(["2", "5"])));
    assert!(!table.contains("a", &Tuple::from_fields(["1", "4"])));
    assert_eq!(table.to_lines(), lines);
}

#[test]
fn empty_relations_are_present() {
    let lines = stream(&[("a", &[]), ("b", &["1"]), ("c", &[])]);
    let table = ResultsTable::parse_lines(&lines).unwrap();

    assert!(table.has_relation("a"));
    assert!(table.has_relation("c"));
    assert_eq!(table.get("a").map(|t| t.len()), Some(0));
    assert!(!table.has_relation("z"));
    assert_eq!(table.tuples("z").count(), 0);
}

#[test]
fn malformed_streams() {
    let cases: [&[&str]; 4] = [
        &["a", "0,1"],
        &[RESULT_SEPARATOR, RESULT_SEPARATOR, "a"],
        &[RESULT_SEPARATOR, "a", "1", RESULT_SEPARATOR],
        &[RESULT_SEPARATOR, "a", RESULT_SEPARATOR, "a"],
    ];
    for lines in cases {
        let err = ResultsTable::parse_lines(lines).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::MalformedResultStream { .. }),
            "{lines:?} gave {err}"
        );
    }
}

#[test]
fn empty_stream_is_an_empty_table() {
    let table = ResultsTable::parse_lines::<&str>(&[]).unwrap();
    assert!(table.is_empty());
}

fn relation_name() -> impl Strategy<Value = String> {
    "[a-z]{1,3}(_prov[0-9])?"
}

fn tuple_line() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9]{1,3}", 1..4).prop_map(|fields| fields.join(","))
}

proptest! {
    #[test]
    fn streams_parse_back_to_themselves(
        blocks in prop::collection::btree_map(relation_name(), prop::collection::vec(tuple_line(), 0..5), 0..6)
    ) {
        let mut lines = Vec::new();
        for (relation, tuples) in &blocks {
            lines.push(RESULT_SEPARATOR.to_string());
            lines.push(relation.clone());
            lines.extend(tuples.iter().cloned());
        }
        let table = ResultsTable::parse_lines(&lines).unwrap();
        prop_assert_eq!(table.len(), blocks.len());
        for (relation, tuples) in &blocks {
            prop_assert_eq!(table.tuples(relation).count(), tuples.len());
        }
        prop_assert_eq!(table.to_lines(), lines);
    }
}
