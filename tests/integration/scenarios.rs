//! Complete provenance batches, one per derivation pattern

use whyprov_foundation::{ErrorKind, ScalarType, Tuple, Value};
use whyprov_runtime::Session;
use whyprov_storage::RESULT_SEPARATOR;

fn tuple(fields: &[&str]) -> Tuple {
    Tuple::from_fields(fields.iter().copied())
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn strs(values: &[&str]) -> Vec<Value> {
    values.iter().map(Value::str).collect()
}

fn names(session: &Session, relation: &str, fields: &[&str]) -> Vec<String> {
    session
        .provenance(relation, &tuple(fields))
        .unwrap()
        .nodes()
        .iter()
        .map(|n| n.name())
        .collect()
}

// =============================================================================
// Join
// =============================================================================

fn join_session() -> Session {
    let mut session = Session::new();
    session
        .declare_schema("a", vec![ScalarType::Int, ScalarType::Int])
        .unwrap();
    session
        .declare_schema("b", vec![ScalarType::Int, ScalarType::String])
        .unwrap();
    session
        .declare_schema("c", vec![ScalarType::String, ScalarType::Int])
        .unwrap();
    session.insert_fact("b", vec![Value::Int(0), Value::str("str10")]).unwrap();
    session.insert_fact("c", vec![Value::str("str10"), Value::Int(1)]).unwrap();
    session.add_rule("a(X,Y) :- b(X,Z), c(Z,Y)").unwrap();
    session.run().unwrap();
    session
}

#[test]
fn join_program_and_results() {
    let session = join_session();
    let evaluation = session.evaluation().unwrap();

    assert!(evaluation.program.contains(&"define(a_prov0,{int, int, string});".to_string()));
    assert!(evaluation.program.contains(&"a_prov0(X,Y,Z) :- b(X,Z),c(Z,Y);".to_string()));
    assert_eq!(
        evaluation.result_lines,
        vec![
            RESULT_SEPARATOR, "a", "0,1",
            RESULT_SEPARATOR, "b", "0,str10",
            RESULT_SEPARATOR, "c", "str10,1",
            RESULT_SEPARATOR, "a_prov0", "0,1,str10",
        ]
    );
    assert_eq!(session.provenance_counter(), 1);
}

#[test]
fn join_derivation() {
    let session = join_session();
    let graph = session.provenance("a", &tuple(&["0", "1"])).unwrap();

    assert_eq!(
        graph.nodes().iter().map(|n| n.name()).collect::<Vec<_>>(),
        vec![
            "G_a(0,1)",
            "R_a_prov0(0,1,str10)",
            "G_b(0,str10)",
            "F_b(0,str10)",
            "G_c(str10,1)",
            "F_c(str10,1)",
        ]
    );
    assert_eq!(graph.edge_count(), 5);
    assert!(graph.has_edge("R_a_prov0(0,1,str10)", "G_c(str10,1)"));
}

// =============================================================================
// Missing Tuple
// =============================================================================

#[test]
fn tuple_outside_the_results() {
    let mut session = Session::new();
    session.declare_schema("a", vec![ScalarType::Int; 2]).unwrap();
    session.declare_schema("b", vec![ScalarType::Int; 2]).unwrap();
    session.declare_schema("c", vec![ScalarType::Int; 2]).unwrap();
    session.insert_product("b", vec![ints(&[0]), ints(&[1, 2])]).unwrap();
    session.insert_product("c", vec![ints(&[1]), ints(&[2, 3])]).unwrap();
    session.add_rule("a(X,Y) :- b(_,X),c(_,Y)").unwrap();
    session.run().unwrap();

    assert!(session.verify("a", &tuple(&["1", "3"])).unwrap());
    let err = session.provenance("a", &tuple(&["0", "1"])).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TupleNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "input data tuple '(0,1)' not in the evaluation results for relation 'a'"
    );
}

// =============================================================================
// Wildcards
// =============================================================================

fn wildcard_session(rules: &[&str], goal: &[ScalarType]) -> Session {
    let mut session = Session::new();
    session.declare_schema("a", goal.to_vec()).unwrap();
    session
        .declare_schema("b", vec![ScalarType::Int, ScalarType::String])
        .unwrap();
    session
        .declare_schema("c", vec![ScalarType::Int, ScalarType::String])
        .unwrap();
    session
        .insert_product("b", vec![ints(&[0]), strs(&["str1", "str2"])])
        .unwrap();
    session
        .insert_product("c", vec![ints(&[1, 2]), strs(&["str2", "str3"])])
        .unwrap();
    for rule in rules {
        session.add_rule(rule).unwrap();
    }
    session.run().unwrap();
    session
}

#[test]
fn single_rule_with_wildcards() {
    let session = wildcard_session(
        &["a(X,Y) :- b(_,X),c(_,Y)"],
        &[ScalarType::String, ScalarType::String],
    );

    assert_eq!(
        session.rules()[1].render(),
        "a_prov0(X,Y) :- b(_,X),c(_,Y);"
    );
    assert_eq!(
        names(&session, "a", &["str1", "str2"]),
        vec![
            "G_a(str1,str2)",
            "R_a_prov0(str1,str2)",
            "G_b(_,str1)",
            "G_b(0,str1)",
            "F_b(0,str1)",
            "G_c(_,str2)",
            "G_c(1,str2)",
            "F_c(1,str2)",
            "G_c(2,str2)",
            "F_c(2,str2)",
        ]
    );
}

#[test]
fn two_rules_for_one_goal() {
    let session = wildcard_session(&["a(X) :- b(_,X)", "a(X) :- c(_,X)"], &[ScalarType::String]);
    let provenance: Vec<&str> = session.provenance_rules().map(|r| r.goal_name()).collect();
    assert_eq!(provenance, vec!["a_prov0", "a_prov1"]);

    let both = session.provenance("a", &tuple(&["str2"])).unwrap();
    assert!(both.has_edge("G_a(str2)", "R_a_prov0(str2)"));
    assert!(both.has_edge("G_a(str2)", "R_a_prov1(str2)"));
    assert!(both.has_edge("R_a_prov0(str2)", "G_b(_,str2)"));
    assert!(both.has_edge("R_a_prov1(str2)", "G_c(_,str2)"));

    assert_eq!(
        names(&session, "a", &["str1"]),
        vec!["G_a(str1)", "R_a_prov0(str1)", "G_b(_,str1)", "G_b(0,str1)", "F_b(0,str1)"]
    );
}

// =============================================================================
// Negation
// =============================================================================

#[test]
fn negated_subgoal_ends_its_branch() {
    let mut session = Session::new();
    for relation in ["a", "b", "c", "d"] {
        session.declare_schema(relation, vec![ScalarType::Int; 2]).unwrap();
    }
    session.insert_product("b", vec![ints(&[0]), ints(&[1, 3])]).unwrap();
    session.insert_product("c", vec![ints(&[1, 2]), ints(&[4, 5])]).unwrap();
    session.add_rule("a(X,Y) :- b(X,Y), notin d(X,Y)").unwrap();
    session.add_rule("d(X,Y) :- c(X,Y)").unwrap();
    session.run().unwrap();

    let d: Vec<String> = session.results().unwrap().tuples("d").map(Tuple::to_line).collect();
    assert_eq!(d, vec!["1,4", "2,4", "1,5", "2,5"]);
    assert_eq!(
        session.provenance_rules().map(|r| r.render()).collect::<Vec<_>>(),
        vec!["a_prov0(X,Y) :- b(X,Y),notin d(X,Y);", "d_prov1(X,Y) :- c(X,Y);"]
    );

    assert_eq!(
        names(&session, "a", &["0", "1"]),
        vec!["G_a(0,1)", "R_a_prov0(0,1)", "G_b(0,1)", "F_b(0,1)", "G_notin d(0,1)"]
    );
    assert_eq!(
        names(&session, "d", &["2", "5"]),
        vec!["G_d(2,5)", "R_d_prov1(2,5)", "G_c(2,5)", "F_c(2,5)"]
    );
}

// =============================================================================
// Provenance-Shaped Names
// =============================================================================

#[test]
fn user_relation_named_like_a_provenance_rule() {
    let mut session = Session::new();
    session
        .load_program("define(x_prov1,{int}); define(e,{int}); e(7); x_prov1(X) :- e(X);")
        .unwrap();
    session.run().unwrap();

    assert_eq!(
        names(&session, "x_prov1", &["7"]),
        vec!["G_x_prov1(7)", "R_x_prov1_prov0(7)", "G_e(7)", "F_e(7)"]
    );
}

#[test]
fn user_rule_sharing_a_goal_prefix_is_not_a_firing() {
    let mut session = Session::new();
    session
        .load_program(
            "define(a,{int}); define(a_prov7,{int}); define(e,{int}); define(f,{int});
             e(1); f(1);
             a(X) :- e(X);
             a_prov7(X) :- f(X);",
        )
        .unwrap();
    session.run().unwrap();

    assert_eq!(
        names(&session, "a", &["1"]),
        vec!["G_a(1)", "R_a_prov0(1)", "G_e(1)", "F_e(1)"]
    );
    assert_eq!(
        names(&session, "a_prov7", &["1"]),
        vec!["G_a_prov7(1)", "R_a_prov7_prov1(1)", "G_f(1)", "F_f(1)"]
    );
}

#[test]
fn wildcard_request_is_rejected() {
    let session = join_session();
    let err = session.provenance("b", &tuple(&["_", "str10"])).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TupleNotFound { .. }));
}

// =============================================================================
// Batch Lifecycle
// =============================================================================

#[test]
fn one_batch_per_session() {
    let mut session = join_session();
    assert!(matches!(session.run().unwrap_err().kind, ErrorKind::AlreadyEvaluated));
    assert!(matches!(
        session.add_rule("a(X,Y) :- b(X,Y)").unwrap_err().kind,
        ErrorKind::AlreadyEvaluated
    ));
    assert_eq!(session.provenance_counter(), 1);
}

#[test]
fn failed_synthesis_keeps_the_session_open() {
    let mut session = Session::new();
    session
        .load_program("define(a,{int, int}); define(b,{int}); b(1); a(X,Y) :- b(X);")
        .unwrap();

    let err = session.run().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnresolvableAttributeType { .. }));
    assert!(!session.is_evaluated());
    assert_eq!(session.provenance_counter(), 0);
    assert!(!session.schema().contains("a_prov0"));
}
