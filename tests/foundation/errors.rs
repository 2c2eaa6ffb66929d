//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use whyprov_foundation::{Error, ErrorContext, ErrorKind, Tuple};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_tuple_not_found() {
    let err = Error::tuple_not_found("a", &Tuple::from_fields(["0", "1"]));
    assert!(matches!(err.kind, ErrorKind::TupleNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "input data tuple '(0,1)' not in the evaluation results for relation 'a'"
    );
}

#[test]
fn error_malformed_rule() {
    let err = Error::malformed_rule("a(X) b(X)", "missing ':-' separator");
    assert!(matches!(err.kind, ErrorKind::MalformedRule { .. }));
    assert!(err.to_string().contains("a(X) b(X)"));
}

#[test]
fn error_unresolvable_attribute() {
    let err = Error::unresolvable_attribute("a_prov0(X,W) :- b(X);", "W");
    assert!(matches!(err.kind, ErrorKind::UnresolvableAttributeType { .. }));
    assert!(err.to_string().contains("'W'"));
}

#[test]
fn error_malformed_results() {
    let err = Error::malformed_results(4, "trailing separator");
    let msg = err.to_string();
    assert!(msg.contains("line 4"));
    assert!(msg.contains("trailing separator"));
}

#[test]
fn error_kinds_without_helpers() {
    let counterpart = Error::new(ErrorKind::NoProvenanceCounterpart("a_prov3(X) :- b(X);".into()));
    assert!(counterpart.to_string().contains("a_prov3"));

    let kind = Error::new(ErrorKind::UnrecognizedNodeKind("X_".into()));
    assert_eq!(kind.to_string(), "unrecognized node kind: X_");

    let aligned = Error::new(ErrorKind::NoAlignedTuple {
        rule: "a_prov0".into(),
        tuple: "(1)".into(),
    });
    assert!(aligned.to_string().contains("a_prov0"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_is_optional() {
    assert!(Error::unknown_relation("b").context.is_none());
}

#[test]
fn context_records_source_and_frames() {
    let err = Error::arity_mismatch("c", 2, 3).with_context(
        ErrorContext::new()
            .with_source("join.dl")
            .with_statement(7)
            .with_frame("G_a(0,1)"),
    );

    let ctx = err.context.as_ref().unwrap();
    assert_eq!(ctx.source.as_deref(), Some("join.dl"));
    assert_eq!(ctx.statement, Some(7));
    assert_eq!(ctx.stack, vec!["G_a(0,1)"]);

    let rendered = ctx.to_string();
    assert!(rendered.contains("in join.dl (statement 7)"));
    assert!(rendered.contains("while explaining G_a(0,1)"));
}

#[test]
fn errors_are_std_errors() {
    fn takes_std(_: &dyn std::error::Error) {}
    takes_std(&Error::new(ErrorKind::NotEvaluated));
}
