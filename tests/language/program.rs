//! Integration tests for program text

use whyprov_foundation::{ErrorKind, ScalarType, Value};
use whyprov_language::{Rule, Statement, parse_program, render_program};
use whyprov_storage::{FactStore, SchemaRegistry};

const NEGATION_PROGRAM: &str = r#"
// base relations
define(a,{int, int});
define(b,{int, int});
define(c,{int, int});
define(d,{int, int});

b(0,1); b(0,3);
c(1,4); c(2,4); c(1,5); c(2,5);

a(X,Y) :- b(X,Y), notin d(X,Y) ;
d(X,Y) :- c(X,Y) ;
"#;

#[test]
fn statements_in_source_order() {
    let statements = parse_program(NEGATION_PROGRAM).unwrap();
    assert_eq!(statements.len(), 12);

    let defines = statements
        .iter()
        .filter(|s| matches!(s, Statement::Define { .. }))
        .count();
    let rules: Vec<&Rule> = statements
        .iter()
        .filter_map(|s| match s {
            Statement::Rule(rule) => Some(rule),
            _ => None,
        })
        .collect();

    assert_eq!(defines, 4);
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].render(), "a(X,Y) :- b(X,Y),notin d(X,Y);");
}

#[test]
fn statements_render_back() {
    let statements = parse_program("define(b,{int, string}); b(0,\"str10\");").unwrap();
    let lines: Vec<String> = statements.iter().map(ToString::to_string).collect();
    assert_eq!(lines, vec!["define(b,{int, string});", "b(0,\"str10\");"]);
}

#[test]
fn render_matches_the_evaluator_contract() {
    let mut schema = SchemaRegistry::new();
    schema.declare("a", vec![ScalarType::Int, ScalarType::Int]);
    schema.declare("b", vec![ScalarType::Int, ScalarType::String]);
    schema.declare("c", vec![ScalarType::String, ScalarType::Int]);
    schema.declare("a_prov0", vec![ScalarType::Int, ScalarType::Int, ScalarType::String]);

    let mut facts = FactStore::new();
    facts.insert("b", vec![Value::Int(0), Value::str("str10")]);
    facts.insert("c", vec![Value::str("str10"), Value::Int(1)]);

    let rules = vec![
        Rule::parse("a(X,Y) :- b(X,Z), c(Z,Y) ;").unwrap(),
        Rule::parse("a_prov0(X,Y,Z) :- b(X,Z),c(Z,Y);").unwrap().into_provenance(),
    ];

    assert_eq!(
        render_program(&schema, &facts, &rules),
        vec![
            "define(a,{int, int});",
            "define(b,{int, string});",
            "define(c,{string, int});",
            "define(a_prov0,{int, int, string});",
            "b(0,\"str10\");",
            "c(\"str10\",1);",
            "a(X,Y) :- b(X,Z),c(Z,Y);",
            "a_prov0(X,Y,Z) :- b(X,Z),c(Z,Y);",
        ]
    );
}

#[test]
fn empty_text_has_no_statements() {
    assert!(parse_program("  \n// nothing\n;;").unwrap().is_empty());
}

#[test]
fn errors_point_at_the_statement() {
    let err = parse_program("define(a,{int});\nb(1);\n(3);").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MalformedProgram { index: 2, .. }));
    let context = err.context.unwrap();
    assert_eq!(context.statement, Some(2));
    assert_eq!(context.source.as_deref(), Some("(3)"));
}
