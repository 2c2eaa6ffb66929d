//! Program text: the statement list exchanged with the evaluator.
//!
//! ```text
//! define(b,{int, string});
//! b(0,"str10");
//! a(X,Y) :- b(X,Z),c(Z,Y);
//! ```
//!
//! Statements end with `;`. Blank statements and `//` line comments are
//! ignored when parsing.

use std::fmt;

use tracing::debug;

use whyprov_foundation::{Error, ErrorKind, Result, ScalarType, Value};
use whyprov_storage::{FactStore, SchemaRegistry};

use crate::rule::{Rule, split_top_level};

/// One statement of a program.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `define(relation,{type, ...});`
    Define {
        /// Relation name.
        relation: String,
        /// Column types in order.
        types: Vec<ScalarType>,
    },
    /// `relation(v1,v2,...);`
    Fact {
        /// Relation name.
        relation: String,
        /// Typed values in order.
        values: Vec<Value>,
    },
    /// `head :- body;`
    Rule(Rule),
}

impl Statement {
    /// Renders a define statement.
    #[must_use]
    pub fn define_line(relation: &str, types: &[ScalarType]) -> String {
        let types: Vec<_> = types.iter().map(ScalarType::as_str).collect();
        format!("define({relation},{{{}}});", types.join(", "))
    }

    /// Renders a fact statement.
    #[must_use]
    pub fn fact_line(relation: &str, values: &[Value]) -> String {
        let values: Vec<_> = values.iter().map(Value::literal).collect();
        format!("{relation}({});", values.join(","))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Define { relation, types } => f.write_str(&Self::define_line(relation, types)),
            Self::Fact { relation, values } => f.write_str(&Self::fact_line(relation, values)),
            Self::Rule(rule) => write!(f, "{rule}"),
        }
    }
}

/// Renders the evaluator's program text.
///
/// One `define` line per declared relation in declaration order, then one
/// line per base fact, then the rules in the order given (original rules
/// first, then their provenance counterparts).
#[must_use]
pub fn render_program(schema: &SchemaRegistry, facts: &FactStore, rules: &[Rule]) -> Vec<String> {
    let mut lines: Vec<String> = schema
        .iter()
        .map(|(relation, types)| Statement::define_line(relation, types))
        .collect();
    lines.extend(
        facts
            .iter()
            .map(|(relation, values)| Statement::fact_line(relation, values)),
    );
    lines.extend(rules.iter().map(Rule::render));
    lines
}

/// Parses program text into statements.
///
/// # Errors
///
/// Returns `MalformedProgram` for a statement that is neither a define, a
/// fact, nor a rule, and `MalformedRule` (with the statement index in its
/// context) for a rule that does not parse.
pub fn parse_program(text: &str) -> Result<Vec<Statement>> {
    let stripped: String = text
        .lines()
        .map(strip_comment)
        .collect::<Vec<_>>()
        .join("\n");

    let mut statements = Vec::new();
    for (index, raw) in split_top_level(&stripped, ';').into_iter().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let statement = parse_statement(raw, index).map_err(|e| {
            let context = e
                .context
                .clone()
                .unwrap_or_default()
                .with_source(raw)
                .with_statement(index);
            e.with_context(context)
        })?;
        statements.push(statement);
    }

    debug!(statements = statements.len(), "parsed program");
    Ok(statements)
}

fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let bytes: Vec<char> = line.chars().collect();
    let mut offset = 0;
    for (i, &c) in bytes.iter().enumerate() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '/') if bytes.get(i + 1) == Some(&'/') => return &line[..offset],
            _ => {}
        }
        offset += c.len_utf8();
    }
    line
}

fn malformed(index: usize, reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::MalformedProgram {
        index,
        reason: reason.into(),
    })
}

fn parse_statement(raw: &str, index: usize) -> Result<Statement> {
    if raw.contains(":-") {
        return Rule::parse(raw).map(Statement::Rule);
    }

    let Some(open) = raw.find('(') else {
        return Err(malformed(index, format!("'{raw}' is not parenthesized")));
    };
    let name = raw[..open].trim();
    let Some(inner) = raw[open + 1..].trim_end().strip_suffix(')') else {
        return Err(malformed(index, format!("'{raw}' is missing ')'")));
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(malformed(index, format!("bad relation name in '{raw}'")));
    }

    if name == "define" {
        return parse_define(inner, index);
    }

    let values = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner, ',')
            .into_iter()
            .map(|v| {
                let v = v.trim();
                if v.is_empty() {
                    Err(malformed(index, format!("empty value in '{raw}'")))
                } else {
                    Ok(Value::parse_literal(v))
                }
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok(Statement::Fact {
        relation: name.to_string(),
        values,
    })
}

fn parse_define(inner: &str, index: usize) -> Result<Statement> {
    let Some((relation, types)) = inner.split_once(',') else {
        return Err(malformed(index, "define needs a relation and a type list"));
    };
    let relation = relation.trim();
    let Some(types) = types
        .trim()
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
    else {
        return Err(malformed(index, "define type list must be wrapped in braces"));
    };
    if relation.is_empty() {
        return Err(malformed(index, "define without a relation name"));
    }

    let types = types
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<ScalarType>().unwrap_or_else(|never| match never {}))
        .collect();

    Ok(Statement::Define {
        relation: relation.to_string(),
        types,
    })
}
