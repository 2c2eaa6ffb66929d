//! Error types for whyprov.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! failure is deterministic and aborts the requested operation; nothing here
//! is retryable.

use std::fmt;

use thiserror::Error;

use crate::tuple::Tuple;

/// The main error type for whyprov operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a tuple-not-found error.
    #[must_use]
    pub fn tuple_not_found(relation: impl Into<String>, tuple: &Tuple) -> Self {
        Self::new(ErrorKind::TupleNotFound {
            relation: relation.into(),
            tuple: tuple.to_string(),
        })
    }

    /// Creates a malformed rule error.
    #[must_use]
    pub fn malformed_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRule {
            rule: rule.into(),
            reason: reason.into(),
        })
    }

    /// Creates an unknown relation error.
    #[must_use]
    pub fn unknown_relation(relation: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownRelation(relation.into()))
    }

    /// Creates an unresolvable attribute type error.
    #[must_use]
    pub fn unresolvable_attribute(rule: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvableAttributeType {
            rule: rule.into(),
            attribute: attribute.into(),
        })
    }

    /// Creates a malformed result stream error.
    #[must_use]
    pub fn malformed_results(line: usize, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResultStream {
            line,
            reason: reason.into(),
        })
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(relation: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            relation: relation.into(),
            expected,
            actual,
        })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The requested output tuple is absent from the relation's results.
    #[error("input data tuple '{tuple}' not in the evaluation results for relation '{relation}'")]
    TupleNotFound {
        /// The relation that was queried.
        relation: String,
        /// The tuple as rendered `(v1,v2,...)`.
        tuple: String,
    },

    /// Rule text could not be parsed.
    #[error("malformed rule '{rule}': {reason}")]
    MalformedRule {
        /// The offending rule text.
        rule: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A relation was referenced without a schema declaration.
    #[error("unknown relation: {0}")]
    UnknownRelation(String),

    /// A provenance head attribute never appears in any subgoal.
    #[error("cannot infer a type for attribute '{attribute}' of rule '{rule}'")]
    UnresolvableAttributeType {
        /// The provenance rule being typed.
        rule: String,
        /// The attribute with no subgoal occurrence.
        attribute: String,
    },

    /// The evaluator's flat result listing is not well formed.
    #[error("malformed result stream at line {line}: {reason}")]
    MalformedResultStream {
        /// Zero-based index of the offending line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// An IDB rule has no body-matching provenance rule.
    #[error("rule '{0}' has no corresponding provenance rule")]
    NoProvenanceCounterpart(String),

    /// A firing rule was selected but none of its tuples align.
    #[error("no tuples of firing provenance rule '{rule}' align with data tuple '{tuple}'")]
    NoAlignedTuple {
        /// The provenance relation that was scanned.
        rule: String,
        /// The data tuple being explained.
        tuple: String,
    },

    /// A node kind tag was not one of goal, fact, or rule.
    #[error("unrecognized node kind: {0}")]
    UnrecognizedNodeKind(String),

    /// An atom's width does not match its relation's schema.
    #[error("arity mismatch for relation '{relation}': expected {expected}, got {actual}")]
    ArityMismatch {
        /// The relation whose schema was violated.
        relation: String,
        /// Width declared in the schema.
        expected: usize,
        /// Width actually supplied.
        actual: usize,
    },

    /// A subgoal attribute has no binding from the provenance head.
    #[error("variable '{variable}' is unbound in rule '{rule}'")]
    UnboundVariable {
        /// The rule being grounded.
        rule: String,
        /// The unbound variable name.
        variable: String,
    },

    /// A variable is not range-restricted by a positive subgoal.
    #[error("unsafe rule '{rule}': variable '{variable}' does not occur in a positive subgoal")]
    UnsafeRule {
        /// The offending rule.
        rule: String,
        /// The unrestricted variable.
        variable: String,
    },

    /// The program recurses through negation.
    #[error("program is not stratifiable: '{0}' depends negatively on itself")]
    Unstratifiable(String),

    /// A program-text statement could not be parsed.
    #[error("malformed program statement {index}: {reason}")]
    MalformedProgram {
        /// Zero-based statement index.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Provenance was requested before the session was evaluated.
    #[error("session has not been evaluated yet")]
    NotEvaluated,

    /// The session was already evaluated; every session is a single batch.
    #[error("session has already been evaluated")]
    AlreadyEvaluated,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or rule text.
    pub source: Option<String>,
    /// Statement index within the source.
    pub statement: Option<usize>,
    /// Chain of relations being explained when the error occurred.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the statement index.
    #[must_use]
    pub fn with_statement(mut self, statement: usize) -> Self {
        self.statement = Some(statement);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
            if let Some(statement) = self.statement {
                write!(f, " (statement {statement})")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  while explaining {frame}")?;
            }
        }
        Ok(())
    }
}
