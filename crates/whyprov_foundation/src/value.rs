//! Typed values for base facts.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::ScalarType;

/// A typed base-fact value.
///
/// Values are cheaply cloneable. Once facts have been evaluated, only their
/// raw string form survives in result tuples.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// String value (never contains whitespace).
    Str(Arc<str>),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn str(s: impl AsRef<str>) -> Self {
        Self::Str(Arc::from(s.as_ref()))
    }

    /// Returns the type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> ScalarType {
        match self {
            Self::Int(_) => ScalarType::Int,
            Self::Str(_) => ScalarType::String,
        }
    }

    /// Returns the raw field form used in result tuples (strings unquoted).
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.to_string(),
        }
    }

    /// Returns the literal form used in fact statements (strings double-quoted).
    #[must_use]
    pub fn literal(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => format!("\"{s}\""),
        }
    }

    /// Parses a literal as written in a fact statement.
    ///
    /// Double- or single-quoted text is a string; text that parses as an
    /// integer is an integer; anything else is taken as a bare string.
    #[must_use]
    pub fn parse_literal(text: &str) -> Self {
        let text = text.trim();
        let quoted = text.len() >= 2
            && ((text.starts_with('"') && text.ends_with('"'))
                || (text.starts_with('\'') && text.ends_with('\'')));
        if quoted {
            return Self::str(&text[1..text.len() - 1]);
        }
        text.parse::<i64>()
            .map_or_else(|_| Self::str(text), Self::Int)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(Arc::from(s))
    }
}
