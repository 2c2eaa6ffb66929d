//! Raw result tuples.
//!
//! After evaluation every field is an uninterpreted string; comparisons are
//! componentwise string equality. The wildcard marker `_` stands for "any
//! value" in a requested tuple.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The wildcard marker, in attributes and in tuple positions.
pub const WILDCARD: &str = "_";

/// An ordered sequence of raw field values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tuple(Vec<String>);

impl Tuple {
    /// Creates a tuple from raw fields.
    #[must_use]
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Parses one result line: comma-joined raw values, no spaces.
    #[must_use]
    pub fn from_line(line: &str) -> Self {
        if line.is_empty() {
            return Self::default();
        }
        Self::from_fields(line.split(','))
    }

    /// Parses a user-supplied tuple such as `(0, "str10")` or `0,str10`.
    ///
    /// Brackets, quotes, and whitespace are stripped, so `[0, 'a']` and
    /// `(0,a)` denote the same tuple.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '[' | ']' | '"' | '\''))
            .collect();
        Self::from_line(&cleaned)
    }

    /// Returns the fields.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Returns the field at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the tuple has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if any position holds the wildcard marker.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(|f| f == WILDCARD)
    }

    /// Returns true if `self`, a concrete tuple, matches `pattern` on every
    /// non-wildcard position.
    #[must_use]
    pub fn matches_pattern(&self, pattern: &Tuple) -> bool {
        self.len() == pattern.len()
            && self
                .0
                .iter()
                .zip(&pattern.0)
                .all(|(field, want)| want == WILDCARD || field == want)
    }

    /// Returns true if the first `prefix.len()` fields of `self` equal
    /// `prefix` componentwise, in order.
    #[must_use]
    pub fn aligns_with(&self, prefix: &Tuple) -> bool {
        self.len() >= prefix.len() && self.0[..prefix.len()] == prefix.0[..]
    }

    /// Renders the fields comma-joined, as in a result line.
    #[must_use]
    pub fn to_line(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(","))
    }
}

impl From<Vec<String>> for Tuple {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl From<&[Value]> for Tuple {
    fn from(values: &[Value]) -> Self {
        Self(values.iter().map(Value::raw).collect())
    }
}

impl FromIterator<String> for Tuple {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
