//! Column type tags for relation schemas.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type tag for one column of a relation.
///
/// Tags are passed through to the evaluator verbatim; value/type consistency
/// is not checked here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScalarType {
    /// 64-bit signed integer.
    Int,
    /// Whitespace-free string.
    String,
    /// Any other tag understood by an external evaluator.
    Other(String),
}

impl ScalarType {
    /// Returns the tag as written in a `define` statement.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "int" => Self::Int,
            "string" => Self::String,
            other => Self::Other(other.to_string()),
        })
    }
}
