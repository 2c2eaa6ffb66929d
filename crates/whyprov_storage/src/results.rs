//! Evaluation results table.
//!
//! Built once from the evaluator's flat result stream and frozen for the rest
//! of the session. The table is cheap to clone and safe to share across
//! threads, so independent provenance queries can read it concurrently.
//!
//! # Stream format
//!
//! ```text
//! ---------------------------
//! a
//! 0,1
//! ---------------------------
//! b
//! 0,str10
//! ```
//!
//! Blocks of `[separator, relation, tuple-line*]` are concatenated with no
//! blank lines and no separator after the final block.

use im::{HashMap, Vector};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use whyprov_foundation::{Error, Result, Tuple};

/// The block separator: exactly 27 `-` characters.
pub const RESULT_SEPARATOR: &str = "---------------------------";

/// Relation name to the ordered tuples the evaluator produced for it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultsTable {
    tables: HashMap<String, Vector<Tuple>>,
    order: Vector<String>,
}

fn is_separator(line: &str) -> bool {
    line.trim() == RESULT_SEPARATOR
}

impl ResultsTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the flat result stream.
    ///
    /// A line directly after a separator is a relation name; every other
    /// non-separator line is a tuple of the currently open block. A relation
    /// followed directly by the next separator (or by the end of input) is
    /// recorded with an empty tuple sequence.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResultStream` if data appears before the first
    /// separator, two separators are adjacent, the stream ends with a
    /// separator, a relation name is blank, or a relation appears twice.
    pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut table = Self::new();
        let mut open: Option<(String, Vec<Tuple>)> = None;
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref().trim();
            let after_separator = i > 0 && is_separator(lines[i - 1].as_ref());

            if is_separator(line) {
                if after_separator {
                    return Err(Error::malformed_results(i, "separator without a relation name"));
                }
                if i == last {
                    return Err(Error::malformed_results(i, "trailing separator"));
                }
                if let Some((relation, tuples)) = open.take() {
                    table.push_block(relation, tuples, i)?;
                }
            } else if after_separator {
                if line.is_empty() {
                    return Err(Error::malformed_results(i, "blank relation name"));
                }
                trace!(line = i, relation = line, "result block");
                open = Some((line.to_string(), Vec::new()));
            } else if let Some((_, tuples)) = open.as_mut() {
                tuples.push(Tuple::from_line(line));
            } else {
                return Err(Error::malformed_results(i, "data before the first separator"));
            }
        }

        if let Some((relation, tuples)) = open.take() {
            table.push_block(relation, tuples, last)?;
        }

        debug!(relations = table.order.len(), "parsed result stream");
        Ok(table)
    }

    fn push_block(&mut self, relation: String, tuples: Vec<Tuple>, line: usize) -> Result<()> {
        if self.tables.contains_key(&relation) {
            return Err(Error::malformed_results(
                line,
                format!("relation '{relation}' appears twice"),
            ));
        }
        self.insert_relation(relation, tuples);
        Ok(())
    }

    /// Adds (or replaces) the tuples of a relation.
    pub fn insert_relation(&mut self, relation: impl Into<String>, tuples: impl IntoIterator<Item = Tuple>) {
        let relation = relation.into();
        if !self.tables.contains_key(&relation) {
            self.order.push_back(relation.clone());
        }
        self.tables.insert(relation, tuples.into_iter().collect());
    }

    /// Returns the tuples of `relation`, or `None` if it was never reported.
    #[must_use]
    pub fn get(&self, relation: &str) -> Option<&Vector<Tuple>> {
        self.tables.get(relation)
    }

    /// Returns the tuples of `relation`; unreported relations yield nothing.
    pub fn tuples(&self, relation: &str) -> impl Iterator<Item = &Tuple> {
        self.tables.get(relation).into_iter().flat_map(|v| v.iter())
    }

    /// Returns true if `relation` holds a tuple equal to `tuple`.
    #[must_use]
    pub fn contains(&self, relation: &str, tuple: &Tuple) -> bool {
        self.tuples(relation).any(|t| t == tuple)
    }

    /// Returns true if `relation` was reported by the evaluator.
    #[must_use]
    pub fn has_relation(&self, relation: &str) -> bool {
        self.tables.contains_key(relation)
    }

    /// Returns relation names in reported order.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the number of relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no relation was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Renders the table back into the flat result stream.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for relation in &self.order {
            lines.push(RESULT_SEPARATOR.to_string());
            lines.push(relation.clone());
            lines.extend(self.tuples(relation).map(Tuple::to_line));
        }
        lines
    }
}
