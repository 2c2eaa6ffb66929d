//! Schema registry: relation name to ordered column types.
//!
//! The registry grows monotonically. Entries are added or overwritten, never
//! removed, and iteration follows first-declaration order, which is the order
//! `define` statements are emitted in.

use im::{HashMap, Vector};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use whyprov_foundation::{Error, Result, ScalarType};

/// Mapping from relation name to its ordered attribute types.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaRegistry {
    types: HashMap<String, Vec<ScalarType>>,
    order: Vector<String>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the schema of `relation`.
    ///
    /// Declaring a relation again overwrites its types (last write wins) but
    /// keeps its original position in declaration order.
    pub fn declare(&mut self, relation: impl Into<String>, types: Vec<ScalarType>) {
        let relation = relation.into();
        debug!(relation = %relation, ?types, "declare schema");
        if !self.types.contains_key(&relation) {
            self.order.push_back(relation.clone());
        }
        self.types.insert(relation, types);
    }

    /// Looks up the schema of `relation`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRelation` if the relation was never declared.
    pub fn lookup(&self, relation: &str) -> Result<&[ScalarType]> {
        self.get(relation)
            .ok_or_else(|| Error::unknown_relation(relation))
    }

    /// Returns the schema of `relation`, if declared.
    #[must_use]
    pub fn get(&self, relation: &str) -> Option<&[ScalarType]> {
        self.types.get(relation).map(Vec::as_slice)
    }

    /// Returns true if `relation` has been declared.
    #[must_use]
    pub fn contains(&self, relation: &str) -> bool {
        self.types.contains_key(relation)
    }

    /// Returns the declared relation names in declaration order.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns `(relation, types)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScalarType])> {
        self.order.iter().filter_map(|relation| {
            self.types
                .get(relation)
                .map(|types| (relation.as_str(), types.as_slice()))
        })
    }

    /// Returns the number of declared relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
