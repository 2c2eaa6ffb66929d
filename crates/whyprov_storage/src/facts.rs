//! Base-fact storage.
//!
//! Facts are typed tuples kept in insertion order per relation, with
//! relations themselves kept in first-insertion order. Duplicate facts are
//! ignored.

use im::{HashMap, HashSet, Vector};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use whyprov_foundation::Value;

/// Store of extensional (base) facts.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactStore {
    facts: HashMap<String, Vector<Vec<Value>>>,
    seen: HashSet<(String, Vec<Value>)>,
    order: Vector<String>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one fact. Returns false if it was already present.
    pub fn insert(&mut self, relation: impl Into<String>, values: Vec<Value>) -> bool {
        let relation = relation.into();
        let key = (relation.clone(), values.clone());
        if self.seen.contains(&key) {
            return false;
        }
        trace!(relation = %relation, ?values, "insert fact");
        self.seen.insert(key);
        if let Some(tuples) = self.facts.get_mut(&relation) {
            tuples.push_back(values);
        } else {
            self.order.push_back(relation.clone());
            self.facts.insert(relation, Vector::unit(values));
        }
        true
    }

    /// Inserts the cartesian product of per-column value lists.
    ///
    /// The first column varies fastest: columns `[[1, 2], [4, 5]]` insert
    /// `(1,4)`, `(2,4)`, `(1,5)`, `(2,5)`. Returns the number of new facts.
    pub fn insert_product(&mut self, relation: impl Into<String>, columns: Vec<Vec<Value>>) -> usize {
        let relation = relation.into();
        if columns.iter().any(Vec::is_empty) {
            return 0;
        }

        let mut rows: Vec<Vec<Value>> = vec![Vec::new()];
        for column in &columns {
            let mut next = Vec::with_capacity(rows.len() * column.len());
            for value in column {
                for row in &rows {
                    let mut row = row.clone();
                    row.push(value.clone());
                    next.push(row);
                }
            }
            rows = next;
        }

        rows.into_iter()
            .filter(|row| self.insert(relation.clone(), row.clone()))
            .count()
    }

    /// Returns the facts of `relation` in insertion order.
    pub fn tuples(&self, relation: &str) -> impl Iterator<Item = &Vec<Value>> {
        self.facts.get(relation).into_iter().flat_map(|v| v.iter())
    }

    /// Returns relation names in first-insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns every `(relation, values)` pair, relation by relation.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vec<Value>)> {
        self.order
            .iter()
            .flat_map(move |rel| self.tuples(rel).map(move |values| (rel.as_str(), values)))
    }

    /// Returns the total number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if the store holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
