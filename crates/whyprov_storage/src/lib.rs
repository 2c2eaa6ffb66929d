//! Schema registry, base-fact store, and frozen results table for whyprov.
//!
//! This crate provides:
//! - [`SchemaRegistry`] - Relation name to ordered column types
//! - [`FactStore`] - Insertion-ordered base facts
//! - [`ResultsTable`] - Evaluation results parsed from the flat result stream

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod facts;
pub mod results;
pub mod schema;

pub use facts::FactStore;
pub use results::{RESULT_SEPARATOR, ResultsTable};
pub use schema::SchemaRegistry;
