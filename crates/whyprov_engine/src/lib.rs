//! Provenance-rule synthesis, rule evaluation, and derivation trees for whyprov.
//!
//! This crate provides:
//! - [`ProvenanceSynthesizer`] - Companion provenance rules and their schemas
//! - [`Evaluator`] / [`StratifiedEvaluator`] - Batch datalog evaluation
//! - [`Evaluation`] - The frozen program text, relation order, and results
//! - [`TreeBuilder`] - Backward chaining from a result tuple to its derivation
//! - [`ProvenanceGraph`] - Deduplicated nodes and edges of a derivation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bridge;
pub mod evaluator;
pub mod graph;
pub mod provenance;
pub mod synthesis;

pub use bridge::Evaluation;
pub use evaluator::{DEFAULT_MAX_ITERATIONS, EvaluationOutput, Evaluator, ProgramInput, StratifiedEvaluator};
pub use graph::{Edge, Node, NodeKind, ProvenanceGraph, canonical_label};
pub use provenance::TreeBuilder;
pub use synthesis::{PROVENANCE_INFIX, ProvenanceSynthesizer, provenance_base, provenance_name};
