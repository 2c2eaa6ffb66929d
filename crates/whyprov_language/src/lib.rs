//! Rule model, rule-text codec, and program-text codec for whyprov.
//!
//! This crate provides:
//! - [`Rule`] - Structured rules with a canonical text form
//! - [`Statement`] - `define`, fact, and rule statements of a program
//! - [`parse_program`] / [`render_program`] - The evaluator's program text

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod program;
pub mod rule;

pub use program::{Statement, parse_program, render_program};
pub use rule::{Attribute, NEGATION_MARKER, Rule, Subgoal};
