//! Sessions, result snapshots, REPL, and CLI for whyprov.
//!
//! This crate provides:
//! - [`Session`] - Schema, facts, rules, and the frozen evaluation of one batch
//! - [`EvaluationSnapshot`] - `MessagePack` persistence of an evaluated session
//! - [`Repl`] - Interactive provenance queries
//! - The `whyprov` command-line binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod repl;
pub mod serialize;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, parse_atom};
pub use serialize::{EvaluationSnapshot, from_bytes, load_from_file, save_to_file, to_bytes};
pub use session::{Session, SessionConfig};
