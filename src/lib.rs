//! whyprov - Why-provenance for datalog evaluation
//!
//! This crate re-exports all layers of the whyprov system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: whyprov_runtime    - Session, snapshots, REPL, CLI
//! Layer 4: whyprov_debug      - DOT and tree rendering of provenance graphs
//! Layer 3: whyprov_engine     - Provenance synthesis, evaluation, derivation trees
//! Layer 2: whyprov_language   - Rule model, rule and program text
//! Layer 1: whyprov_storage    - Schemas, base facts, results table
//! Layer 0: whyprov_foundation - Core types (Value, Tuple, Error)
//! ```

pub use whyprov_debug as debug;
pub use whyprov_engine as engine;
pub use whyprov_foundation as foundation;
pub use whyprov_language as language;
pub use whyprov_runtime as runtime;
pub use whyprov_storage as storage;
