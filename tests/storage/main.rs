//! Integration tests for Layer 1: Storage
//!
//! Tests for the schema registry, the base-fact store, and the results table.

mod results;
mod schema;
