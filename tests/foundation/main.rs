//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Tuple, ScalarType, and Error.

mod errors;
mod tuples;
mod values;
