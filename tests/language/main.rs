//! Integration tests for Layer 2: Language
//!
//! Tests for the rule model and the rule and program text codecs.

mod program;
