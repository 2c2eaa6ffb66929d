//! Core types, values, tuples, and errors for whyprov.
//!
//! This crate provides:
//! - [`ScalarType`] - Column type tags used in relation schemas
//! - [`Value`] - Typed base-fact values
//! - [`Tuple`] - Raw result tuples and the wildcard marker
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod tuple;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind};
pub use tuple::{Tuple, WILDCARD};
pub use types::ScalarType;
pub use value::Value;

/// Result type used throughout whyprov.
pub type Result<T> = std::result::Result<T, Error>;
