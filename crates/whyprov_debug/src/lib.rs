//! Provenance graph rendering and output configuration for whyprov.
//!
//! This crate provides:
//! - [`ProvenanceConfig`] - DOT output options and presets
//! - [`DotFormatter`] / [`TreeFormatter`] - Graph output formats
//! - [`RenderGraph`] - Rendering helpers on [`ProvenanceGraph`](whyprov_engine::ProvenanceGraph)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod format;

pub use config::ProvenanceConfig;
pub use format::{DotFormatter, GraphFormatter, RenderGraph, TreeFormatter};
