//! Evaluation snapshots using `MessagePack`.
//!
//! A snapshot holds everything provenance queries need: the rules (original
//! and provenance), the schemas, and the frozen evaluation. Loading one
//! lets a later process explain results without evaluating again.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use whyprov_engine::Evaluation;
use whyprov_foundation::{Error, ErrorKind, Result};
use whyprov_language::Rule;
use whyprov_storage::SchemaRegistry;

/// The persisted state of an evaluated session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSnapshot {
    /// Schemas of every relation, provenance relations included.
    pub schema: SchemaRegistry,
    /// Original rules followed by their provenance rules.
    pub rules: Vec<Rule>,
    /// Program text, relation order, and results.
    pub evaluation: Evaluation,
}

/// Serializes a snapshot to bytes.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns `SerializationError` if encoding fails.
pub fn to_bytes(snapshot: &EvaluationSnapshot) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(snapshot).map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a snapshot from bytes.
///
/// # Errors
///
/// Returns `SerializationError` if decoding fails.
pub fn from_bytes(bytes: &[u8]) -> Result<EvaluationSnapshot> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Saves a snapshot to a file, replacing any existing file.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be created or written, and
/// `SerializationError` if encoding fails.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &EvaluationSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_error = |action: &str, e: std::io::Error| {
        Error::new(ErrorKind::IoError(format!(
            "failed to {action} '{}': {e}",
            path.display()
        )))
    };

    let bytes = to_bytes(snapshot)?;
    let file = File::create(path).map_err(|e| io_error("create", e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| io_error("write", e))?;
    writer.flush().map_err(|e| io_error("flush", e))?;
    Ok(())
}

/// Loads a snapshot from a file.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be read and `SerializationError` if
/// its contents do not decode.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EvaluationSnapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    from_bytes(&bytes)
}
