//! Error types for claridad
//!
//! The error surface is deliberately narrow: every per-row and
//! per-partition numeric edge case (missing metric, zero variance,
//! zero-target division, below-threshold sample) is a missing-value
//! outcome, not an error. Only configuration-level schema problems and
//! ingestion failures propagate to the caller.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Claridad error types
#[derive(Error, Debug)]
pub enum Error {
    /// A configured grouping key, metric pair, or derived-metric input
    /// references a field that cannot be resolved against the loaded
    /// schema at all. Distinct from "present but entirely missing",
    /// which is a valid all-missing result.
    #[error("Schema mismatch: field '{field}' not found in dataset schema")]
    SchemaMismatch {
        /// The unresolvable field name
        field: String,
    },

    /// CSV parsing error during ingestion
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid caller input (mismatched column lengths, duplicate
    /// column names, and similar construction errors)
    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// Shorthand for a schema-resolution failure on `field`.
    #[must_use]
    pub fn schema_mismatch(field: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            field: field.into(),
        }
    }
}
