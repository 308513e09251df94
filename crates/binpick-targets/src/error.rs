//! Error types for target resolution and table loading.

use std::path::PathBuf;

use crate::fact::Field;

/// Errors that can occur while resolving targets or loading tables.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// A term or hint contradicts an already established field.
    #[error("{subject}: conflicting {field}: '{proposed}' (from '{term}') != '{existing}' in {terms:?}")]
    Conflict {
        /// The project/build or user agent being resolved.
        subject: String,
        field: Field,
        existing: String,
        proposed: String,
        /// The term that asserted `proposed`.
        term: String,
        /// Every term of the input, for diagnosis.
        terms: Vec<String>,
    },

    /// Resolution finished without a mandatory field.
    #[error("{subject}: could not determine {field} from {terms:?}")]
    MissingField {
        subject: String,
        field: Field,
        terms: Vec<String>,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error reading table files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Table file not found.
    #[error("table file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// A table overlay failed validation.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
