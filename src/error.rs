//! Error taxonomy for metadata extraction and persistence.
//!
//! Per-file faults ([`MetadataError::NotFound`], [`MetadataError::DecodeFailure`])
//! never leave the extractor; they are rendered into the record's `error` field.
//! The remaining variants are returned once from the save step.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// The path does not resolve to a readable file.
    #[error("Image not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read as an image, or reading its
    /// structure or tag table failed.
    #[error("Error processing {}: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },

    /// The batch could not be rendered as JSON.
    #[error("Failed to serialize metadata: {0}")]
    SerializationFailure(#[from] serde_json::Error),

    /// The JSON artifact could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MetadataError {
    pub(crate) fn decode(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::DecodeFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type for this crate.
pub type Result<T> = std::result::Result<T, MetadataError>;
