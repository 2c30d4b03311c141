//! Error types for iccschema

use thiserror::Error;

/// Result type for iccschema operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading schemas or decoding tag data
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Alias chain revisited a key before reaching a definition
    #[error("Schema alias cycle at '{key}': {}", chain.join(" -> "))]
    SchemaCycle { key: String, chain: Vec<String> },

    /// A read fell outside the source buffer
    #[error("Buffer range error: {len} bytes at offset {offset}, buffer holds {available}")]
    BufferRange {
        offset: usize,
        len: usize,
        available: usize,
    },

    /// Fields already consumed more bytes than the declared tag size
    #[error("Tag overrun: {consumed} bytes consumed, tag declares {tag_size}")]
    TagOverrun { consumed: usize, tag_size: usize },

    /// Schema definition rejected at load time
    #[error("Invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// A post-decode transform could not be applied; never escapes the
    /// decode entry points
    #[error("Post-processing failed: {0}")]
    PostProcess(String),

    /// Malformed schema table
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_schema(schema: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by truncated or corrupt input bytes
    pub fn is_buffer_range(&self) -> bool {
        matches!(self, Self::BufferRange { .. } | Self::TagOverrun { .. })
    }
}
