use thiserror::Error;

/// Result type alias for the annotation engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the annotation engine
///
/// `MissingConfiguration` is fatal and stops a run before any file is read. The
/// block-level variants are caught by the aggregator, which skips the offending
/// comment block and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required configuration: {0}")]
    MissingConfiguration(String),

    #[error("malformed comment block: {reason}")]
    MalformedBlock { reason: String },

    #[error("invalid example payload `{source_text}`: {message}")]
    InvalidExample { source_text: String, message: String },

    /// Raised by a [`DocumentValidator`](crate::validator::DocumentValidator) that rejects
    /// the assembled document
    #[error("document rejected by validator: {0}")]
    InvalidDocument(String),
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedBlock {
            reason: reason.into(),
        }
    }
}
