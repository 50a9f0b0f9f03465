//! Error types for the LSA pipeline.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, LsaError>;

/// Errors raised by the pipeline stages and their collaborators.
///
/// The first four variants are the recoverable analysis conditions. A caller
/// ranking many documents can skip an `UndefinedSimilarity` entry and still
/// report the others.
#[derive(Error, Debug)]
pub enum LsaError {
    /// Requested rank is outside `1..=max`.
    #[error("invalid rank {rank}: must be between 1 and {max}")]
    InvalidRank { rank: usize, max: usize },

    /// No documents, or no term survived normalization.
    #[error("empty corpus: no documents or no terms after filtering")]
    EmptyCorpus,

    /// None of the query terms is in the corpus vocabulary.
    #[error("undefined projection: no query term is present in the vocabulary")]
    UndefinedProjection,

    /// The document or query vector has zero norm.
    #[error("undefined similarity for document {document}: zero-norm vector")]
    UndefinedSimilarity { document: usize },

    /// External NLP annotator failed or returned unreadable output.
    #[error("annotator error: {0}")]
    Annotator(String),

    /// I/O error reading input or writing a report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Report encoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LsaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_cbor::Error> for LsaError {
    fn from(err: serde_cbor::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LsaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl LsaError {
    /// Create a new annotator error.
    pub fn annotator(message: impl Into<String>) -> Self {
        Self::Annotator(message.into())
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for the four analysis conditions a caller is expected to handle
    /// and continue past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidRank { .. }
                | Self::EmptyCorpus
                | Self::UndefinedProjection
                | Self::UndefinedSimilarity { .. }
        )
    }
}
