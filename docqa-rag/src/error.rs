//! Error types for the `docqa-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while ingesting, indexing, or answering.
///
/// Every external-call failure is surfaced as a typed variant rather than
/// retried internally; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum QaError {
    /// The document path does not exist or is not a readable file.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The document bytes are not valid text under the assumed encoding.
    #[error("failed to decode {path} as UTF-8: {message}")]
    DecodeError {
        /// The path of the undecodable source.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// Chunking parameters are inconsistent: overlap must be smaller than
    /// the chunk size and both must be positive.
    #[error("invalid chunk parameters: chunk_size={chunk_size}, chunk_overlap={chunk_overlap}")]
    InvalidChunkParams {
        /// The requested chunk size in characters.
        chunk_size: usize,
        /// The requested overlap in characters.
        chunk_overlap: usize,
    },

    /// An error occurred during embedding generation.
    #[error("embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during answer generation.
    #[error("generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// No persisted index exists at the given path.
    #[error("no index found at {path}")]
    IndexNotFound {
        /// The directory that was expected to hold the index files.
        path: PathBuf,
    },

    /// The persisted index exists but cannot be reconstructed.
    #[error("corrupt index at {path}: {message}")]
    CorruptIndex {
        /// The directory holding the unparseable index.
        path: PathBuf,
        /// A description of what failed to parse or validate.
        message: String,
    },

    /// The index holds zero vectors, so retrieval cannot rank anything.
    #[error("index is empty")]
    EmptyIndex,

    /// A vector's dimensionality does not match the index's.
    #[error("dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality recorded by the index.
        expected: usize,
        /// The dimensionality actually supplied.
        actual: usize,
    },

    /// The query engine was asked to answer before an index was attached.
    #[error("no index attached to the query engine")]
    IndexNotReady,

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// An I/O failure while persisting or restoring an index.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for document-QA operations.
pub type Result<T> = std::result::Result<T, QaError>;
