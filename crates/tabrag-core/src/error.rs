//! Error taxonomy shared by the core and the application crate.
//!
//! Each variant family maps to one failure class of the retrieval engine:
//!
//! | Type | Raised by | Containment |
//! |------|-----------|-------------|
//! | [`InputError`] | tabular file reader | aborts ingestion of that file |
//! | [`EmbeddingError`] | [`Embedder`](crate::embedding::Embedder) | row kept unscored, or query answered with a fixed message |
//! | [`StoreError`] | [`CollectionStore`](crate::store::CollectionStore) | write fails; unreadable collections are skipped on read |
//! | [`SimilarityError`] | [`cosine_similarity`](crate::search::cosine_similarity) | offending row excluded from ranking |
//!
//! Answer generation failures are not errors: the generator returns a
//! descriptive string instead.

use std::path::PathBuf;

use thiserror::Error;

/// Unsupported or malformed tabular input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unsupported file type '{extension}': only .csv and .json are supported")]
    UnsupportedFileType { extension: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed row data at row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("malformed file: {0}")]
    Parse(String),
}

/// The embedding service did not produce a vector.
///
/// Always distinguishable from a zero vector: callers must never substitute
/// a default embedding when they receive one of these.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider is disabled")]
    Disabled,

    #[error("embedding request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("embedding service returned no vector")]
    MissingVector,
}

/// Failure to persist or decode a collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed collection {name}: {reason}")]
    Malformed { name: String, reason: String },
}

/// Cosine similarity is undefined for the given pair of vectors.
#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("dimension mismatch: query has {query} dims, stored vector has {stored}")]
    DimensionMismatch { query: usize, stored: usize },

    #[error("zero-norm vector")]
    ZeroNorm,

    #[error("empty vector")]
    Empty,

    #[error("similarity is not a finite number")]
    NonFinite,
}
