//! # tabrag core
//!
//! Pure retrieval logic for tabrag: row models, text normalization,
//! the collection store abstraction, cosine-similarity ranking, and
//! context assembly.
//!
//! This crate performs no network or filesystem I/O and pulls in no async
//! runtime. The embedding and answer clients are expressed as traits
//! ([`embedding::Embedder`], [`generation::AnswerGenerator`]) that the
//! application crate implements against a real model service.

pub mod context;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod models;
pub mod normalize;
pub mod search;
pub mod store;

pub use context::assemble;
pub use error::{EmbeddingError, InputError, SimilarityError, StoreError};
pub use models::{render_row, Collection, Match, RowData, RowRecord};
pub use normalize::normalize;
pub use search::top_k;
pub use store::CollectionStore;
