//! Embedding client trait.
//!
//! Concrete clients (Ollama, disabled) live in the `tabrag` app crate.
//! Implementations perform a single attempt per call: retry policy belongs
//! to the caller, which decides per code path whether to retry or give up.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Turns text into a fixed-length vector via an external model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"nomic-embed-text"`).
    fn model_name(&self) -> &str;

    /// Embed one text.
    ///
    /// Returns an error (never an empty or zero vector) when the remote call
    /// fails, times out, or yields no vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
