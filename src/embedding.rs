//! Embedding clients.
//!
//! Implements the core [`Embedder`] trait:
//! - **[`DisabledEmbedder`]**: always fails; used when `embedding.provider = "disabled"`.
//! - **[`OllamaEmbedder`]**: calls an Ollama instance's `POST /api/embeddings`.
//!
//! Clients make exactly one attempt per call and are bounded by
//! `embedding.timeout_secs`. Retrying is left to the caller (see
//! [`ingest`](crate::ingest)).
//!
//! ```rust,no_run
//! # use tabrag::config::EmbeddingConfig;
//! # use tabrag::embedding::create_embedder;
//! let config = EmbeddingConfig::default(); // provider = "disabled"
//! let embedder = create_embedder(&config).unwrap();
//! assert_eq!(embedder.model_name(), "disabled");
//! ```

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabrag_core::embedding::Embedder;
use tabrag_core::EmbeddingError;

use crate::config::EmbeddingConfig;

// ============ Disabled ============

/// An embedder that refuses every request.
pub struct DisabledEmbedder;

#[async_trait]
impl Embedder for DisabledEmbedder {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Disabled)
    }
}

// ============ Ollama ============

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// Embedder backed by Ollama's legacy single-prompt endpoint.
///
/// Requires Ollama to be running with the model pulled
/// (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for Ollama provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/api/embeddings", config.base_url().trim_end_matches('/')),
            model,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: OllamaEmbeddingResponse =
            response.json().await.map_err(|e| self.classify(e))?;

        match parsed.embedding {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(EmbeddingError::MissingVector),
        }
    }
}

impl OllamaEmbedder {
    fn classify(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout {
                secs: self.timeout_secs,
            }
        } else if err.is_connect() {
            EmbeddingError::Request(format!(
                "connection error (is Ollama running at {}?): {}",
                self.url, err
            ))
        } else {
            EmbeddingError::Request(err.to_string())
        }
    }
}

/// Create the [`Embedder`] named by `embedding.provider`.
///
/// | Config Value | Embedder |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledEmbedder`] |
/// | `"ollama"` | [`OllamaEmbedder`] |
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledEmbedder)),
        "ollama" => Ok(Box::new(OllamaEmbedder::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}
