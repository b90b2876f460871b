//! Ingestion pipeline: tabular file → rows → normalize → embed → collection.
//!
//! Input errors abort the whole file before anything is written. Embedding
//! failures are contained per row: the row is stored with an empty
//! embedding so it stays traceable but never takes part in ranking.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use tabrag_core::embedding::Embedder;
use tabrag_core::store::CollectionStore;
use tabrag_core::{normalize, render_row, InputError, RowRecord, StoreError};
use thiserror::Error;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::reader::load_rows;
use crate::store::FileStore;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Outcome of ingesting one file.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source_file: String,
    pub collection: String,
    pub collection_path: Option<String>,
    pub total_rows: usize,
    pub embedded_rows: usize,
    pub failed_rows: usize,
}

/// Ingest `path` into `store`, embedding each row with `embedder`.
///
/// `max_retries` extra attempts are made for a row whose embedding fails,
/// with exponential backoff (1s, 2s, 4s, … capped at 32s).
pub async fn ingest_file<S>(
    path: &Path,
    embedder: &dyn Embedder,
    store: &S,
    max_retries: u32,
) -> Result<IngestReport, IngestError>
where
    S: CollectionStore + Clone + 'static,
{
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let rows = load_rows(path)?;
    tracing::info!(source_file = %source_file, rows = rows.len(), "ingesting");

    let mut records = Vec::with_capacity(rows.len());
    let mut failed_rows = 0usize;

    for (idx, row_data) in rows.into_iter().enumerate() {
        let row_text = render_row(&row_data);
        let cleaned_text = normalize(&row_text);

        let embedding = match embed_with_retry(embedder, &cleaned_text, max_retries).await {
            Ok(v) => v,
            Err(e) => {
                failed_rows += 1;
                tracing::warn!(row = idx + 1, error = %e, "row stored without embedding");
                Vec::new()
            }
        };

        records.push(RowRecord {
            row_data,
            row_text,
            cleaned_text,
            embedding,
        });
    }

    let total_rows = records.len();
    let store = store.clone();
    let name = source_file.clone();
    let handle =
        tokio::task::spawn_blocking(move || store.write_collection(&name, records)).await??;

    Ok(IngestReport {
        source_file,
        collection: handle.name,
        collection_path: handle.path.map(|p| p.display().to_string()),
        total_rows,
        embedded_rows: total_rows - failed_rows,
        failed_rows,
    })
}

async fn embed_with_retry(
    embedder: &dyn Embedder,
    text: &str,
    max_retries: u32,
) -> Result<Vec<f32>, tabrag_core::EmbeddingError> {
    let mut attempt = 0u32;
    loop {
        match embedder.embed(text).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && is_retryable(&e) => {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << attempt.min(5));
                tracing::debug!(attempt, error = %e, "retrying embedding");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_retryable(err: &tabrag_core::EmbeddingError) -> bool {
    use tabrag_core::EmbeddingError::*;
    match err {
        Disabled => false,
        Status { status, .. } => *status == 429 || *status >= 500,
        Timeout { .. } | Request(_) | MissingVector => true,
    }
}

/// CLI entry point for `tabrag ingest <FILE>`.
pub async fn run_ingest(config: &Config, path: &Path) -> anyhow::Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let store = FileStore::new(&config.store.dir);

    let report = ingest_file(path, embedder.as_ref(), &store, config.embedding.max_retries)
        .await
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    println!("ingest {}", report.source_file);
    println!("  rows: {}", report.total_rows);
    println!("  embedded: {}", report.embedded_rows);
    println!("  failed: {}", report.failed_rows);
    println!(
        "  collection: {}",
        report.collection_path.as_deref().unwrap_or(&report.collection)
    );
    println!("ok");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tabrag_core::EmbeddingError;

    struct Flaky {
        failures_left: AtomicU32,
    }

    #[async_trait::async_trait]
    impl Embedder for Flaky {
        fn model_name(&self) -> &str {
            "flaky"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                Err(EmbeddingError::Status {
                    status: 503,
                    body: String::new(),
                })
            } else {
                Ok(vec![1.0])
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let e = Flaky {
            failures_left: AtomicU32::new(1),
        };
        let v = embed_with_retry(&e, "x", 1).await.unwrap();
        assert_eq!(v, vec![1.0]);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let e = Flaky {
            failures_left: AtomicU32::new(1),
        };
        assert!(embed_with_retry(&e, "x", 0).await.is_err());
    }

    #[test]
    fn test_retryable_classes() {
        assert!(!is_retryable(&EmbeddingError::Disabled));
        assert!(!is_retryable(&EmbeddingError::Status {
            status: 400,
            body: String::new()
        }));
        assert!(is_retryable(&EmbeddingError::Status {
            status: 429,
            body: String::new()
        }));
        assert!(is_retryable(&EmbeddingError::Timeout { secs: 30 }));
    }
}
