//! File-backed [`CollectionStore`]: one JSON file per ingested source.
//!
//! # Layout
//!
//! ```text
//! <store.dir>/
//!   cities_20260102T030405_1a2b3c4d_embeddings.json
//!   cities_20260107T101112_9f8e7d6c_embeddings.json   ← re-ingest, kept alongside
//!   sales_20260103T000000_0011aabb_embeddings.json
//! ```
//!
//! Each file holds a complete [`Collection`]. Writes go to a temporary file
//! in the same directory and are renamed into place, so a half-written
//! collection never matches the `*_embeddings.json` pattern that
//! [`FileStore::iterate_collections`] reads.

use std::io::Write;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Serialize;
use tabrag_core::store::{CollectionHandle, CollectionIter, CollectionStore};
use tabrag_core::{Collection, RowRecord, StoreError};
use walkdir::WalkDir;

pub const COLLECTION_SUFFIX: &str = "_embeddings.json";

/// Collections stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

/// Per-collection summary for listings.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub file: String,
    pub source_file: String,
    pub total_rows: usize,
    pub scorable_rows: usize,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Collection file paths currently in the store, sorted by file name.
    pub fn collection_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let matcher = collection_matcher()?;
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io {
                path: self.dir.clone(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() && matcher.is_match(entry.file_name()) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Summaries of every readable collection.
    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>, StoreError> {
        let mut out = Vec::new();
        for path in self.collection_paths()? {
            match read_collection(&path) {
                Ok(c) => out.push(CollectionSummary {
                    file: file_name(&path),
                    source_file: c.source_file.clone(),
                    total_rows: c.total_rows,
                    scorable_rows: c.scorable_rows(),
                }),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable collection"),
            }
        }
        Ok(out)
    }

    fn new_collection_name(&self, source_file: &str) -> String {
        let stem = Path::new(source_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("collection");
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}_{}_{}{}",
            sanitize_stem(stem),
            stamp,
            &id[..8],
            COLLECTION_SUFFIX
        )
    }
}

impl CollectionStore for FileStore {
    fn write_collection(
        &self,
        source_file: &str,
        rows: Vec<RowRecord>,
    ) -> Result<CollectionHandle, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let collection = Collection::new(source_file, rows);
        let body = serde_json::to_vec_pretty(&collection)?;

        let name = self.new_collection_name(source_file);
        let final_path = self.dir.join(&name);

        let mut tmp = tempfile::Builder::new()
            .prefix(".tabrag-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(io_err(&self.dir))?;
        tmp.write_all(&body).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;
        tmp.persist(&final_path)
            .map_err(|e| StoreError::Io {
                path: final_path.clone(),
                source: e.error,
            })?;

        tracing::info!(
            collection = %name,
            source_file = %collection.source_file,
            rows = collection.total_rows,
            "collection written"
        );

        Ok(CollectionHandle {
            name,
            path: Some(final_path),
            source_file: collection.source_file,
            total_rows: collection.total_rows,
        })
    }

    fn iterate_collections(&self) -> Result<CollectionIter<'_>, StoreError> {
        let paths = self.collection_paths()?;
        Ok(Box::new(paths.into_iter().filter_map(|path| {
            match read_collection(&path) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable collection");
                    None
                }
            }
        })))
    }
}

/// Read and validate one collection file.
pub fn read_collection(path: &Path) -> Result<Collection, StoreError> {
    let content = std::fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let collection: Collection =
        serde_json::from_slice(&content).map_err(|e| StoreError::Malformed {
            name: file_name(path),
            reason: e.to_string(),
        })?;
    if collection.total_rows != collection.rows.len() {
        return Err(StoreError::Malformed {
            name: file_name(path),
            reason: format!(
                "total_rows is {} but {} rows are present",
                collection.total_rows,
                collection.rows.len()
            ),
        });
    }
    Ok(collection)
}

fn collection_matcher() -> Result<GlobMatcher, StoreError> {
    let pattern = format!("*{}", COLLECTION_SUFFIX);
    Glob::new(&pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| StoreError::Malformed {
            name: pattern.clone(),
            reason: e.to_string(),
        })
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Keep `[A-Za-z0-9_.-]`, map everything else to `_`.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "collection".to_string()
    } else {
        cleaned
    }
}
