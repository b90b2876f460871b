//! Storage abstraction for embedding collections.
//!
//! A collection is written once, in full, and never modified afterwards.
//! Writing the same source file twice produces two independent collections.
//!
//! The trait is synchronous: ranking pulls collections lazily through
//! [`iterate_collections`](CollectionStore::iterate_collections) and is pure
//! computation, so async callers run it on a blocking thread.

pub mod memory;

use std::path::PathBuf;

use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Collection, RowRecord};

/// Identifies a collection that has been durably written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionHandle {
    /// Store-specific unique name (file name for the file store).
    pub name: String,
    /// Filesystem location, when the store is file-backed.
    pub path: Option<PathBuf>,
    pub source_file: String,
    pub total_rows: usize,
}

/// Lazily produced collections; each item is read only when pulled.
pub type CollectionIter<'a> = Box<dyn Iterator<Item = Collection> + Send + 'a>;

/// Abstract collection store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`write_collection`](CollectionStore::write_collection) | Persist a full collection atomically |
/// | [`iterate_collections`](CollectionStore::iterate_collections) | Enumerate all readable collections |
pub trait CollectionStore: Send + Sync {
    /// Persist all rows for one source file.
    ///
    /// Either the whole collection becomes visible to
    /// [`iterate_collections`](CollectionStore::iterate_collections), or an
    /// error is returned and nothing is visible.
    fn write_collection(
        &self,
        source_file: &str,
        rows: Vec<RowRecord>,
    ) -> Result<CollectionHandle, StoreError>;

    /// Enumerate every stored collection. Order is unspecified.
    ///
    /// Collections that cannot be read are skipped (with a warning) rather
    /// than ending the iteration.
    fn iterate_collections(&self) -> Result<CollectionIter<'_>, StoreError>;
}
