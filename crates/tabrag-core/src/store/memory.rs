//! In-memory [`CollectionStore`] for tests and embedded use.
//!
//! Collections live in a `Vec` behind `std::sync::RwLock`. Iteration works
//! on a snapshot taken when it starts, so concurrent writes are not observed
//! mid-iteration.

use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Collection, RowRecord};

use super::{CollectionHandle, CollectionIter, CollectionStore};

/// In-memory collection store.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<Vec<Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built collection as-is, bypassing `total_rows` derivation.
    pub fn insert(&self, collection: Collection) {
        self.collections
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(collection);
    }

    pub fn len(&self) -> usize {
        self.collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CollectionStore for InMemoryStore {
    fn write_collection(
        &self,
        source_file: &str,
        rows: Vec<RowRecord>,
    ) -> Result<CollectionHandle, StoreError> {
        let collection = Collection::new(source_file, rows);
        let mut guard = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let handle = CollectionHandle {
            name: format!("memory-{}", guard.len()),
            path: None,
            source_file: collection.source_file.clone(),
            total_rows: collection.total_rows,
        };
        guard.push(collection);
        Ok(handle)
    }

    fn iterate_collections(&self) -> Result<CollectionIter<'_>, StoreError> {
        let snapshot = self
            .collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        Ok(Box::new(snapshot.into_iter()))
    }
}
