//! In-memory document stores.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::core::GameId;

use super::{DocumentKey, DocumentStore, ExpectedVersion, StoreError, StoredDocument};

/// Documents held in a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    documents: FxHashMap<DocumentKey, StoredDocument>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of documents, across all games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether any document belongs to `game`.
    #[must_use]
    pub fn has_game(&self, game: &GameId) -> bool {
        self.documents.keys().any(|key| &key.game == game)
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &DocumentKey) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.documents.get(key).cloned())
    }

    fn set(&mut self, key: &DocumentKey, body: Value, expected: ExpectedVersion) -> Result<u64, StoreError> {
        let found = self.documents.get(key).map(|doc| doc.version);
        if !expected.matches(found) {
            return Err(StoreError::Conflict {
                key: key.clone(),
                expected,
                found,
            });
        }

        let version = found.map_or(1, |v| v + 1);
        self.documents.insert(key.clone(), StoredDocument { version, body });
        Ok(version)
    }
}

/// A `MemoryStore` shared between handles.
///
/// Each `get`/`set` is atomic on its own; a read-modify-write spanning both
/// is protected only by the version check.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
}

impl SharedStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl DocumentStore for SharedStore {
    fn get(&self, key: &DocumentKey) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.lock().get(key)
    }

    fn set(&mut self, key: &DocumentKey, body: Value, expected: ExpectedVersion) -> Result<u64, StoreError> {
        self.inner.lock().set(key, body, expected)
    }
}
