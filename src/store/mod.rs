//! Persistence port.
//!
//! The engine keeps no long-lived mutable state. Every team, stop, card,
//! pending counter and the game's own metadata lives in a JSON document keyed
//! by `(game, kind, id)` and is re-read on every access.
//!
//! ## Version stamps
//!
//! Each stored document carries a version that increases on every write.
//! Writers state what they expect to overwrite (`ExpectedVersion`), so two
//! units of work racing on one document surface a `StoreError::Conflict`
//! rather than silently losing an update. The engine never retries; that
//! policy belongs to the caller.
//!
//! ## Implementations
//!
//! - `MemoryStore`: a plain map, owned by one game handle
//! - `SharedStore`: a `MemoryStore` behind a mutex, cloneable across handles

pub mod documents;
pub mod memory;
pub mod records;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::GameId;

pub use documents::Documents;
pub use memory::{MemoryStore, SharedStore};
pub use records::{
    ActionRecord, ChallengeState, GameRecord, OngoingCurseEntry, PendingCounter, SecretEntry,
    StopRecord, TeamRecord,
};

/// The kinds of per-game document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Team,
    Stop,
    Action,
    PendingCounter,
    GameMeta,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Team => "team",
            Self::Stop => "stop",
            Self::Action => "action",
            Self::PendingCounter => "pending-counter",
            Self::GameMeta => "game",
        };
        f.write_str(name)
    }
}

/// Address of one document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    pub game: GameId,
    pub kind: DocumentKind,
    pub id: String,
}

impl DocumentKey {
    #[must_use]
    pub fn new(game: GameId, kind: DocumentKind, id: impl Into<String>) -> Self {
        Self {
            game,
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.game, self.kind, self.id)
    }
}

/// A document body with the version it was stored at.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub version: u64,
    pub body: Value,
}

/// What a writer expects to find before its write lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Overwrite whatever is there.
    Any,
    /// The document must not exist yet.
    Absent,
    /// The document must still be at this version.
    Exactly(u64),
}

impl ExpectedVersion {
    /// Whether a document currently at `current` satisfies this expectation.
    #[must_use]
    pub fn matches(self, current: Option<u64>) -> bool {
        match self {
            Self::Any => true,
            Self::Absent => current.is_none(),
            Self::Exactly(version) => current == Some(version),
        }
    }

    /// The expectation a read-modify-write should carry after reading `read`.
    #[must_use]
    pub fn after_read(read: Option<u64>) -> Self {
        read.map_or(Self::Absent, Self::Exactly)
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Absent => f.write_str("absent"),
            Self::Exactly(version) => write!(f, "v{version}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("write conflict on {key}: expected {expected}, found {found:?}")]
    Conflict {
        key: DocumentKey,
        expected: ExpectedVersion,
        found: Option<u64>,
    },
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Entity-keyed document store.
pub trait DocumentStore {
    /// Read a document, or `None` if it was never written.
    fn get(&self, key: &DocumentKey) -> Result<Option<StoredDocument>, StoreError>;

    /// Write a document, returning its new version.
    fn set(&mut self, key: &DocumentKey, body: Value, expected: ExpectedVersion) -> Result<u64, StoreError>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &mut T {
    fn get(&self, key: &DocumentKey) -> Result<Option<StoredDocument>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &DocumentKey, body: Value, expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).set(key, body, expected)
    }
}
