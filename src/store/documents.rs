//! Typed access to one game's documents.
//!
//! `Documents` turns raw JSON bodies into record types and back, and makes
//! every update a read-modify-write that carries the version it read.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::{DeckId, EngineError, GameId, Result, StopCode, TeamId};

use super::{
    ActionRecord, DocumentKey, DocumentKind, DocumentStore, ExpectedVersion, GameRecord, PendingCounter, StopRecord,
    TeamRecord,
};

/// Identifier of the single game-meta document.
const META_ID: &str = "meta";

/// A game's documents over some store.
#[derive(Debug)]
pub struct Documents<S> {
    game: GameId,
    store: S,
}

impl<S: DocumentStore> Documents<S> {
    #[must_use]
    pub fn new(game: GameId, store: S) -> Self {
        Self { game, store }
    }

    #[must_use]
    pub fn game(&self) -> &GameId {
        &self.game
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn key(&self, kind: DocumentKind, id: &str) -> DocumentKey {
        DocumentKey::new(self.game.clone(), kind, id)
    }

    /// Read a document and its version. A `null` body reads as absent.
    pub fn fetch<T: DeserializeOwned>(&self, kind: DocumentKind, id: &str) -> Result<(Option<u64>, Option<T>)> {
        let Some(doc) = self.store.get(&self.key(kind, id))? else {
            return Ok((None, None));
        };
        if doc.body.is_null() {
            return Ok((Some(doc.version), None));
        }
        let value = serde_json::from_value(doc.body).map_err(|source| EngineError::Malformed {
            kind,
            id: id.to_owned(),
            source,
        })?;
        Ok((Some(doc.version), Some(value)))
    }

    pub fn load<T: DeserializeOwned>(&self, kind: DocumentKind, id: &str) -> Result<Option<T>> {
        Ok(self.fetch(kind, id)?.1)
    }

    pub fn save<T: Serialize>(&mut self, kind: DocumentKind, id: &str, value: &T, expected: ExpectedVersion) -> Result<u64> {
        let body = serde_json::to_value(value).map_err(|source| EngineError::Malformed {
            kind,
            id: id.to_owned(),
            source,
        })?;
        let key = self.key(kind, id);
        Ok(self.store.set(&key, body, expected)?)
    }

    /// Empty a document by writing `null` over it.
    pub fn clear(&mut self, kind: DocumentKind, id: &str) -> Result<()> {
        let key = self.key(kind, id);
        self.store.set(&key, Value::Null, ExpectedVersion::Any)?;
        Ok(())
    }

    /// Read-modify-write, starting from `T::default()` when absent.
    pub fn modify<T, R>(&mut self, kind: DocumentKind, id: &str, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let (version, value) = self.fetch::<T>(kind, id)?;
        let mut value = value.unwrap_or_default();
        let out = f(&mut value);
        self.save(kind, id, &value, ExpectedVersion::after_read(version))?;
        Ok(out)
    }

    /// Read-modify-write of a document that must already exist.
    pub fn modify_existing<T, R>(&mut self, kind: DocumentKind, id: &str, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: DeserializeOwned + Serialize,
    {
        let (version, value) = self.fetch::<T>(kind, id)?;
        let Some(mut value) = value else {
            return Err(EngineError::invariant(format!("{kind} {id} does not exist")));
        };
        let out = f(&mut value);
        self.save(kind, id, &value, ExpectedVersion::after_read(version))?;
        Ok(out)
    }

    // Typed shortcuts.

    pub fn stop(&self, code: &StopCode) -> Result<StopRecord> {
        let record: StopRecord = self.load(DocumentKind::Stop, code.as_str())?.unwrap_or_default();
        record.check(code)?;
        Ok(record)
    }

    pub fn modify_stop<R>(&mut self, code: &StopCode, f: impl FnOnce(&mut StopRecord) -> R) -> Result<R> {
        let out = self.modify(DocumentKind::Stop, code.as_str(), f)?;
        Ok(out)
    }

    pub fn team(&self, team: TeamId) -> Result<Option<TeamRecord>> {
        self.load(DocumentKind::Team, &team.raw().to_string())
    }

    pub fn modify_team<R>(&mut self, team: TeamId, f: impl FnOnce(&mut TeamRecord) -> R) -> Result<R> {
        self.modify_existing(DocumentKind::Team, &team.raw().to_string(), f)
    }

    pub fn action(&self, card: &DeckId) -> Result<Option<ActionRecord>> {
        self.load(DocumentKind::Action, card.as_str())
    }

    pub fn modify_action<R>(&mut self, card: &DeckId, f: impl FnOnce(&mut ActionRecord) -> R) -> Result<R> {
        self.modify_existing(DocumentKind::Action, card.as_str(), f)
    }

    pub fn pending(&self, card: &DeckId) -> Result<Option<PendingCounter>> {
        self.load(DocumentKind::PendingCounter, card.as_str())
    }

    pub fn modify_pending<R>(&mut self, card: &DeckId, f: impl FnOnce(&mut PendingCounter) -> R) -> Result<R> {
        self.modify_existing(DocumentKind::PendingCounter, card.as_str(), f)
    }

    pub fn meta(&self) -> Result<GameRecord> {
        Ok(self.load(DocumentKind::GameMeta, META_ID)?.unwrap_or_default())
    }

    /// Whether the game-meta document exists at all.
    pub fn meta_exists(&self) -> Result<bool> {
        Ok(self.fetch::<GameRecord>(DocumentKind::GameMeta, META_ID)?.0.is_some())
    }

    pub fn modify_meta<R>(&mut self, f: impl FnOnce(&mut GameRecord) -> R) -> Result<R> {
        self.modify(DocumentKind::GameMeta, META_ID, f)
    }

    /// Write the game-meta document, failing if it already exists.
    pub fn create_meta(&mut self, meta: &GameRecord) -> Result<()> {
        self.save(DocumentKind::GameMeta, META_ID, meta, ExpectedVersion::Absent)?;
        Ok(())
    }
}
