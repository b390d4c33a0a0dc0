//! Engine and per-game handles.
//!
//! An `Engine` bundles what every game shares: the catalog, the rule
//! constants and the clock. A `Game` binds the engine to one game's documents
//! in a store. Game handles hold no game state of their own; each operation
//! reads what it needs from the store and writes its changes straight back,
//! so a handle can be dropped and reopened between any two operations.
//!
//! The rules are implemented as `impl Game` blocks spread over the modules
//! they belong to (`map`, `cards`, `team`, `resolution`, `game::lifecycle`).
//!
//! ```
//! use std::sync::Arc;
//! use tramopoly::{Catalog, Engine, MemoryStore, ManualClock};
//!
//! let catalog = Catalog::from_json(r#"{"stops": [], "lines": []}"#).unwrap();
//! let engine = Engine::new(catalog).with_clock(Arc::new(ManualClock::default()));
//!
//! let game = engine.create_game(MemoryStore::new(), 42).unwrap();
//! assert_eq!(game.id().as_str().len(), 4);
//! ```

pub mod lifecycle;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::core::{Clock, EngineConfig, EngineError, GameId, GameRng, Result, SystemClock};
use crate::store::{DocumentStore, Documents, GameRecord};

/// Attempts at drawing an unused game code before giving up.
const MAX_CODE_ATTEMPTS: usize = 16;

/// Shared rules context for many games.
#[derive(Clone, Debug)]
pub struct Engine {
    catalog: Arc<Catalog>,
    config: Arc<EngineConfig>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// An engine with default rules and the system clock.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(EngineConfig::default()),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a new game under a fresh code and build its zone decks.
    #[tracing::instrument(skip(self, store))]
    pub fn create_game<S: DocumentStore>(&self, store: S, seed: u64) -> Result<Game<S>> {
        let mut rng = GameRng::new(seed);
        let mut store = store;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let id = GameId::new(rng.game_code(self.config.game_code_length));
            let mut docs = Documents::new(id.clone(), store);
            if docs.meta_exists()? {
                debug!(game = %id, "game code taken, drawing another");
                store = docs.into_store();
                continue;
            }
            docs.create_meta(&GameRecord::default())?;

            let mut game = Game {
                id,
                docs,
                engine: self.clone(),
                rng,
            };
            game.create_decks()?;
            info!(game = %game.id, "game created");
            return Ok(game);
        }
        Err(EngineError::invariant("no free game code"))
    }

    /// Open an existing game, or `None` if the store has never seen it.
    pub fn open_game<S: DocumentStore>(&self, store: S, id: GameId, seed: u64) -> Result<Option<Game<S>>> {
        let docs = Documents::new(id.clone(), store);
        if !docs.meta_exists()? {
            return Ok(None);
        }
        Ok(Some(Game {
            id,
            docs,
            engine: self.clone(),
            rng: GameRng::new(seed),
        }))
    }
}

/// One game over a document store.
#[derive(Debug)]
pub struct Game<S> {
    pub(crate) id: GameId,
    pub(crate) docs: Documents<S>,
    pub(crate) engine: Engine,
    pub(crate) rng: GameRng,
}

impl<S: DocumentStore> Game<S> {
    #[must_use]
    pub fn id(&self) -> &GameId {
        &self.id
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.engine.catalog
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.engine.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.engine.now()
    }

    /// Typed access to this game's documents.
    #[must_use]
    pub fn documents(&self) -> &Documents<S> {
        &self.docs
    }

    pub fn documents_mut(&mut self) -> &mut Documents<S> {
        &mut self.docs
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.docs.into_store()
    }

    /// A catalog handle that outlives borrows of `self`.
    pub(crate) fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.engine.catalog)
    }
}
