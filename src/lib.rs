//! # tramopoly
//!
//! Rules engine for a team territory-claiming card game played over chat.
//! Teams claim stops by completing challenges, lock stops into lines, and
//! fight over ownership with action cards whose plays can be countered back
//! and forth.
//!
//! ## Design Principles
//!
//! 1. **Stateless logic over documents**: every team, stop, card and the game
//!    itself is a JSON document behind the `DocumentStore` port. A `Game`
//!    handle re-reads what it needs on each call and holds nothing stale.
//!
//! 2. **Rejections are values**: an illegal move returns `false`, `None` or
//!    `Play::Rejected`. Only store failures and broken invariants are errors.
//!
//! 3. **Explicit side effects**: lazy expiry (vetoes, ongoing curses, the
//!    game-over stamp) happens in methods that take `&mut self` and say so.
//!
//! ## Modules
//!
//! - `core`: identifiers, RNG, clock, configuration, errors
//! - `store`: persistence port, in-memory stores, typed documents
//! - `catalog`: static reference data shared by every game
//! - `map`: stops, derived line ownership, zone decks, zone coverage
//! - `cards`: the nine card kinds and live card copies
//! - `team`: challenge state machine, curses, specials, secrets
//! - `resolution`: card play and counter negotiation
//! - `game`: engine and game handles, setup and win detection

pub mod core;
pub mod store;
pub mod catalog;
pub mod map;
pub mod cards;
pub mod team;
pub mod resolution;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    ActionCode, ChallengeId, Clock, DeckId, EngineConfig, EngineError, GameId, GameRng, LineColour, ManualClock,
    Result, StopCode, SystemClock, TeamId, ZoneNumber,
};

pub use crate::store::{
    ChallengeState, DocumentKey, DocumentKind, DocumentStore, Documents, ExpectedVersion, MemoryStore, SharedStore,
    StoreError, StoredDocument,
};

pub use crate::catalog::{Catalog, CatalogError, Special};

pub use crate::map::{MapIcon, Reward, StopView};

pub use crate::cards::{ActionKind, ActionType, CardView, Effect, PlayTargets};

pub use crate::team::Claimed;

pub use crate::resolution::{
    ChainLink, CounterResponder, Negotiation, Outcome, Play, Resolution, Response, Step,
};

pub use crate::game::{Engine, Game};
