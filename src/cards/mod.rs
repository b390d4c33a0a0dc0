//! Action cards: the closed set of kinds, their rules, and live copies.
//!
//! ## Key Types
//!
//! - `ActionKind`: which of the nine behaviours a card has, resolved from its
//!   code when the catalog loads
//! - `ActionBehaviour`: per-kind playability and effect
//! - `Table`: the game facts the rules read
//! - `CardView`: one live card in a game, with its metadata
//!
//! Playing a card and negotiating counters lives in `resolution`.

pub mod behaviour;
pub mod instance;
pub mod kind;

pub use behaviour::{ActionBehaviour, CardFacts, Effect, PlayTargets, StopFacts, Table};
pub use instance::CardView;
pub use kind::{ActionKind, ActionType};
