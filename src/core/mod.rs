//! Core types: identifiers, randomness, time, configuration, errors.

pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use ids::{ActionCode, ChallengeId, DeckId, GameId, LineColour, StopCode, TeamId, ZoneNumber};
pub use rng::GameRng;
