//! The map: stops, lines, zones, and the coverage rule for claiming lines.

pub mod coverage;
pub mod line;
pub mod stop;
pub mod zone;

use serde::{Deserialize, Serialize};

use crate::catalog::Special;
use crate::core::DeckId;

pub use coverage::{covered_zone_count, enough_zones_covered, CoverageMode, ZoneSpan, ZONES_TO_CLAIM};
pub use stop::{MapIcon, StopView};

/// What a team collects when it claims a stop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    /// One card, dealt straight into the hand.
    Action(DeckId),
    /// Cards reserved for the team to choose one from.
    Choice(Vec<DeckId>),
    /// A special ability.
    Special(Special),
}
