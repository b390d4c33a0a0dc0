//! The closed set of action card variants.
//!
//! A card's static code is resolved to an `ActionKind` once, when the catalog
//! loads. Everything downstream matches on the kind, never on the code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad card family, as printed on the card.
///
/// Ordered the way hands are sorted for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Spy,
    Steal,
    Counter,
    Curse,
    Trap,
}

/// One of the nine card behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Reveals the victim's hand.
    Announcement,
    /// Reveals one of the victim's secrets.
    TicketInspection,
    /// A curse that stays until the victim clears it.
    ClearCurse,
    /// A curse that lapses after a timer.
    OngoingCurse,
    /// Swap one of your unlocked stops for a rival's.
    Interchange,
    /// Take a rival's unlocked stop.
    Railroaded,
    /// Knock any rival stop back to unclaimed.
    Derailment,
    /// Counter a non-curse card from the same or a lower zone.
    Cancelled,
    /// Send a curse back onto whoever played it.
    Rerouted,
}

impl ActionKind {
    /// Resolve a static card code.
    ///
    /// Curse codes are families (`CURSE-CLEAR-*`, `CURSE-ONGOING-*`).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code {
            "ANNOUNCEMENT" => Self::Announcement,
            "TICKETINSPECTION" => Self::TicketInspection,
            "INTERCHANGE" => Self::Interchange,
            "RAILROADED" => Self::Railroaded,
            "DERAILMENT" => Self::Derailment,
            "CANCELLED" => Self::Cancelled,
            "REROUTED" => Self::Rerouted,
            _ if code.starts_with("CURSE-CLEAR") => Self::ClearCurse,
            _ if code.starts_with("CURSE-ONGOING") => Self::OngoingCurse,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub const fn action_type(self) -> ActionType {
        match self {
            Self::Announcement | Self::TicketInspection => ActionType::Spy,
            Self::Interchange | Self::Railroaded => ActionType::Steal,
            Self::ClearCurse | Self::OngoingCurse => ActionType::Curse,
            Self::Cancelled | Self::Rerouted => ActionType::Counter,
            Self::Derailment => ActionType::Trap,
        }
    }

    #[must_use]
    pub const fn is_curse(self) -> bool {
        matches!(self.action_type(), ActionType::Curse)
    }

    /// Counter cards are only ever played in response to another card.
    #[must_use]
    pub const fn is_counter(self) -> bool {
        matches!(self.action_type(), ActionType::Counter)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
