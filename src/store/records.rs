//! Persisted document shapes.
//!
//! One record type per `DocumentKind`. Stop records hold only the per-game
//! overrides; static stop data lives in the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Special;
use crate::core::{ActionCode, ChallengeId, DeckId, EngineError, LineColour, Result, StopCode, TeamId, ZoneNumber};

/// Live state of one stop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopRecord {
    pub owner: Option<TeamId>,
    pub locked_line: Option<LineColour>,
    pub has_reward: bool,
    pub special: Option<Special>,
    pub special_used: bool,
}

impl StopRecord {
    #[must_use]
    pub fn claimed(&self) -> bool {
        self.owner.is_some()
    }

    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked_line.is_some()
    }

    /// The bound special ability, if nobody has collected it yet.
    #[must_use]
    pub fn pending_special(&self) -> Option<Special> {
        self.special.filter(|_| !self.special_used)
    }

    /// Locked implies claimed.
    pub fn check(&self, code: &StopCode) -> Result<()> {
        if self.locked() && !self.claimed() {
            return Err(EngineError::invariant(format!("stop {code} is locked without an owner")));
        }
        Ok(())
    }
}

/// Where a team is in the challenge lifecycle.
///
/// The variants are mutually exclusive, so a team is never both in a
/// challenge and in veto.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChallengeState {
    #[default]
    Idle,
    Active {
        challenge: ChallengeId,
    },
    /// Suspended by a clearable curse; the challenge is kept for resuming.
    Paused {
        challenge: ChallengeId,
    },
    Veto {
        challenge: ChallengeId,
        until: DateTime<Utc>,
    },
}

impl ChallengeState {
    #[must_use]
    pub fn challenge(&self) -> Option<&ChallengeId> {
        match self {
            Self::Idle => None,
            Self::Active { challenge } | Self::Paused { challenge } | Self::Veto { challenge, .. } => Some(challenge),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    #[must_use]
    pub fn is_veto(&self) -> bool {
        matches!(self, Self::Veto { .. })
    }
}

/// A secret stop the team must own to win.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEntry {
    pub stop: StopCode,
    #[serde(default)]
    pub mulligan: bool,
    #[serde(default)]
    pub revealed: bool,
}

impl SecretEntry {
    #[must_use]
    pub fn new(stop: StopCode) -> Self {
        Self {
            stop,
            mulligan: false,
            revealed: false,
        }
    }
}

/// A timed curse and the moment it lapses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OngoingCurseEntry {
    pub card: DeckId,
    pub ends_at: DateTime<Utc>,
}

/// Live state of one team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub colour: String,
    #[serde(default)]
    pub secrets: Vec<SecretEntry>,
    #[serde(default)]
    pub challenge: ChallengeState,
    #[serde(default)]
    pub clear_curses: Vec<DeckId>,
    #[serde(default)]
    pub ongoing_curses: Vec<OngoingCurseEntry>,
    #[serde(default)]
    pub specials: Vec<Special>,
}

impl TeamRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, colour: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colour: colour.into(),
            secrets: Vec::new(),
            challenge: ChallengeState::Idle,
            clear_curses: Vec::new(),
            ongoing_curses: Vec::new(),
            specials: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_special(&self, special: Special) -> bool {
        self.specials.contains(&special)
    }

    /// No clearable curse is holding the team back.
    #[must_use]
    pub fn may_progress(&self) -> bool {
        self.clear_curses.is_empty()
    }

    /// Drop all progress, keeping the team's name and colour.
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.name), std::mem::take(&mut self.colour));
    }
}

/// Live state of one card in the game's deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub code: ActionCode,
    pub zone: ZoneNumber,
    #[serde(default)]
    pub dealt: bool,
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub owner: Option<TeamId>,
}

impl ActionRecord {
    #[must_use]
    pub fn new(code: ActionCode, zone: ZoneNumber) -> Self {
        Self {
            code,
            zone,
            dealt: false,
            used: false,
            reserved: false,
            owner: None,
        }
    }

    /// Still in its zone's deck.
    #[must_use]
    pub fn in_deck(&self) -> bool {
        !self.dealt && !self.reserved
    }

    /// Dealt to `team` and not yet played.
    #[must_use]
    pub fn in_hand_of(&self, team: TeamId) -> bool {
        self.dealt && !self.used && self.owner == Some(team)
    }
}

/// The record that marks a played card as contested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCounter {
    pub victim: TeamId,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub countered_by: Option<DeckId>,
    /// The counter accepted against this card while it waits to settle.
    #[serde(default)]
    pub answered_by: Option<DeckId>,
}

impl PendingCounter {
    /// Still waiting on an answer.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.expired && self.answered_by.is_none()
    }
}

/// Game-wide metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRecord {
    pub in_progress: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub teams: Vec<TeamId>,
    pub deck: Vec<DeckId>,
}
