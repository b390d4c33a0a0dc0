//! Static reference data shared by every game.
//!
//! These types mirror the catalog JSON one to one. Live, per-game state is
//! never stored here.

use chrono::Duration;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::ActionKind;
use crate::core::{ActionCode, ChallengeId, LineColour, StopCode, ZoneNumber};

use super::CatalogError;

/// Special abilities a stop can grant its first claimant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Special {
    /// Curses cannot target the team, and existing curses are cleared.
    Immunity,
    /// Rewards offer a choice of cards instead of one random card.
    RewardChoice,
    /// The section line may be claimed by route section instead of zone.
    ClaimOrange,
    /// Give one secret to each other team.
    Donation,
    /// Discard some of the team's secrets.
    DropSecrets,
    /// Every other team is dealt an extra secret.
    AddSecrets,
}

impl Special {
    /// Executed once and then consumed, rather than held for the game.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::Donation | Self::DropSecrets | Self::AddSecrets)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopDef {
    pub code: StopCode,
    pub name: String,
    /// Inner zone; a border stop also touches the next zone out.
    pub zone: ZoneNumber,
    #[serde(default)]
    pub border: bool,
    #[serde(default)]
    pub lines: Vec<LineColour>,
    #[serde(default)]
    pub parent: Option<StopCode>,
    #[serde(default)]
    pub challenges: Vec<ChallengeId>,
}

impl StopDef {
    #[must_use]
    pub fn on_line(&self, line: &LineColour) -> bool {
        self.lines.contains(line)
    }

    /// Zone label as printed, e.g. `2` or `2/3`.
    #[must_use]
    pub fn zone_label(&self) -> String {
        match self.zone.outer().filter(|_| self.border) {
            Some(outer) => format!("{}/{}", self.zone, outer),
            None => self.zone.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDef {
    pub colour: LineColour,
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub emoji: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDef {
    pub id: ChallengeId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Overrides the standard veto period.
    #[serde(default)]
    pub veto_minutes: Option<i64>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl ChallengeDef {
    #[must_use]
    pub fn veto_period(&self, standard: Duration) -> Duration {
        self.veto_minutes.map_or(standard, Duration::minutes)
    }
}

/// An action card as written in the catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct ActionEntry {
    pub code: ActionCode,
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub timer_minutes: Option<i64>,
}

/// An action card with its behaviour resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionEntry")]
pub struct ActionDef {
    pub code: ActionCode,
    pub kind: ActionKind,
    pub title: String,
    pub tagline: String,
    pub rules: String,
    pub timer_minutes: Option<i64>,
}

impl ActionDef {
    /// How long an ongoing curse lasts once it lands.
    #[must_use]
    pub fn timer(&self) -> Option<Duration> {
        self.timer_minutes.map(Duration::minutes)
    }
}

impl TryFrom<ActionEntry> for ActionDef {
    type Error = CatalogError;

    fn try_from(entry: ActionEntry) -> Result<Self, Self::Error> {
        let kind = ActionKind::from_code(entry.code.as_str())
            .ok_or_else(|| CatalogError::UnknownActionCode(entry.code.to_string()))?;
        if kind == ActionKind::OngoingCurse && entry.timer_minutes.is_none() {
            return Err(CatalogError::MissingTimer(entry.code.to_string()));
        }
        Ok(Self {
            code: entry.code,
            kind,
            title: entry.title,
            tagline: entry.tagline,
            rules: entry.rules,
            timer_minutes: entry.timer_minutes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDef {
    pub code: Special,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Starting deck of one zone. Codes may repeat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDeck {
    pub zone: ZoneNumber,
    pub cards: Vec<ActionCode>,
}

/// A node of the reward placement tree.
///
/// A bare stop code flags that stop with a reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    Stop(StopCode),
    Node(PlacementNode),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementNode {
    /// Bind a special ability to a stop.
    Special { stop: StopCode, code: Special },
    /// Apply a random `count` of the parts.
    Choice { count: usize, parts: Vec<Placement> },
    /// Apply every part.
    All { parts: Vec<Placement> },
}

/// How the section line is claimed with the claim-orange special.
///
/// Coverage is counted per (zone, parent section) instead of per zone, and
/// holding `shortcut_stop` together with a pure stop in `shortcut_zone`
/// under `shortcut_parent` is enough on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    pub line: LineColour,
    pub shortcut_zone: ZoneNumber,
    pub shortcut_parent: StopCode,
    pub shortcut_stop: StopCode,
}

/// The catalog file as a whole.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSource {
    pub stops: Vec<StopDef>,
    pub lines: Vec<LineDef>,
    pub challenges: Vec<ChallengeDef>,
    pub actions: Vec<ActionDef>,
    pub specials: Vec<SpecialDef>,
    pub start_decks: Vec<StartDeck>,
    pub rewards: Vec<Placement>,
    /// Cleaned search term to stop code.
    pub search: FxHashMap<String, StopCode>,
    /// Parent of every zone-1 stop not on a border.
    pub central_stop: Option<StopCode>,
    pub sections: Option<SectionRule>,
}
