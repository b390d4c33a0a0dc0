//! Engine configuration.
//!
//! The rule constants a game runs with. Everything has a default matching the
//! standard rules, and can be overridden from JSON or with `with_*` builders:
//!
//! ```
//! use tramopoly::core::EngineConfig;
//!
//! let config = EngineConfig::default().with_veto_minutes(5);
//! assert_eq!(config.veto_minutes, 5);
//! assert_eq!(config.lines_to_win, 3);
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::ZoneNumber;

/// Rule constants for one engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Veto period in minutes when a challenge has no override.
    pub veto_minutes: i64,

    /// Locked lines a team needs (alongside all its secrets) to win.
    pub lines_to_win: usize,

    /// Zones that each team is dealt one secret from.
    pub secret_zones: Vec<ZoneNumber>,

    /// How many secrets a team may flag for redeal before the start.
    pub max_mulligans: usize,

    /// Cards offered when a team holding reward-choice earns a reward.
    pub reward_choice_count: usize,

    /// Secrets a team may discard with the drop-secrets special.
    pub drop_secrets_count: usize,

    /// Zone of the extra secret dealt to rivals by the add-secrets special.
    pub added_secret_zone: ZoneNumber,

    /// Letters in a generated game code.
    pub game_code_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            veto_minutes: 10,
            lines_to_win: 3,
            secret_zones: vec![ZoneNumber::new(1), ZoneNumber::new(2), ZoneNumber::new(3)],
            max_mulligans: 3,
            reward_choice_count: 2,
            drop_secrets_count: 2,
            added_secret_zone: ZoneNumber::new(2),
            game_code_length: 4,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The default veto period.
    #[must_use]
    pub fn veto_period(&self) -> Duration {
        Duration::minutes(self.veto_minutes)
    }

    #[must_use]
    pub fn with_veto_minutes(mut self, minutes: i64) -> Self {
        self.veto_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_lines_to_win(mut self, lines: usize) -> Self {
        self.lines_to_win = lines;
        self
    }

    #[must_use]
    pub fn with_secret_zones(mut self, zones: impl IntoIterator<Item = ZoneNumber>) -> Self {
        self.secret_zones = zones.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_max_mulligans(mut self, count: usize) -> Self {
        self.max_mulligans = count;
        self
    }

    #[must_use]
    pub fn with_reward_choice_count(mut self, count: usize) -> Self {
        self.reward_choice_count = count;
        self
    }

    #[must_use]
    pub fn with_drop_secrets_count(mut self, count: usize) -> Self {
        self.drop_secrets_count = count;
        self
    }

    #[must_use]
    pub fn with_added_secret_zone(mut self, zone: ZoneNumber) -> Self {
        self.added_secret_zone = zone;
        self
    }
}
