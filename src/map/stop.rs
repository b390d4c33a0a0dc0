//! Stop ownership: claim, unclaim, lock, rewards, and the data a map needs.

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::Special;
use crate::core::{EngineError, LineColour, Result, StopCode, TeamId, ZoneNumber};
use crate::game::Game;
use crate::store::DocumentStore;

use super::Reward;

/// Everything a renderer needs to draw one stop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StopView {
    pub code: StopCode,
    pub name: String,
    pub zone: ZoneNumber,
    pub border: bool,
    pub lines: Vec<LineColour>,
    pub owner: Option<TeamId>,
    pub locked_line: Option<LineColour>,
    pub has_reward: bool,
    /// Special ability still waiting for a claimant.
    pub special: Option<Special>,
}

/// Marker drawn on a stop, from the observer's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapIcon {
    SpecialAbility,
    LockedYou,
    LockedOther,
    ClaimedYou,
    ClaimedOther,
    Reward,
    Secret,
    None,
}

impl<S: DocumentStore> Game<S> {
    /// Rendering data for a stop, or `None` for an unknown code.
    pub fn stop(&self, code: &StopCode) -> Result<Option<StopView>> {
        let Some(def) = self.catalog().stop(code.as_str()) else {
            return Ok(None);
        };
        let record = self.docs.stop(code)?;
        Ok(Some(StopView {
            code: def.code.clone(),
            name: def.name.clone(),
            zone: def.zone,
            border: def.border,
            lines: def.lines.clone(),
            owner: record.owner,
            locked_line: record.locked_line.clone(),
            has_reward: record.has_reward,
            special: record.pending_special(),
        }))
    }

    pub fn stop_owner(&self, code: &StopCode) -> Result<Option<TeamId>> {
        Ok(self.docs.stop(code)?.owner)
    }

    /// Stops owned by `team`, in catalog order.
    pub fn claimed_stops(&self, team: TeamId) -> Result<Vec<StopCode>> {
        self.stops_where(|owner, _| owner == Some(team))
    }

    /// Stops owned by `team` that are not locked into a line.
    pub fn claimed_unlocked_stops(&self, team: TeamId) -> Result<Vec<StopCode>> {
        self.stops_where(|owner, locked| owner == Some(team) && !locked)
    }

    fn stops_where(&self, keep: impl Fn(Option<TeamId>, bool) -> bool) -> Result<Vec<StopCode>> {
        let mut out = Vec::new();
        for def in self.catalog().stops() {
            let record = self.docs.stop(&def.code)?;
            if keep(record.owner, record.locked()) {
                out.push(def.code.clone());
            }
        }
        Ok(out)
    }

    /// Claim a stop for `team`.
    ///
    /// Collects the stop's pending reward (a card from its zone deck) or, if
    /// there is none, its unclaimed special ability. Any other team attempting
    /// a challenge here is sent back to idle without a veto. Claiming a stop
    /// locked into another team's line unlocks that line first, so a line is
    /// never owned by two teams.
    ///
    /// Returns `None` for an unknown stop or when nothing was collected.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn claim_stop(&mut self, code: &StopCode, team: TeamId) -> Result<Option<Reward>> {
        let Some(def) = self.catalog().stop(code.as_str()) else {
            return Ok(None);
        };
        let zone = def.zone;

        let before = self.docs.stop(code)?;
        if let Some(line) = before.locked_line.as_ref().filter(|_| before.owner != Some(team)) {
            self.unlock_line(line)?;
        }

        let (reward_due, special) = self.docs.modify_stop(code, |stop| {
            stop.owner = Some(team);
            if stop.has_reward {
                stop.has_reward = false;
                (true, None)
            } else if let Some(special) = stop.pending_special() {
                stop.special_used = true;
                (false, Some(special))
            } else {
                (false, None)
            }
        })?;
        debug!(stop = %code, %team, "stop claimed");

        let reward = if reward_due {
            let dealt = self.deal_action(team, zone)?;
            if dealt.is_none() {
                warn!(stop = %code, %zone, "reward due but the zone deck is empty");
            }
            dealt
        } else if let Some(special) = special {
            self.add_special(team, special)?;
            Some(Reward::Special(special))
        } else {
            None
        };

        self.kick_challengers(code, team)?;
        self.check_game_over()?;
        Ok(reward)
    }

    /// Send every other team attempting a challenge at `code` back to idle.
    fn kick_challengers(&mut self, code: &StopCode, claimant: TeamId) -> Result<()> {
        for other in self.teams()? {
            if other == claimant {
                continue;
            }
            let Some(location) = self.challenge_location(other)? else {
                continue;
            };
            if &location == code {
                self.clear_challenge(other)?;
                debug!(team = %other, stop = %code, "challenge dropped, stop claimed by a rival");
            }
        }
        Ok(())
    }

    /// Release a stop. If it was locked into a line, the whole line unlocks.
    ///
    /// Returns `false` if the stop was not claimed.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn unclaim_stop(&mut self, code: &StopCode) -> Result<bool> {
        let record = self.docs.stop(code)?;
        if !record.claimed() {
            return Ok(false);
        }
        if let Some(line) = &record.locked_line {
            self.unlock_line(line)?;
        }
        self.docs.modify_stop(code, |stop| {
            stop.owner = None;
            stop.locked_line = None;
        })?;
        debug!(stop = %code, "stop unclaimed");
        Ok(true)
    }

    pub(crate) fn lock_stop(&mut self, code: &StopCode, line: &LineColour) -> Result<()> {
        let owned = self.docs.stop(code)?.claimed();
        if !owned {
            return Err(EngineError::invariant(format!("locking unclaimed stop {code}")));
        }
        self.docs.modify_stop(code, |stop| stop.locked_line = Some(line.clone()))
    }

    pub(crate) fn unlock_stop(&mut self, code: &StopCode) -> Result<()> {
        self.docs.modify_stop(code, |stop| stop.locked_line = None)
    }

    pub(crate) fn add_reward(&mut self, code: &StopCode) -> Result<()> {
        self.docs.modify_stop(code, |stop| stop.has_reward = true)
    }

    pub(crate) fn bind_special(&mut self, code: &StopCode, special: Special) -> Result<()> {
        self.docs.modify_stop(code, |stop| {
            stop.special = Some(special);
            stop.special_used = false;
        })
    }

    pub(crate) fn clear_rewards(&mut self, code: &StopCode) -> Result<()> {
        self.docs.modify_stop(code, |stop| {
            stop.has_reward = false;
            stop.special = None;
            stop.special_used = false;
        })
    }

    /// The marker to draw on a stop for `observer`.
    pub fn map_icon(&self, code: &StopCode, observer: Option<TeamId>) -> Result<MapIcon> {
        let record = self.docs.stop(code)?;
        let mine = observer.is_some() && record.owner == observer;

        let icon = if record.pending_special().is_some() {
            MapIcon::SpecialAbility
        } else if record.locked() {
            if mine { MapIcon::LockedYou } else { MapIcon::LockedOther }
        } else if record.claimed() {
            if mine { MapIcon::ClaimedYou } else { MapIcon::ClaimedOther }
        } else if record.has_reward {
            MapIcon::Reward
        } else if let Some(team) = observer {
            let secret = self
                .docs
                .team(team)?
                .is_some_and(|record| record.secrets.iter().any(|s| &s.stop == code));
            if secret { MapIcon::Secret } else { MapIcon::None }
        } else {
            MapIcon::None
        };
        Ok(icon)
    }
}
