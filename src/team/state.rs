//! Roster and the challenge state machine.
//!
//! ```text
//!            start                complete
//!   Idle ───────────▶ Active ─────────────▶ Idle   (stop claimed)
//!    ▲                 │  ▲
//!    │ veto lapses     │  │ resume (no clearable curses left)
//!    │                 │  │
//!   Veto ◀──── veto ───┘  Paused ◀── clearable curse lands
//! ```
//!
//! Veto expiry is lazy: `check_veto` compares the stored end time with the
//! clock and, once it has passed, moves the team back to `Idle`. Every
//! operation that cares about veto calls it first.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{ChallengeId, EngineError, Result, StopCode, TeamId};
use crate::game::Game;
use crate::map::Reward;
use crate::store::{ChallengeState, DocumentKind, DocumentStore, ExpectedVersion, TeamRecord};

/// The result of completing a challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claimed {
    pub stop: StopCode,
    pub reward: Option<Reward>,
}

impl<S: DocumentStore> Game<S> {
    /// Add a team to the game. Ids follow join order.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn add_team(&mut self, name: &str, colour: &str) -> Result<TeamId> {
        let id = self.docs.modify_meta(|meta| {
            let id = u32::try_from(meta.teams.len()).ok().map(TeamId::new);
            meta.teams.extend(id);
            id
        })?;
        let Some(id) = id else {
            return Err(EngineError::invariant("team roster is full"));
        };
        self.docs.save(
            DocumentKind::Team,
            &id.raw().to_string(),
            &TeamRecord::new(name, colour),
            ExpectedVersion::Absent,
        )?;
        debug!(team = %id, name, "team added");
        Ok(id)
    }

    /// Every team, in join order.
    pub fn teams(&self) -> Result<Vec<TeamId>> {
        Ok(self.docs.meta()?.teams)
    }

    /// Every team except `team`.
    pub fn other_teams(&self, team: TeamId) -> Result<Vec<TeamId>> {
        Ok(self.teams()?.into_iter().filter(|other| *other != team).collect())
    }

    /// A team's stored state, or `None` for an unknown id.
    pub fn team(&self, team: TeamId) -> Result<Option<TeamRecord>> {
        self.docs.team(team)
    }

    /// A team that is on the roster and therefore must have a document.
    pub(crate) fn team_record(&self, team: TeamId) -> Result<TeamRecord> {
        self.docs
            .team(team)?
            .ok_or_else(|| EngineError::invariant(format!("{team} has no document")))
    }

    /// Stored challenge state, without applying veto expiry.
    pub fn challenge_state(&self, team: TeamId) -> Result<Option<ChallengeState>> {
        Ok(self.docs.team(team)?.map(|record| record.challenge))
    }

    /// Whether `team` is still serving a veto, ending it if it has lapsed.
    pub fn check_veto(&mut self, team: TeamId) -> Result<bool> {
        let Some(record) = self.docs.team(team)? else {
            return Ok(false);
        };
        let ChallengeState::Veto { until, .. } = record.challenge else {
            return Ok(false);
        };
        if self.now() < until {
            return Ok(true);
        }
        self.docs.modify_team(team, |record| record.challenge = ChallengeState::Idle)?;
        debug!(%team, "veto lapsed");
        Ok(false)
    }

    /// When the current veto ends, if the team is serving one.
    pub fn veto_end(&mut self, team: TeamId) -> Result<Option<DateTime<Utc>>> {
        if !self.check_veto(team)? {
            return Ok(None);
        }
        Ok(match self.challenge_state(team)? {
            Some(ChallengeState::Veto { until, .. }) => Some(until),
            _ => None,
        })
    }

    /// The challenge `team` is actively attempting.
    pub fn current_challenge(&self, team: TeamId) -> Result<Option<ChallengeId>> {
        Ok(match self.challenge_state(team)? {
            Some(ChallengeState::Active { challenge }) => Some(challenge),
            _ => None,
        })
    }

    /// The challenge suspended by a clearable curse.
    pub fn paused_challenge(&self, team: TeamId) -> Result<Option<ChallengeId>> {
        Ok(match self.challenge_state(team)? {
            Some(ChallengeState::Paused { challenge }) => Some(challenge),
            _ => None,
        })
    }

    /// Stop of the challenge `team` is attempting, active or paused.
    pub fn challenge_location(&self, team: TeamId) -> Result<Option<StopCode>> {
        let challenge = match self.challenge_state(team)? {
            Some(ChallengeState::Active { challenge } | ChallengeState::Paused { challenge }) => challenge,
            _ => return Ok(None),
        };
        self.catalog()
            .challenge_location(&challenge)
            .cloned()
            .map(Some)
            .ok_or_else(|| EngineError::invariant(format!("challenge {challenge} has no stop")))
    }

    /// No clearable curse is holding `team` back.
    pub fn may_progress(&self, team: TeamId) -> Result<bool> {
        Ok(self.docs.team(team)?.is_some_and(|record| record.may_progress()))
    }

    /// Begin a challenge.
    ///
    /// Rejected while already attempting one, in veto, held back by a
    /// clearable curse, or when the challenge's stop is already claimed.
    /// Starting over a paused challenge replaces it.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn start_challenge(&mut self, team: TeamId, challenge: &ChallengeId) -> Result<bool> {
        let Some(stop) = self.catalog().challenge_location(challenge).cloned() else {
            return Ok(false);
        };
        if self.check_veto(team)? {
            return Ok(false);
        }
        let Some(record) = self.docs.team(team)? else {
            return Ok(false);
        };
        if record.challenge.is_active() || !record.may_progress() || self.docs.stop(&stop)?.claimed() {
            return Ok(false);
        }
        self.docs.modify_team(team, |record| {
            record.challenge = ChallengeState::Active {
                challenge: challenge.clone(),
            };
        })?;
        debug!(%team, %challenge, %stop, "challenge started");
        Ok(true)
    }

    /// Finish the active challenge and claim its stop.
    ///
    /// Returns `None` unless the team is actively attempting a challenge and
    /// free of clearable curses.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn complete_challenge(&mut self, team: TeamId) -> Result<Option<Claimed>> {
        let Some(record) = self.docs.team(team)? else {
            return Ok(None);
        };
        if !record.challenge.is_active() || !record.may_progress() {
            return Ok(None);
        }
        let Some(stop) = self.challenge_location(team)? else {
            return Ok(None);
        };

        let reward = self.claim_stop(&stop, team)?;
        self.docs.modify_team(team, |record| record.challenge = ChallengeState::Idle)?;
        debug!(%team, %stop, "challenge completed");
        Ok(Some(Claimed { stop, reward }))
    }

    /// Abandon the active challenge and serve its veto period.
    ///
    /// Returns the end of the veto, or `None` if there was nothing to veto.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn veto_challenge(&mut self, team: TeamId) -> Result<Option<DateTime<Utc>>> {
        let Some(challenge) = self.current_challenge(team)? else {
            return Ok(None);
        };
        let standard = self.config().veto_period();
        let period = self
            .catalog()
            .challenge(&challenge)
            .map_or(standard, |def| def.veto_period(standard));
        let until = self.now() + period;

        self.docs.modify_team(team, |record| {
            record.challenge = ChallengeState::Veto { challenge, until };
        })?;
        debug!(%team, %until, "challenge vetoed");
        Ok(Some(until))
    }

    /// Drop an active or paused challenge without a veto.
    pub fn clear_challenge(&mut self, team: TeamId) -> Result<bool> {
        let attempting = self
            .challenge_state(team)?
            .is_some_and(|state| state.is_active() || state.is_paused());
        if !attempting {
            return Ok(false);
        }
        self.docs.modify_team(team, |record| record.challenge = ChallengeState::Idle)?;
        Ok(true)
    }

    /// Pick a paused challenge back up once every clearable curse is gone.
    pub fn resume_challenge(&mut self, team: TeamId) -> Result<bool> {
        let Some(record) = self.docs.team(team)? else {
            return Ok(false);
        };
        let ChallengeState::Paused { ref challenge } = record.challenge else {
            return Ok(false);
        };
        if !record.may_progress() {
            return Ok(false);
        }
        debug!(%team, %challenge, "challenge resumed");
        self.docs.modify_team(team, |record| {
            record.challenge = ChallengeState::Active {
                challenge: challenge.clone(),
            };
        })?;
        Ok(true)
    }

    /// Owns every secret stop and holds enough locked lines.
    pub fn has_won(&self, team: TeamId) -> Result<bool> {
        let Some(record) = self.docs.team(team)? else {
            return Ok(false);
        };
        for secret in &record.secrets {
            if self.docs.stop(&secret.stop)?.owner != Some(team) {
                return Ok(false);
            }
        }
        Ok(self.claimed_lines(team)?.len() >= self.config().lines_to_win)
    }
}
