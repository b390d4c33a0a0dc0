//! Secret stops and the specials that move them around.

use tracing::{debug, warn};

use crate::catalog::Special;
use crate::core::{Result, StopCode, TeamId};
use crate::game::Game;
use crate::store::{DocumentStore, SecretEntry};

impl<S: DocumentStore> Game<S> {
    pub fn secrets(&self, team: TeamId) -> Result<Vec<SecretEntry>> {
        Ok(self.docs.team(team)?.map(|record| record.secrets).unwrap_or_default())
    }

    fn secret_stops(&self, team: TeamId, keep: impl Fn(&SecretEntry) -> bool) -> Result<Vec<StopCode>> {
        Ok(self
            .secrets(team)?
            .into_iter()
            .filter(|secret| keep(secret))
            .map(|secret| secret.stop)
            .collect())
    }

    /// Secrets flagged to be redealt.
    pub fn mulliganed_secrets(&self, team: TeamId) -> Result<Vec<StopCode>> {
        self.secret_stops(team, |secret| secret.mulligan)
    }

    /// Secrets the team keeps through the mulligan.
    pub fn retained_secrets(&self, team: TeamId) -> Result<Vec<StopCode>> {
        self.secret_stops(team, |secret| !secret.mulligan)
    }

    pub fn revealed_secrets(&self, team: TeamId) -> Result<Vec<StopCode>> {
        self.secret_stops(team, |secret| secret.revealed)
    }

    pub fn unrevealed_secrets(&self, team: TeamId) -> Result<Vec<StopCode>> {
        self.secret_stops(team, |secret| !secret.revealed)
    }

    pub fn add_secret(&mut self, team: TeamId, stop: &StopCode) -> Result<()> {
        self.docs
            .modify_team(team, |record| record.secrets.push(SecretEntry::new(stop.clone())))
    }

    pub fn remove_secret(&mut self, team: TeamId, stop: &StopCode) -> Result<bool> {
        self.docs.modify_team(team, |record| {
            let before = record.secrets.len();
            record.secrets.retain(|secret| &secret.stop != stop);
            record.secrets.len() != before
        })
    }

    pub fn clear_secrets(&mut self, team: TeamId) -> Result<()> {
        self.docs.modify_team(team, |record| record.secrets.clear())
    }

    /// Flag a secret to be redealt when the game starts.
    ///
    /// Only before the start, and at most `max_mulligans` flags per team.
    pub fn mulligan_secret(&mut self, team: TeamId, stop: &StopCode) -> Result<bool> {
        if self.docs.meta()?.in_progress {
            return Ok(false);
        }
        let Some(record) = self.docs.team(team)? else {
            return Ok(false);
        };
        let flagged = record.secrets.iter().filter(|secret| secret.mulligan).count();
        let flaggable = record
            .secrets
            .iter()
            .any(|secret| &secret.stop == stop && !secret.mulligan);
        if !flaggable || flagged >= self.config().max_mulligans {
            return Ok(false);
        }
        self.docs.modify_team(team, |record| {
            for secret in record.secrets.iter_mut().filter(|secret| &secret.stop == stop) {
                secret.mulligan = true;
            }
        })?;
        Ok(true)
    }

    /// Unflag every secret.
    pub fn reset_mulligan(&mut self, team: TeamId) -> Result<()> {
        self.docs.modify_team(team, |record| {
            for secret in &mut record.secrets {
                secret.mulligan = false;
            }
        })
    }

    /// Reveal one of `team`'s secrets: `stop` if given, otherwise a random
    /// unrevealed one. Returns the revealed stop.
    pub fn reveal_secret(&mut self, team: TeamId, stop: Option<&StopCode>) -> Result<Option<StopCode>> {
        let hidden = self.unrevealed_secrets(team)?;
        let chosen = match stop {
            Some(stop) if hidden.contains(stop) => Some(stop.clone()),
            Some(_) => None,
            None => self.rng.choose(&hidden).cloned(),
        };
        let Some(chosen) = chosen else {
            return Ok(None);
        };
        self.docs.modify_team(team, |record| {
            for secret in record.secrets.iter_mut().filter(|secret| secret.stop == chosen) {
                secret.revealed = true;
            }
        })?;
        debug!(%team, stop = %chosen, "secret revealed");
        Ok(Some(chosen))
    }

    /// Give one of `choices` to each other team, in random order.
    ///
    /// Needs the donation special and one distinct held secret per rival.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn donate_secrets(&mut self, team: TeamId, choices: &[StopCode]) -> Result<bool> {
        let others = self.other_teams(team)?;
        let held = self.secret_stops(team, |_| true)?;
        let valid = choices.len() == others.len()
            && choices.iter().enumerate().all(|(i, stop)| !choices[..i].contains(stop))
            && choices.iter().all(|stop| held.contains(stop))
            && self.has_special(team, Special::Donation)?;
        if !valid {
            return Ok(false);
        }

        let mut gifts = choices.to_vec();
        self.rng.shuffle(&mut gifts);
        for (other, stop) in others.into_iter().zip(gifts) {
            self.remove_secret(team, &stop)?;
            self.add_secret(other, &stop)?;
            debug!(from = %team, to = %other, %stop, "secret donated");
        }
        self.consume_special(team, Special::Donation)
    }

    /// Discard up to `drop_secrets_count` of the team's secrets.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn drop_secrets(&mut self, team: TeamId, choices: &[StopCode]) -> Result<bool> {
        let held = self.secret_stops(team, |_| true)?;
        let valid = !choices.is_empty()
            && choices.len() <= self.config().drop_secrets_count
            && choices.iter().all(|stop| held.contains(stop))
            && self.has_special(team, Special::DropSecrets)?;
        if !valid {
            return Ok(false);
        }
        for stop in choices {
            self.remove_secret(team, stop)?;
        }
        self.consume_special(team, Special::DropSecrets)
    }

    /// Deal every other team an extra secret.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn add_secrets(&mut self, team: TeamId) -> Result<bool> {
        if !self.has_special(team, Special::AddSecrets)? {
            return Ok(false);
        }
        let zone = self.config().added_secret_zone;
        for other in self.other_teams(team)? {
            if self.deal_secret(other, zone, None)?.is_none() {
                warn!(team = %other, %zone, "no stop left to deal as an extra secret");
            }
        }
        self.consume_special(team, Special::AddSecrets)
    }
}
