//! Curses and special abilities held by a team.
//!
//! A clearable curse stays until the team clears it and blocks all progress
//! meanwhile. An ongoing curse carries an end time and is dropped the next
//! time the team's ongoing curses are read after that time.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::catalog::{clean, Special};
use crate::core::{DeckId, Result, TeamId};
use crate::game::Game;
use crate::store::{ChallengeState, DocumentStore, OngoingCurseEntry};

impl<S: DocumentStore> Game<S> {
    /// Land a clearable curse. An active challenge is paused, keeping its id.
    pub fn add_clear_curse(&mut self, team: TeamId, card: &DeckId) -> Result<()> {
        let paused = self.docs.modify_team(team, |record| {
            record.clear_curses.push(card.clone());
            match &record.challenge {
                ChallengeState::Active { challenge } => {
                    record.challenge = ChallengeState::Paused {
                        challenge: challenge.clone(),
                    };
                    true
                }
                _ => false,
            }
        })?;
        debug!(%team, %card, paused, "clearable curse added");
        Ok(())
    }

    pub fn add_ongoing_curse(&mut self, team: TeamId, card: &DeckId, ends_at: DateTime<Utc>) -> Result<()> {
        self.docs.modify_team(team, |record| {
            record.ongoing_curses.push(OngoingCurseEntry {
                card: card.clone(),
                ends_at,
            });
        })?;
        debug!(%team, %card, %ends_at, "ongoing curse added");
        Ok(())
    }

    /// Remove a clearable curse. Clearing one that is not held is a no-op.
    ///
    /// A paused challenge is not resumed; see `resume_challenge`.
    pub fn clear_curse(&mut self, team: TeamId, card: &DeckId) -> Result<bool> {
        let held = self
            .docs
            .team(team)?
            .is_some_and(|record| record.clear_curses.contains(card));
        if !held {
            return Ok(false);
        }
        self.docs.modify_team(team, |record| {
            if let Some(pos) = record.clear_curses.iter().position(|held| held == card) {
                record.clear_curses.remove(pos);
            }
        })?;
        debug!(%team, %card, "curse cleared");
        Ok(true)
    }

    /// End an ongoing curse early.
    pub fn expire_curse(&mut self, team: TeamId, card: &DeckId) -> Result<bool> {
        let held = self
            .docs
            .team(team)?
            .is_some_and(|record| record.ongoing_curses.iter().any(|entry| &entry.card == card));
        if !held {
            return Ok(false);
        }
        self.docs
            .modify_team(team, |record| record.ongoing_curses.retain(|entry| &entry.card != card))?;
        Ok(true)
    }

    /// Ongoing curses still running, dropping any that have lapsed.
    pub fn active_ongoing_curses(&mut self, team: TeamId) -> Result<Vec<OngoingCurseEntry>> {
        let Some(record) = self.docs.team(team)? else {
            return Ok(Vec::new());
        };
        let now = self.now();
        let (running, lapsed): (Vec<_>, Vec<_>) = record
            .ongoing_curses
            .into_iter()
            .partition(|entry| entry.ends_at > now);
        if !lapsed.is_empty() {
            self.docs
                .modify_team(team, |record| record.ongoing_curses.retain(|entry| entry.ends_at > now))?;
            debug!(%team, lapsed = lapsed.len(), "ongoing curses lapsed");
        }
        Ok(running)
    }

    /// Clearable curses the team still has to clear.
    pub fn uncleared_curses(&self, team: TeamId) -> Result<Vec<DeckId>> {
        Ok(self
            .docs
            .team(team)?
            .map(|record| record.clear_curses)
            .unwrap_or_default())
    }

    /// An uncleared curse whose card title matches `name`.
    pub fn clearable_curse_by_name(&self, team: TeamId, name: &str) -> Result<Option<DeckId>> {
        let wanted = clean(name);
        for card in self.uncleared_curses(team)? {
            let title_matches = self.card(&card)?.is_some_and(|view| clean(&view.title) == wanted);
            if title_matches {
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    pub fn has_special(&self, team: TeamId, special: Special) -> Result<bool> {
        Ok(self.docs.team(team)?.is_some_and(|record| record.has_special(special)))
    }

    pub fn has_curse_immunity(&self, team: TeamId) -> Result<bool> {
        self.has_special(team, Special::Immunity)
    }

    /// Grant a special ability.
    ///
    /// Immunity also lifts every curse the team holds, clearable and ongoing.
    pub fn add_special(&mut self, team: TeamId, special: Special) -> Result<()> {
        self.docs.modify_team(team, |record| {
            record.specials.push(special);
            if special == Special::Immunity {
                record.clear_curses.clear();
                record.ongoing_curses.clear();
            }
        })?;
        debug!(%team, ?special, "special ability granted");
        Ok(())
    }

    /// Use up one held copy of a one-shot special.
    pub(crate) fn consume_special(&mut self, team: TeamId, special: Special) -> Result<bool> {
        self.docs.modify_team(team, |record| {
            match record.specials.iter().position(|held| *held == special) {
                Some(pos) => {
                    record.specials.remove(pos);
                    true
                }
                None => false,
            }
        })
    }
}
