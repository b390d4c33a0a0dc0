//! Game setup, start, reset and the end of the game.
//!
//! ## Setup order
//!
//! 1. `Engine::create_game` builds the zone decks
//! 2. `add_team` for every team
//! 3. `assign_rewards` places rewards and specials on the map
//! 4. `deal_all_secrets`, then teams flag secrets with `mulligan_secret`
//! 5. `start` redeals the flagged secrets and opens play

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{clean, Placement, PlacementNode};
use crate::core::{Result, StopCode, TeamId, ZoneNumber};
use crate::game::Game;
use crate::map::StopView;
use crate::store::{DocumentKind, DocumentStore};

/// A name with any leading `team ` or trailing ` team` removed.
fn bare_team_name(name: &str) -> String {
    let cleaned = clean(name);
    let trimmed = cleaned.strip_prefix("team ").unwrap_or(&cleaned);
    trimmed.strip_suffix(" team").unwrap_or(trimmed).to_owned()
}

impl<S: DocumentStore> Game<S> {
    pub fn in_progress(&self) -> Result<bool> {
        Ok(self.docs.meta()?.in_progress)
    }

    /// Redeal flagged secrets and open play. Returns `false` if already open.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn start(&mut self) -> Result<bool> {
        if self.in_progress()? {
            return Ok(false);
        }
        self.do_mulligan()?;
        let now = self.now();
        self.docs.modify_meta(|meta| {
            meta.in_progress = true;
            meta.started_at = Some(now);
            meta.ended_at = None;
        })?;
        info!(started_at = %now, "game started");
        Ok(true)
    }

    /// Wipe the board and the deck, keeping the teams by name and colour.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn reset(&mut self) -> Result<()> {
        let catalog = self.shared_catalog();
        for def in catalog.stops() {
            self.docs.clear(DocumentKind::Stop, def.code.as_str())?;
        }
        for card in self.all_cards()? {
            self.docs.clear(DocumentKind::Action, card.as_str())?;
            self.docs.clear(DocumentKind::PendingCounter, card.as_str())?;
        }
        self.docs.modify_meta(|meta| {
            meta.in_progress = false;
            meta.started_at = None;
            meta.ended_at = None;
            meta.deck.clear();
        })?;
        self.create_decks()?;
        for team in self.teams()? {
            self.docs.modify_team(team, |record| record.reset())?;
        }
        info!("game reset");
        Ok(())
    }

    /// Place rewards and specials by walking the catalog's placement tree.
    ///
    /// Every existing reward and special is cleared first.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn assign_rewards(&mut self) -> Result<()> {
        let catalog = self.shared_catalog();
        for def in catalog.stops() {
            self.clear_rewards(&def.code)?;
        }
        self.place(catalog.rewards())?;
        Ok(())
    }

    fn place(&mut self, parts: &[Placement]) -> Result<()> {
        for part in parts {
            match part {
                Placement::Stop(code) => self.add_reward(code)?,
                Placement::Node(PlacementNode::Special { stop, code }) => {
                    self.bind_special(stop, *code)?;
                    debug!(%stop, special = ?code, "special placed");
                }
                Placement::Node(PlacementNode::Choice { count, parts }) => {
                    let chosen = self.rng.sample(parts, *count);
                    self.place(&chosen)?;
                }
                Placement::Node(PlacementNode::All { parts }) => self.place(parts)?,
            }
        }
        Ok(())
    }

    /// Deal `team` a random unclaimed stop of `zone` that no team holds as a
    /// retained secret. `None` if there is no such stop.
    pub fn deal_secret(&mut self, team: TeamId, zone: ZoneNumber, exclude: Option<&StopCode>) -> Result<Option<StopCode>> {
        let mut taken = Vec::new();
        for other in self.teams()? {
            taken.extend(self.retained_secrets(other)?);
        }
        let mut candidates = Vec::new();
        for def in self.catalog().stops_in_zone(zone) {
            if taken.contains(&def.code) || exclude == Some(&def.code) {
                continue;
            }
            if !self.docs.stop(&def.code)?.claimed() {
                candidates.push(def.code.clone());
            }
        }

        let Some(chosen) = self.rng.choose(&candidates).cloned() else {
            return Ok(None);
        };
        self.add_secret(team, &chosen)?;
        debug!(%team, %zone, stop = %chosen, "secret dealt");
        Ok(Some(chosen))
    }

    /// Replace every team's secrets with one fresh secret per secret zone.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn deal_all_secrets(&mut self) -> Result<()> {
        let zones = self.config().secret_zones.clone();
        for team in self.teams()? {
            self.clear_secrets(team)?;
            for zone in &zones {
                if self.deal_secret(team, *zone, None)?.is_none() {
                    warn!(%team, %zone, "no stop left to deal as a secret");
                }
            }
        }
        Ok(())
    }

    /// Redeal every flagged secret within its zone, never dealing the same
    /// stop back.
    pub fn do_mulligan(&mut self) -> Result<()> {
        for team in self.teams()? {
            for stop in self.mulliganed_secrets(team)? {
                self.remove_secret(team, &stop)?;
                let Some(zone) = self.catalog().stop(stop.as_str()).map(|def| def.zone) else {
                    continue;
                };
                if self.deal_secret(team, zone, Some(&stop))?.is_none() {
                    warn!(%team, %stop, "mulligan found no replacement secret");
                }
            }
        }
        Ok(())
    }

    /// Whether any team has won, stamping the end time the first time a win
    /// is seen while the game is in progress.
    pub fn check_game_over(&mut self) -> Result<bool> {
        let Some(winner) = self.winner()? else {
            return Ok(false);
        };
        let meta = self.docs.meta()?;
        if meta.in_progress {
            let now = self.now();
            self.docs.modify_meta(|meta| {
                meta.in_progress = false;
                meta.ended_at = Some(now);
            })?;
            info!(game = %self.id, %winner, ended_at = %now, "game over");
        }
        Ok(true)
    }

    /// The first team, in join order, that has won.
    pub fn winner(&self) -> Result<Option<TeamId>> {
        for team in self.teams()? {
            if self.has_won(team)? {
                return Ok(Some(team));
            }
        }
        Ok(None)
    }

    /// Time from the start to the stamped end, once both exist.
    pub fn total_game_time(&self) -> Result<Option<Duration>> {
        let meta = self.docs.meta()?;
        Ok(meta.started_at.zip(meta.ended_at).map(|(start, end)| end - start))
    }

    /// Find a team by a loosely typed name, or by its colour.
    pub fn team_by_name(&self, name: &str) -> Result<Option<TeamId>> {
        let wanted = bare_team_name(name);
        let colour = clean(name);
        for team in self.teams()? {
            let record = self.team_record(team)?;
            if bare_team_name(&record.name) == wanted || clean(&record.name) == colour || record.colour == colour {
                return Ok(Some(team));
            }
        }
        Ok(None)
    }

    /// Find a stop by a loosely typed name.
    pub fn search_stop(&self, term: &str) -> Result<Option<StopView>> {
        match self.catalog().search_stop(term) {
            Some(def) => self.stop(&def.code),
            None => Ok(None),
        }
    }
}
