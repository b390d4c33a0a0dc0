//! Lines: derived ownership and claims.
//!
//! A line stores nothing of its own. It is claimed exactly when some stop's
//! `locked_line` names it, and its owner is the owner of those stops.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::info;

use crate::catalog::{Catalog, Special};
use crate::core::{EngineError, LineColour, Result, StopCode, TeamId};
use crate::game::Game;
use crate::store::DocumentStore;

use super::coverage::{enough_zones_covered, CoverageMode, ZoneSpan, ZONES_TO_CLAIM};

impl<S: DocumentStore> Game<S> {
    /// Stops locked into `line`, in catalog order.
    pub fn locked_stops(&self, line: &LineColour) -> Result<Vec<StopCode>> {
        let mut out = Vec::new();
        for def in self.catalog().stops() {
            if self.docs.stop(&def.code)?.locked_line.as_ref() == Some(line) {
                out.push(def.code.clone());
            }
        }
        Ok(out)
    }

    pub fn line_claimed(&self, line: &LineColour) -> Result<bool> {
        Ok(!self.locked_stops(line)?.is_empty())
    }

    /// Owner of a claimed line.
    ///
    /// Every locked stop must agree; a split line is an invariant failure.
    pub fn line_owner(&self, line: &LineColour) -> Result<Option<TeamId>> {
        Ok(self.line_owners()?.get(line).copied())
    }

    /// Owner of every claimed line, from one pass over the stops.
    fn line_owners(&self) -> Result<FxHashMap<LineColour, TeamId>> {
        let mut owners: FxHashMap<LineColour, TeamId> = FxHashMap::default();
        for def in self.catalog().stops() {
            let record = self.docs.stop(&def.code)?;
            let (Some(line), Some(owner)) = (record.locked_line, record.owner) else {
                continue;
            };
            match owners.get(&line) {
                Some(existing) if *existing != owner => {
                    return Err(EngineError::invariant(format!(
                        "line {line} is locked by both {existing} and {owner}"
                    )));
                }
                Some(_) => {}
                None => {
                    owners.insert(line, owner);
                }
            }
        }
        Ok(owners)
    }

    /// Lines owned by `team`, in catalog order.
    pub fn claimed_lines(&self, team: TeamId) -> Result<Vec<LineColour>> {
        let owners = self.line_owners()?;
        Ok(self
            .catalog()
            .lines()
            .iter()
            .filter(|line| owners.get(&line.colour) == Some(&team))
            .map(|line| line.colour.clone())
            .collect())
    }

    /// `team`'s unlocked stops that sit on `line`.
    pub fn free_stops_on_line(&self, team: TeamId, line: &LineColour) -> Result<Vec<StopCode>> {
        let mut out = Vec::new();
        for def in self.catalog().stops_on_line(line) {
            let record = self.docs.stop(&def.code)?;
            if record.owner == Some(team) && !record.locked() {
                out.push(def.code.clone());
            }
        }
        Ok(out)
    }

    /// Whether `team`'s free stops on an unclaimed `line` could make a claim.
    pub fn is_line_claimable(&self, team: TeamId, line: &LineColour) -> Result<bool> {
        if self.catalog().line(line).is_none() || self.line_claimed(line)? {
            return Ok(false);
        }
        let free = self.free_stops_on_line(team, line)?;
        let catalog = self.catalog();
        let spans = spans(catalog, &free);
        let mode = self.coverage_mode(team, line)?;
        Ok(enough_zones_covered(&spans, mode))
    }

    pub fn claimable_lines(&self, team: TeamId) -> Result<Vec<LineColour>> {
        let mut out = Vec::new();
        for line in self.catalog().lines() {
            if self.is_line_claimable(team, &line.colour)? {
                out.push(line.colour.clone());
            }
        }
        Ok(out)
    }

    /// Whether locking exactly `stops` into `line` is a legal claim for `team`.
    ///
    /// The line must be unclaimed, and the three distinct stops must sit on
    /// it, belong to `team`, be unlocked, and cover enough zones.
    pub fn is_valid_claim(&self, team: TeamId, line: &LineColour, stops: &[StopCode]) -> Result<bool> {
        if stops.len() != ZONES_TO_CLAIM || self.catalog().line(line).is_none() {
            return Ok(false);
        }
        let distinct = stops
            .iter()
            .enumerate()
            .all(|(i, code)| !stops[..i].contains(code));
        if !distinct || self.line_claimed(line)? {
            return Ok(false);
        }
        for code in stops {
            let on_line = self
                .catalog()
                .stop(code.as_str())
                .is_some_and(|def| def.on_line(line));
            let record = self.docs.stop(code)?;
            if !on_line || record.owner != Some(team) || record.locked() {
                return Ok(false);
            }
        }
        let spans = spans(self.catalog(), stops);
        let mode = self.coverage_mode(team, line)?;
        Ok(enough_zones_covered(&spans, mode))
    }

    /// Lock `stops` into `line` for `team`, if the claim is valid.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn claim_line(&mut self, team: TeamId, line: &LineColour, stops: &[StopCode]) -> Result<bool> {
        if !self.is_valid_claim(team, line, stops)? {
            return Ok(false);
        }
        for code in stops {
            self.lock_stop(code, line)?;
        }
        info!(%team, %line, "line claimed");
        self.check_game_over()?;
        Ok(true)
    }

    /// Unlock every stop locked into `line`. The stops stay claimed.
    pub fn unlock_line(&mut self, line: &LineColour) -> Result<()> {
        let locked = self.locked_stops(line)?;
        for code in &locked {
            self.unlock_stop(code)?;
        }
        if !locked.is_empty() {
            info!(%line, stops = locked.len(), "line unlocked");
        }
        Ok(())
    }

    fn coverage_mode(&self, team: TeamId, line: &LineColour) -> Result<CoverageMode<'_>> {
        let Some(rule) = self.catalog().sections().filter(|rule| &rule.line == line) else {
            return Ok(CoverageMode::Zones);
        };
        let claim_orange = self
            .docs
            .team(team)?
            .is_some_and(|record| record.has_special(Special::ClaimOrange));
        Ok(if claim_orange {
            CoverageMode::Sections(rule)
        } else {
            CoverageMode::Zones
        })
    }
}

/// Zone facts for known stops; unknown codes are skipped.
fn spans<'a>(catalog: &'a Catalog, stops: &[StopCode]) -> SmallVec<[ZoneSpan<'a>; 8]> {
    stops
        .iter()
        .filter_map(|code| catalog.stop(code.as_str()))
        .map(|def| ZoneSpan {
            code: def.code.as_str(),
            zone: def.zone,
            border: def.border,
            parent: catalog.parent_of(def).map(StopCode::as_str),
        })
        .collect()
}
