//! Live cards: one record per copy in a game's deck.
//!
//! A card moves from its zone deck into a hand by being dealt, or into a
//! team's reserve when it is offered as a reward choice. Playing it marks it
//! used, which takes it out of the hand for good.

use serde::Serialize;
use tracing::debug;

use crate::catalog::ActionDef;
use crate::core::{ActionCode, DeckId, EngineError, Result, StopCode, TeamId, ZoneNumber};
use crate::game::Game;
use crate::store::{ActionRecord, DocumentStore};

use super::behaviour::{CardFacts, PlayTargets, StopFacts, Table};
use super::{ActionKind, ActionType};

/// A live card with its static metadata, for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: DeckId,
    pub code: ActionCode,
    pub kind: ActionKind,
    pub title: String,
    pub tagline: String,
    pub rules: String,
    pub zone: ZoneNumber,
    pub owner: Option<TeamId>,
    pub dealt: bool,
    pub used: bool,
    pub reserved: bool,
}

/// Display order of a hand: by family, clearable curses before ongoing
/// ones, then by code and zone.
fn hand_order(view: &CardView) -> (ActionType, bool, &ActionCode, ZoneNumber) {
    (
        view.kind.action_type(),
        view.kind == ActionKind::OngoingCurse,
        &view.code,
        view.zone,
    )
}

impl<S: DocumentStore> Game<S> {
    fn action_def(&self, code: &ActionCode) -> Result<&ActionDef> {
        self.catalog()
            .action(code)
            .ok_or_else(|| EngineError::invariant(format!("card code {code} is not in the catalog")))
    }

    /// A live card, or `None` if the deck holds no such id.
    pub fn card(&self, id: &DeckId) -> Result<Option<CardView>> {
        let Some(record) = self.docs.action(id)? else {
            return Ok(None);
        };
        let def = self.action_def(&record.code)?;
        Ok(Some(CardView {
            id: id.clone(),
            code: record.code.clone(),
            kind: def.kind,
            title: def.title.to_uppercase(),
            tagline: def.tagline.clone(),
            rules: def.rules.clone(),
            zone: record.zone,
            owner: record.owner,
            dealt: record.dealt,
            used: record.used,
            reserved: record.reserved,
        }))
    }

    fn cards_where(&self, keep: impl Fn(&ActionRecord) -> bool) -> Result<Vec<CardView>> {
        let mut out = Vec::new();
        for id in self.all_cards()? {
            let Some(record) = self.docs.action(&id)? else {
                continue;
            };
            if keep(&record) {
                if let Some(view) = self.card(&id)? {
                    out.push(view);
                }
            }
        }
        out.sort_by(|a, b| hand_order(a).cmp(&hand_order(b)));
        Ok(out)
    }

    /// Cards in `team`'s hand, in display order.
    pub fn hand(&self, team: TeamId) -> Result<Vec<CardView>> {
        self.cards_where(|record| record.in_hand_of(team))
    }

    /// Cards reserved for `team` to choose from.
    pub fn reserved_actions(&self, team: TeamId) -> Result<Vec<CardView>> {
        self.cards_where(|record| record.reserved && record.owner == Some(team))
    }

    pub(crate) fn deal_card(&mut self, id: &DeckId, team: TeamId) -> Result<()> {
        self.docs.modify_action(id, |record| {
            record.dealt = true;
            record.owner = Some(team);
        })?;
        debug!(card = %id, %team, "card dealt");
        Ok(())
    }

    pub(crate) fn reserve_card(&mut self, id: &DeckId, team: TeamId) -> Result<()> {
        self.docs.modify_action(id, |record| {
            record.reserved = true;
            record.owner = Some(team);
        })
    }

    pub(crate) fn unreserve_card(&mut self, id: &DeckId) -> Result<()> {
        self.docs.modify_action(id, |record| {
            record.reserved = false;
            record.owner = None;
        })
    }

    /// Take one of the cards reserved for `team` into its hand and return
    /// the rest to their decks.
    ///
    /// Returns `false` if `card` is not reserved for `team`.
    pub fn choose_action(&mut self, team: TeamId, card: &DeckId) -> Result<bool> {
        let reserved = self.reserved_actions(team)?;
        if !reserved.iter().any(|view| &view.id == card) {
            return Ok(false);
        }
        for view in &reserved {
            if &view.id == card {
                self.docs.modify_action(card, |record| {
                    record.reserved = false;
                    record.dealt = true;
                })?;
            } else {
                self.unreserve_card(&view.id)?;
            }
        }
        debug!(%team, %card, returned = reserved.len() - 1, "reward card chosen");
        Ok(true)
    }

    /// Counter cards in `team`'s hand that could answer `card`.
    pub fn counter_options(&self, team: TeamId, card: &DeckId) -> Result<Vec<DeckId>> {
        let targets = PlayTargets::Card { card: card.clone() };
        let mut out = Vec::new();
        for view in self.hand(team)? {
            if !view.kind.is_counter() {
                continue;
            }
            let facts = CardFacts {
                id: view.id.clone(),
                kind: view.kind,
                owner: view.owner,
                zone: view.zone,
            };
            if view.kind.playable_specific(self, &facts, &targets)? {
                out.push(view.id);
            }
        }
        Ok(out)
    }
}

impl<S: DocumentStore> Table for Game<S> {
    fn stop_facts(&self, code: &StopCode) -> Result<Option<StopFacts>> {
        if self.catalog().stop(code.as_str()).is_none() {
            return Ok(None);
        }
        let record = self.docs.stop(code)?;
        Ok(Some(StopFacts {
            owner: record.owner,
            locked: record.locked(),
        }))
    }

    fn curse_immune(&self, team: TeamId) -> Result<bool> {
        self.has_curse_immunity(team)
    }

    fn unlocked_stop_count(&self, team: TeamId) -> Result<usize> {
        Ok(self.claimed_unlocked_stops(team)?.len())
    }

    fn claimed_stop_count(&self, team: TeamId) -> Result<usize> {
        Ok(self.claimed_stops(team)?.len())
    }

    fn card_facts(&self, card: &DeckId) -> Result<Option<CardFacts>> {
        let Some(record) = self.docs.action(card)? else {
            return Ok(None);
        };
        let kind = self.action_def(&record.code)?.kind;
        Ok(Some(CardFacts {
            id: card.clone(),
            kind,
            owner: record.owner,
            zone: record.zone,
        }))
    }
}
