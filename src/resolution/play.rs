//! Opening a play and applying effects.

use tracing::debug;

use crate::cards::{CardFacts, Effect, PlayTargets, Table};
use crate::core::{DeckId, EngineError, Result, TeamId};
use crate::game::Game;
use crate::store::{DocumentKind, DocumentStore, ExpectedVersion, PendingCounter};

use super::{negotiation_bound, ChainLink, Negotiation, Outcome, Play, Resolution};

impl<S: DocumentStore> Game<S> {
    /// Play a card from its owner's hand.
    ///
    /// The card must be in hand and not a counter, its owner free of
    /// clearable curses, and `targets` legal for it.
    #[tracing::instrument(skip(self), fields(game = %self.id))]
    pub fn play_action(&mut self, card: &DeckId, targets: &PlayTargets) -> Result<Play> {
        if self.docs.pending(card)?.is_some_and(|pending| pending.expired) {
            return Ok(Play::Retry);
        }
        let (Some(record), Some(facts)) = (self.docs.action(card)?, self.card_facts(card)?) else {
            return Ok(Play::Rejected);
        };
        let Some(owner) = facts.owner.filter(|owner| record.in_hand_of(*owner)) else {
            return Ok(Play::Rejected);
        };
        if facts.kind.is_counter() || !self.may_progress(owner)? {
            return Ok(Play::Rejected);
        }
        // A partial selection can be playable without naming a full effect yet.
        if facts.kind.effect(&facts, targets).is_none() || !facts.kind.playable_specific(self, &facts, targets)? {
            return Ok(Play::Rejected);
        }
        let Some(victim) = facts.kind.victim(self, &facts, targets)? else {
            return Ok(Play::Rejected);
        };

        self.use_card(card)?;
        debug!(%card, %owner, %victim, kind = %facts.kind, "card played");

        let answers = self.counter_options(victim, card)?.len();
        if answers == 0 {
            let outcome = self.apply(&facts, targets)?;
            return Ok(Play::Resolved(Resolution {
                card: card.clone(),
                outcome,
                chain: vec![card.clone()],
            }));
        }

        let own_counters = self.counter_cards_held(owner)?;
        self.open_pending(card, victim)?;
        let opening = ChainLink {
            card: card.clone(),
            owner,
            responder: victim,
        };
        debug!(%card, %victim, answers, "play contested");
        Ok(Play::Contested(Negotiation::new(
            opening,
            targets.clone(),
            negotiation_bound(self.counter_cards_held(victim)?, own_counters),
        )))
    }

    pub(crate) fn use_card(&mut self, card: &DeckId) -> Result<()> {
        self.docs.modify_action(card, |record| record.used = true)
    }

    pub(crate) fn counter_cards_held(&self, team: TeamId) -> Result<usize> {
        Ok(self.hand(team)?.iter().filter(|view| view.kind.is_counter()).count())
    }

    /// Mark `card` as contested, waiting on `victim`.
    pub(crate) fn open_pending(&mut self, card: &DeckId, victim: TeamId) -> Result<()> {
        let pending = PendingCounter {
            victim,
            expired: false,
            countered_by: None,
            answered_by: None,
        };
        self.docs
            .save(DocumentKind::PendingCounter, card.as_str(), &pending, ExpectedVersion::Any)?;
        Ok(())
    }

    /// Ordered cards from `card` through every counter that stood against it.
    pub fn counter_chain(&self, card: &DeckId) -> Result<Vec<DeckId>> {
        let mut chain = vec![card.clone()];
        let mut current = card.clone();
        while let Some(next) = self.docs.pending(&current)?.and_then(|pending| pending.countered_by) {
            if chain.contains(&next) {
                return Err(EngineError::invariant(format!("counter chain of {card} loops at {next}")));
            }
            chain.push(next.clone());
            current = next;
        }
        Ok(chain)
    }

    /// Apply a standing card's effect, if it is still legal.
    pub(crate) fn apply(&mut self, facts: &CardFacts, targets: &PlayTargets) -> Result<Outcome> {
        let Some(effect) = facts.kind.effect(facts, targets) else {
            return Err(EngineError::invariant(format!(
                "{} card {} was played with {targets:?}",
                facts.kind, facts.id
            )));
        };
        if !facts.kind.playable_specific(self, facts, targets)? {
            debug!(card = %facts.id, "effect no longer legal");
            return Ok(Outcome::Fizzled);
        }
        self.apply_effect(&effect, facts)?;
        Ok(Outcome::Applied { effect })
    }

    fn apply_effect(&mut self, effect: &Effect, facts: &CardFacts) -> Result<()> {
        match effect {
            // Presented by the caller: the hand is shown, the victim picks a secret.
            Effect::RevealHand { .. } | Effect::RevealSecret { .. } => {}
            Effect::ClearCurse { victim, card } => self.add_clear_curse(*victim, card)?,
            Effect::OngoingCurse { victim, card } => self.land_ongoing_curse(*victim, card)?,
            Effect::Swap { take, give } => {
                let (Some(thief), Some(victim)) = (facts.owner, self.stop_owner(take)?) else {
                    return Err(EngineError::invariant(format!("swap of {take} and {give} lost an owner")));
                };
                self.claim_stop(take, thief)?;
                self.claim_stop(give, victim)?;
            }
            Effect::Steal { take, thief } => {
                self.claim_stop(take, *thief)?;
            }
            Effect::Unclaim { stop } => {
                self.unclaim_stop(stop)?;
            }
            // Counters act through the negotiation unwind.
            Effect::Cancel { .. } | Effect::Reroute { .. } => {}
        }
        Ok(())
    }

    /// Land an ongoing curse whose timer starts now.
    pub(crate) fn land_ongoing_curse(&mut self, victim: TeamId, card: &DeckId) -> Result<()> {
        let record = self
            .docs
            .action(card)?
            .ok_or_else(|| EngineError::invariant(format!("curse {card} is not in the deck")))?;
        let timer = self
            .catalog()
            .action(&record.code)
            .and_then(|def| def.timer())
            .ok_or_else(|| EngineError::invariant(format!("ongoing curse {card} has no timer")))?;
        let ends_at = self.now() + timer;
        self.add_ongoing_curse(victim, card, ends_at)
    }
}
