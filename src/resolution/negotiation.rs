//! Driving a contested play to its end.

use tracing::{debug, warn};

use crate::cards::{ActionKind, CardFacts, PlayTargets, Table};
use crate::core::{DeckId, EngineError, Result, TeamId};
use crate::game::Game;
use crate::store::{DocumentStore, PendingCounter};

use super::{ChainLink, CounterResponder, Negotiation, Outcome, Play, Resolution, Response, Step};

impl<S: DocumentStore> Game<S> {
    /// Counter cards the awaited team may answer with right now.
    pub fn negotiation_options(&self, negotiation: &Negotiation) -> Result<Vec<DeckId>> {
        if negotiation.depth() >= negotiation.max_depth() {
            return Ok(Vec::new());
        }
        self.counter_options(negotiation.awaiting(), &negotiation.top().card)
    }

    /// Apply one team's response to a negotiation.
    ///
    /// Only the awaited team may respond, and only while the top card's
    /// pending record is still open. A card takes at most one counter, so a
    /// copy of the negotiation that has since been answered is stale.
    /// Anything else hands the negotiation back as `Step::Rejected`.
    #[tracing::instrument(skip(self, negotiation), fields(game = %self.id, card = %negotiation.card()))]
    pub fn respond(&mut self, negotiation: Negotiation, team: TeamId, response: Response) -> Result<Step> {
        if team != negotiation.awaiting() {
            return Ok(Step::Rejected(negotiation));
        }
        let top = negotiation.top().card.clone();
        let open = self.docs.pending(&top)?.is_some_and(|pending| pending.is_open());
        if !open {
            warn!(card = %top, "response to a negotiation that is no longer open");
            return Ok(Step::Rejected(negotiation));
        }

        let counter = match response {
            Response::Decline => {
                debug!(%team, card = %top, "declined to counter");
                return self.unwind(negotiation).map(Step::Finished);
            }
            Response::Counter(counter) => counter,
        };
        if !self.negotiation_options(&negotiation)?.contains(&counter) {
            return Ok(Step::Rejected(negotiation));
        }

        let claimed = self.docs.modify_pending(&top, |pending| {
            if !pending.is_open() {
                return false;
            }
            pending.answered_by = Some(counter.clone());
            true
        })?;
        if !claimed {
            return Ok(Step::Rejected(negotiation));
        }

        let mut negotiation = negotiation;
        let answered_by = negotiation.top().owner;
        self.use_card(&counter)?;
        negotiation.push(ChainLink {
            card: counter.clone(),
            owner: team,
            responder: answered_by,
        });
        debug!(%team, card = %counter, against = %top, depth = negotiation.depth(), "counter played");

        if self.negotiation_options(&negotiation)?.is_empty() {
            return self.unwind(negotiation).map(Step::Finished);
        }
        self.open_pending(&counter, answered_by)?;
        Ok(Step::Waiting(negotiation))
    }

    /// Settle the chain from the top down.
    ///
    /// The top card stands. A standing card nullifies the card beneath it,
    /// so link `i` of `n` stands exactly when `n - i` is even.
    fn unwind(&mut self, negotiation: Negotiation) -> Result<Resolution> {
        let chain = negotiation.chain();
        let top = chain.len() - 1;

        for (i, link) in chain.iter().enumerate() {
            let stands = (top - i) % 2 == 0;
            let countered_by = chain.get(i + 1).filter(|_| !stands).map(|above| above.card.clone());
            self.close_pending(&link.card, countered_by)?;
        }

        let opening = &chain[0];
        let outcome = if top % 2 == 0 {
            let facts = self.facts_of(&opening.card)?;
            self.apply(&facts, negotiation.targets())?
        } else {
            let answer = &chain[1];
            match self.facts_of(&answer.card)?.kind {
                ActionKind::Rerouted => self.reroute(opening)?,
                _ => Outcome::Countered {
                    by: answer.card.clone(),
                },
            }
        };

        debug!(card = %opening.card, depth = top, ?outcome, "negotiation settled");
        Ok(Resolution {
            card: opening.card.clone(),
            outcome,
            chain: chain.iter().map(|link| link.card.clone()).collect(),
        })
    }

    /// Expire a card's pending record, noting what countered it.
    fn close_pending(&mut self, card: &DeckId, countered_by: Option<DeckId>) -> Result<()> {
        if self.docs.pending(card)?.is_none() {
            return Ok(());
        }
        self.docs.modify_pending(card, |pending: &mut PendingCounter| {
            pending.expired = true;
            if countered_by.is_some() {
                pending.countered_by = countered_by;
            }
        })
    }

    /// Land a rerouted curse on the team that played it.
    fn reroute(&mut self, curse: &ChainLink) -> Result<Outcome> {
        let facts = self.facts_of(&curse.card)?;
        if self.curse_immune(curse.owner)? {
            debug!(card = %curse.card, team = %curse.owner, "rerouted curse fizzled on immunity");
            return Ok(Outcome::Fizzled);
        }
        match facts.kind {
            ActionKind::ClearCurse => self.add_clear_curse(curse.owner, &curse.card)?,
            ActionKind::OngoingCurse => self.land_ongoing_curse(curse.owner, &curse.card)?,
            other => {
                return Err(EngineError::invariant(format!("rerouted a {other} card {}", curse.card)));
            }
        }
        Ok(Outcome::Rerouted { onto: curse.owner })
    }

    fn facts_of(&self, card: &DeckId) -> Result<CardFacts> {
        self.card_facts(card)?
            .ok_or_else(|| EngineError::invariant(format!("card {card} vanished mid-negotiation")))
    }

    /// Play a card and settle any negotiation on the spot, asking
    /// `responder` for each answer.
    ///
    /// Never returns `Play::Contested`. An illegal answer counts as a decline.
    pub fn play_with<R: CounterResponder>(&mut self, card: &DeckId, targets: &PlayTargets, responder: &mut R) -> Result<Play> {
        let mut negotiation = match self.play_action(card, targets)? {
            Play::Contested(negotiation) => negotiation,
            settled => return Ok(settled),
        };
        loop {
            let team = negotiation.awaiting();
            let options = self.negotiation_options(&negotiation)?;
            let response = responder.respond(team, &negotiation.top().card, &options);
            negotiation = match self.respond(negotiation, team, response)? {
                Step::Waiting(next) => next,
                Step::Finished(resolution) => return Ok(Play::Resolved(resolution)),
                Step::Rejected(same) => match self.respond(same, team, Response::Decline)? {
                    Step::Finished(resolution) => return Ok(Play::Resolved(resolution)),
                    Step::Waiting(_) | Step::Rejected(_) => {
                        return Err(EngineError::invariant(format!("negotiation over {card} would not settle")));
                    }
                },
            };
        }
    }
}
