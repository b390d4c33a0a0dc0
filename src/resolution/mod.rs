//! Playing cards and negotiating counters.
//!
//! ## Protocol
//!
//! `play_action` checks the card and its targets, marks the card used and
//! asks whether the victim holds any counter that could answer it. If not,
//! the effect applies at once (`Play::Resolved`). Otherwise a pending-counter
//! record is written and the caller gets a `Negotiation` to drive.
//!
//! A negotiation is a stack of cards. The team at the top of the stack either
//! declines or answers with a counter card, which pushes it and hands the
//! turn to the player of the card it answered. The loop ends when someone
//! declines or a counter arrives that its target cannot answer, and the stack
//! then unwinds from the top: the top card stands, and every standing card
//! nullifies the one beneath it. The original card is countered exactly when
//! the stack holds an odd number of counters.
//!
//! A reroute that stands does not just nullify the curse beneath it: the curse
//! lands on its own player instead, with its timer starting at that moment.
//!
//! ## Bounds
//!
//! Counter cards are used up as they are played, so a negotiation can never
//! grow past the counters the two teams held when it opened. That bound is
//! computed up front and stored as `max_depth`.

pub mod negotiation;
pub mod play;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Effect, PlayTargets};
use crate::core::{DeckId, TeamId};

/// Result of trying to play a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Play {
    /// The card or its targets are not playable. Nothing changed.
    Rejected,
    /// An earlier resolution of this card is still completing.
    Retry,
    /// Nobody could counter; the effect has been applied.
    Resolved(Resolution),
    /// The victim may counter; drive the negotiation to finish the play.
    Contested(Negotiation),
}

/// How a play ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The card that opened the play.
    pub card: DeckId,
    pub outcome: Outcome,
    /// Every card played, from the opening card to the last counter.
    pub chain: Vec<DeckId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The card took effect.
    Applied { effect: Effect },
    /// The card was nullified by a standing counter.
    Countered { by: DeckId },
    /// The curse was turned back onto its own player.
    Rerouted { onto: TeamId },
    /// The card stood, but by the time it resolved its effect was no longer
    /// legal (a stop changed hands, the victim became immune).
    Fizzled,
}

/// One card in a negotiation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub card: DeckId,
    pub owner: TeamId,
    /// The team that may answer this card.
    pub responder: TeamId,
}

/// A contested play waiting on a response.
///
/// Holds no state the store does not also have; it can be serialized and
/// parked while the caller waits on a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiation {
    targets: PlayTargets,
    chain: SmallVec<[ChainLink; 4]>,
    max_depth: usize,
}

impl Negotiation {
    pub(crate) fn new(opening: ChainLink, targets: PlayTargets, max_depth: usize) -> Self {
        let mut chain = SmallVec::new();
        chain.push(opening);
        Self {
            targets,
            chain,
            max_depth,
        }
    }

    /// The card that opened the play.
    #[must_use]
    pub fn card(&self) -> &DeckId {
        &self.chain[0].card
    }

    #[must_use]
    pub fn targets(&self) -> &PlayTargets {
        &self.targets
    }

    /// The card currently waiting for an answer.
    #[must_use]
    pub fn top(&self) -> &ChainLink {
        &self.chain[self.chain.len() - 1]
    }

    /// The team whose response is awaited.
    #[must_use]
    pub fn awaiting(&self) -> TeamId {
        self.top().responder
    }

    #[must_use]
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    /// Counters played so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len() - 1
    }

    /// Most counters this negotiation can hold.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn push(&mut self, link: ChainLink) {
        self.chain.push(link);
    }
}

/// A team's answer to the card at the top of a negotiation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Let the card stand. Also the answer when a player times out.
    Decline,
    /// Answer with a counter card from the hand.
    Counter(DeckId),
}

/// What a response led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The counter was played and can itself be answered.
    Waiting(Negotiation),
    Finished(Resolution),
    /// The response was not legal or not expected; the negotiation is
    /// returned unchanged.
    Rejected(Negotiation),
}

/// Chooses responses while `play_with` drives a negotiation.
pub trait CounterResponder {
    /// Pick a response for `team`, who may answer `against` with one of
    /// `options`.
    fn respond(&mut self, team: TeamId, against: &DeckId, options: &[DeckId]) -> Response;
}

impl<F> CounterResponder for F
where
    F: FnMut(TeamId, &DeckId, &[DeckId]) -> Response,
{
    fn respond(&mut self, team: TeamId, against: &DeckId, options: &[DeckId]) -> Response {
        self(team, against, options)
    }
}

/// Most counters a negotiation can hold when the responder starts with
/// `responder` counters and the player with `player` counters.
///
/// Answers alternate starting with the responder, so the shorter side runs
/// out first.
#[must_use]
pub fn negotiation_bound(responder: usize, player: usize) -> usize {
    if responder <= player {
        2 * responder
    } else {
        2 * player + 1
    }
}
