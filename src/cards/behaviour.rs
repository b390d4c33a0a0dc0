//! Per-variant card rules.
//!
//! Each of the nine card kinds implements `ActionBehaviour`: who it may be
//! played against, which concrete targets are legal, whom those targets make
//! the victim, and the effect it has once it resolves. `ActionKind` dispatches
//! to the right implementation with a plain `match`.
//!
//! ## Reading the table
//!
//! Behaviours never touch the store directly. They ask a `Table` for the few
//! facts they need (stop ownership, curse immunity, card owners), so the rules
//! can be exercised against a fake table in tests.

use serde::{Deserialize, Serialize};

use crate::core::{DeckId, Result, StopCode, TeamId, ZoneNumber};

use super::ActionKind;

/// Live facts about one stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopFacts {
    pub owner: Option<TeamId>,
    pub locked: bool,
}

/// Live facts about one card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFacts {
    pub id: DeckId,
    pub kind: ActionKind,
    pub owner: Option<TeamId>,
    pub zone: ZoneNumber,
}

impl CardFacts {
    /// Whether `team` is someone other than this card's owner.
    ///
    /// An unowned card is never playable, so this is `false` for it.
    #[must_use]
    pub fn is_rival(&self, team: TeamId) -> bool {
        self.owner.is_some_and(|owner| owner != team)
    }
}

/// Read access to the game state card rules depend on.
pub trait Table {
    fn stop_facts(&self, code: &StopCode) -> Result<Option<StopFacts>>;
    fn curse_immune(&self, team: TeamId) -> Result<bool>;
    fn unlocked_stop_count(&self, team: TeamId) -> Result<usize>;
    fn claimed_stop_count(&self, team: TeamId) -> Result<usize>;
    fn card_facts(&self, card: &DeckId) -> Result<Option<CardFacts>>;
}

/// What a card is aimed at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum PlayTargets {
    /// A whole team: spy cards and curses.
    Team { victim: TeamId },
    /// A rival's stop to take. `give` is the player's own stop offered in
    /// exchange; it may be left out while only previewing the target.
    Swap { take: StopCode, give: Option<StopCode> },
    /// A rival's unlocked stop to take outright.
    Steal { take: StopCode },
    /// A claimed stop to knock back to unclaimed.
    Unclaim { stop: StopCode },
    /// Another card in flight.
    Card { card: DeckId },
}

/// The state change a resolved card makes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// The victim's hand is shown to the player. Presentation is external.
    RevealHand { victim: TeamId },
    /// The victim reveals one secret of their choosing.
    RevealSecret { victim: TeamId },
    ClearCurse { victim: TeamId, card: DeckId },
    OngoingCurse { victim: TeamId, card: DeckId },
    /// The two stops change hands.
    Swap { take: StopCode, give: StopCode },
    Steal { take: StopCode, thief: TeamId },
    Unclaim { stop: StopCode },
    /// Nullify the target card.
    Cancel { target: DeckId },
    /// Nullify the target curse and land it on its own player instead.
    Reroute { curse: DeckId },
}

/// Rules of one card kind.
pub trait ActionBehaviour {
    /// Whether the card may be aimed at `victim` at all.
    fn playable_against<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, victim: TeamId) -> Result<bool>;

    /// Whether the concrete `targets` are legal.
    fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool>;

    /// The team that gets to respond to the play.
    fn victim<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>>;

    /// The effect, or `None` if `targets` has the wrong shape for this kind.
    fn effect(&self, card: &CardFacts, targets: &PlayTargets) -> Option<Effect>;
}

fn stop_owner<T: Table + ?Sized>(table: &T, code: &StopCode) -> Result<Option<TeamId>> {
    Ok(table.stop_facts(code)?.and_then(|facts| facts.owner))
}

fn card_owner<T: Table + ?Sized>(table: &T, card: &DeckId) -> Result<Option<TeamId>> {
    Ok(table.card_facts(card)?.and_then(|facts| facts.owner))
}

/// Rules shared by cards aimed at a whole team.
macro_rules! team_targeted {
    ($name:ident, $doc:literal, |$card:ident, $victim:ident| $effect:expr, curse = $curse:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl ActionBehaviour for $name {
            fn playable_against<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
                if !card.is_rival(victim) {
                    return Ok(false);
                }
                Ok(!$curse || !table.curse_immune(victim)?)
            }

            fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
                match targets {
                    PlayTargets::Team { victim } => self.playable_against(table, card, *victim),
                    _ => Ok(false),
                }
            }

            fn victim<T: Table + ?Sized>(&self, _table: &T, _card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
                Ok(match targets {
                    PlayTargets::Team { victim } => Some(*victim),
                    _ => None,
                })
            }

            fn effect(&self, $card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
                match targets {
                    PlayTargets::Team { victim: $victim } => {
                        let $victim = *$victim;
                        Some($effect)
                    }
                    _ => None,
                }
            }
        }
    };
}

team_targeted!(
    Announcement,
    "Reveals the victim's hand.",
    |_card, victim| Effect::RevealHand { victim },
    curse = false
);
team_targeted!(
    TicketInspection,
    "Makes the victim reveal a secret.",
    |_card, victim| Effect::RevealSecret { victim },
    curse = false
);
team_targeted!(
    ClearCurse,
    "A curse that holds the victim back until cleared.",
    |card, victim| Effect::ClearCurse { victim, card: card.id.clone() },
    curse = true
);
team_targeted!(
    OngoingCurse,
    "A curse that lapses on its own.",
    |card, victim| Effect::OngoingCurse { victim, card: card.id.clone() },
    curse = true
);

/// Swap one of the player's unlocked stops for a rival's.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interchange;

impl ActionBehaviour for Interchange {
    fn playable_against<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
        let Some(owner) = card.owner.filter(|_| card.is_rival(victim)) else {
            return Ok(false);
        };
        Ok(table.unlocked_stop_count(owner)? >= 1 && table.unlocked_stop_count(victim)? >= 1)
    }

    fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
        let PlayTargets::Swap { take, give } = targets else {
            return Ok(false);
        };
        let (Some(owner), Some(taken)) = (card.owner, table.stop_facts(take)?) else {
            return Ok(false);
        };
        if taken.locked || !taken.owner.is_some_and(|victim| victim != owner) {
            return Ok(false);
        }
        match give {
            Some(give) => Ok(table
                .stop_facts(give)?
                .is_some_and(|given| given.owner == Some(owner) && !given.locked)),
            None => Ok(table.unlocked_stop_count(owner)? >= 1),
        }
    }

    fn victim<T: Table + ?Sized>(&self, table: &T, _card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
        match targets {
            PlayTargets::Swap { take, .. } => stop_owner(table, take),
            _ => Ok(None),
        }
    }

    fn effect(&self, _card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
        match targets {
            PlayTargets::Swap { take, give: Some(give) } => Some(Effect::Swap {
                take: take.clone(),
                give: give.clone(),
            }),
            _ => None,
        }
    }
}

/// Take a rival's unlocked stop.
#[derive(Clone, Copy, Debug, Default)]
pub struct Railroaded;

impl ActionBehaviour for Railroaded {
    fn playable_against<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
        Ok(card.is_rival(victim) && table.unlocked_stop_count(victim)? >= 1)
    }

    fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
        let PlayTargets::Steal { take } = targets else {
            return Ok(false);
        };
        Ok(table
            .stop_facts(take)?
            .is_some_and(|stop| !stop.locked && stop.owner.is_some_and(|victim| card.is_rival(victim))))
    }

    fn victim<T: Table + ?Sized>(&self, table: &T, _card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
        match targets {
            PlayTargets::Steal { take } => stop_owner(table, take),
            _ => Ok(None),
        }
    }

    fn effect(&self, card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
        match (targets, card.owner) {
            (PlayTargets::Steal { take }, Some(thief)) => Some(Effect::Steal {
                take: take.clone(),
                thief,
            }),
            _ => None,
        }
    }
}

/// Knock a rival's stop back to unclaimed, breaking any line it is locked in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Derailment;

impl ActionBehaviour for Derailment {
    fn playable_against<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
        Ok(card.is_rival(victim) && table.claimed_stop_count(victim)? >= 1)
    }

    fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
        let PlayTargets::Unclaim { stop } = targets else {
            return Ok(false);
        };
        Ok(stop_owner(table, stop)?.is_some_and(|victim| card.is_rival(victim)))
    }

    fn victim<T: Table + ?Sized>(&self, table: &T, _card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
        match targets {
            PlayTargets::Unclaim { stop } => stop_owner(table, stop),
            _ => Ok(None),
        }
    }

    fn effect(&self, _card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
        match targets {
            PlayTargets::Unclaim { stop } => Some(Effect::Unclaim { stop: stop.clone() }),
            _ => None,
        }
    }
}

/// Counter a rival's non-curse card from the same zone or a lower one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cancelled;

impl ActionBehaviour for Cancelled {
    fn playable_against<T: Table + ?Sized>(&self, _table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
        Ok(card.is_rival(victim))
    }

    fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
        let PlayTargets::Card { card: target } = targets else {
            return Ok(false);
        };
        Ok(table.card_facts(target)?.is_some_and(|target| {
            target.owner.is_some_and(|owner| card.is_rival(owner)) && !target.kind.is_curse() && target.zone <= card.zone
        }))
    }

    fn victim<T: Table + ?Sized>(&self, table: &T, _card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
        match targets {
            PlayTargets::Card { card } => card_owner(table, card),
            _ => Ok(None),
        }
    }

    fn effect(&self, _card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
        match targets {
            PlayTargets::Card { card } => Some(Effect::Cancel { target: card.clone() }),
            _ => None,
        }
    }
}

/// Send a rival's curse back onto its player.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rerouted;

impl ActionBehaviour for Rerouted {
    fn playable_against<T: Table + ?Sized>(&self, _table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
        Ok(card.is_rival(victim))
    }

    fn playable_specific<T: Table + ?Sized>(&self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
        let PlayTargets::Card { card: target } = targets else {
            return Ok(false);
        };
        Ok(table
            .card_facts(target)?
            .is_some_and(|target| target.kind.is_curse() && target.owner.is_some_and(|owner| card.is_rival(owner))))
    }

    fn victim<T: Table + ?Sized>(&self, table: &T, _card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
        match targets {
            PlayTargets::Card { card } => card_owner(table, card),
            _ => Ok(None),
        }
    }

    fn effect(&self, _card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
        match targets {
            PlayTargets::Card { card } => Some(Effect::Reroute { curse: card.clone() }),
            _ => None,
        }
    }
}

macro_rules! dispatch {
    ($kind:expr, $b:ident => $call:expr) => {
        match $kind {
            ActionKind::Announcement => { let $b = Announcement; $call }
            ActionKind::TicketInspection => { let $b = TicketInspection; $call }
            ActionKind::ClearCurse => { let $b = ClearCurse; $call }
            ActionKind::OngoingCurse => { let $b = OngoingCurse; $call }
            ActionKind::Interchange => { let $b = Interchange; $call }
            ActionKind::Railroaded => { let $b = Railroaded; $call }
            ActionKind::Derailment => { let $b = Derailment; $call }
            ActionKind::Cancelled => { let $b = Cancelled; $call }
            ActionKind::Rerouted => { let $b = Rerouted; $call }
        }
    };
}

impl ActionKind {
    pub fn playable_against<T: Table + ?Sized>(self, table: &T, card: &CardFacts, victim: TeamId) -> Result<bool> {
        dispatch!(self, b => b.playable_against(table, card, victim))
    }

    pub fn playable_specific<T: Table + ?Sized>(self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<bool> {
        dispatch!(self, b => b.playable_specific(table, card, targets))
    }

    pub fn victim<T: Table + ?Sized>(self, table: &T, card: &CardFacts, targets: &PlayTargets) -> Result<Option<TeamId>> {
        dispatch!(self, b => b.victim(table, card, targets))
    }

    #[must_use]
    pub fn effect(self, card: &CardFacts, targets: &PlayTargets) -> Option<Effect> {
        dispatch!(self, b => b.effect(card, targets))
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use super::*;

    const RED: TeamId = TeamId(0);
    const BLUE: TeamId = TeamId(1);

    #[derive(Default)]
    struct FakeTable {
        stops: FxHashMap<StopCode, StopFacts>,
        cards: FxHashMap<DeckId, CardFacts>,
        immune: Vec<TeamId>,
    }

    impl FakeTable {
        fn with_stop(mut self, code: &str, owner: Option<TeamId>, locked: bool) -> Self {
            self.stops.insert(StopCode::new(code), StopFacts { owner, locked });
            self
        }

        fn with_card(mut self, card: CardFacts) -> Self {
            self.cards.insert(card.id.clone(), card);
            self
        }

        fn count(&self, team: TeamId, unlocked_only: bool) -> usize {
            self.stops
                .values()
                .filter(|stop| stop.owner == Some(team) && !(unlocked_only && stop.locked))
                .count()
        }
    }

    impl Table for FakeTable {
        fn stop_facts(&self, code: &StopCode) -> Result<Option<StopFacts>> {
            Ok(self.stops.get(code).copied())
        }

        fn curse_immune(&self, team: TeamId) -> Result<bool> {
            Ok(self.immune.contains(&team))
        }

        fn unlocked_stop_count(&self, team: TeamId) -> Result<usize> {
            Ok(self.count(team, true))
        }

        fn claimed_stop_count(&self, team: TeamId) -> Result<usize> {
            Ok(self.count(team, false))
        }

        fn card_facts(&self, card: &DeckId) -> Result<Option<CardFacts>> {
            Ok(self.cards.get(card).cloned())
        }
    }

    fn card(id: &str, kind: ActionKind, owner: TeamId, zone: u8) -> CardFacts {
        CardFacts {
            id: DeckId::new(id),
            kind,
            owner: Some(owner),
            zone: ZoneNumber::new(zone),
        }
    }

    #[test]
    fn test_spy_cards_need_a_rival() {
        let table = FakeTable::default();
        let spy = card("ANNOUNCEMENT-1-1", ActionKind::Announcement, RED, 1);

        assert!(spy.kind.playable_against(&table, &spy, BLUE).unwrap());
        assert!(!spy.kind.playable_against(&table, &spy, RED).unwrap());
        assert_eq!(
            spy.kind.effect(&spy, &PlayTargets::Team { victim: BLUE }),
            Some(Effect::RevealHand { victim: BLUE })
        );
    }

    #[test]
    fn test_immunity_blocks_curses_only() {
        let table = FakeTable {
            immune: vec![BLUE],
            ..FakeTable::default()
        };
        let curse = card("CURSE-CLEAR-SING-1-1", ActionKind::ClearCurse, RED, 1);
        let spy = card("TICKETINSPECTION-1-1", ActionKind::TicketInspection, RED, 1);

        assert!(!curse.kind.playable_against(&table, &curse, BLUE).unwrap());
        assert!(spy.kind.playable_against(&table, &spy, BLUE).unwrap());
    }

    #[test]
    fn test_railroaded_needs_unlocked_rival_stop() {
        let table = FakeTable::default()
            .with_stop("SPS", Some(BLUE), false)
            .with_stop("PIC", Some(BLUE), true)
            .with_stop("ALT", Some(RED), false);
        let steal = card("RAILROADED-2-1", ActionKind::Railroaded, RED, 2);
        let take = |code: &str| PlayTargets::Steal { take: StopCode::new(code) };

        assert!(steal.kind.playable_specific(&table, &steal, &take("SPS")).unwrap());
        assert!(!steal.kind.playable_specific(&table, &steal, &take("PIC")).unwrap());
        assert!(!steal.kind.playable_specific(&table, &steal, &take("ALT")).unwrap());
        assert_eq!(steal.kind.victim(&table, &steal, &take("SPS")).unwrap(), Some(BLUE));
    }

    #[test]
    fn test_interchange_gives_own_stop() {
        let table = FakeTable::default()
            .with_stop("SPS", Some(BLUE), false)
            .with_stop("ALT", Some(RED), false)
            .with_stop("CNK", Some(RED), true);
        let swap = card("INTERCHANGE-2-1", ActionKind::Interchange, RED, 2);
        let targets = |give: Option<&str>| PlayTargets::Swap {
            take: StopCode::new("SPS"),
            give: give.map(StopCode::new),
        };

        assert!(swap.kind.playable_against(&table, &swap, BLUE).unwrap());
        assert!(swap.kind.playable_specific(&table, &swap, &targets(None)).unwrap());
        assert!(swap.kind.playable_specific(&table, &swap, &targets(Some("ALT"))).unwrap());
        assert!(!swap.kind.playable_specific(&table, &swap, &targets(Some("CNK"))).unwrap());
        assert!(!swap.kind.playable_specific(&table, &swap, &targets(Some("SPS"))).unwrap());
        assert_eq!(swap.kind.effect(&swap, &targets(None)), None);
    }

    #[test]
    fn test_derailment_may_hit_locked_stops() {
        let table = FakeTable::default().with_stop("SPS", Some(BLUE), true);
        let trap = card("DERAILMENT-3-1", ActionKind::Derailment, RED, 3);
        let targets = PlayTargets::Unclaim { stop: StopCode::new("SPS") };

        assert!(trap.kind.playable_specific(&table, &trap, &targets).unwrap());
        assert!(!trap
            .kind
            .playable_specific(&table, &trap, &PlayTargets::Steal { take: StopCode::new("SPS") })
            .unwrap());
    }

    #[test]
    fn test_cancelled_respects_zone_and_curses() {
        let low = card("RAILROADED-1-1", ActionKind::Railroaded, BLUE, 1);
        let high = card("RAILROADED-3-1", ActionKind::Railroaded, BLUE, 3);
        let curse = card("CURSE-CLEAR-SING-1-1", ActionKind::ClearCurse, BLUE, 1);
        let table = FakeTable::default()
            .with_card(low.clone())
            .with_card(high.clone())
            .with_card(curse.clone());
        let cancel = card("CANCELLED-2-1", ActionKind::Cancelled, RED, 2);
        let at = |target: &CardFacts| PlayTargets::Card { card: target.id.clone() };

        assert!(cancel.kind.playable_specific(&table, &cancel, &at(&low)).unwrap());
        assert!(!cancel.kind.playable_specific(&table, &cancel, &at(&high)).unwrap());
        assert!(!cancel.kind.playable_specific(&table, &cancel, &at(&curse)).unwrap());
    }

    #[test]
    fn test_rerouted_only_hits_curses() {
        let curse = card("CURSE-ONGOING-HOP-1-1", ActionKind::OngoingCurse, BLUE, 4);
        let steal = card("RAILROADED-1-1", ActionKind::Railroaded, BLUE, 1);
        let table = FakeTable::default().with_card(curse.clone()).with_card(steal.clone());
        let reroute = card("REROUTED-1-1", ActionKind::Rerouted, RED, 1);

        let at_curse = PlayTargets::Card { card: curse.id.clone() };
        assert!(reroute.kind.playable_specific(&table, &reroute, &at_curse).unwrap());
        assert!(!reroute
            .kind
            .playable_specific(&table, &reroute, &PlayTargets::Card { card: steal.id.clone() })
            .unwrap());
        assert_eq!(
            reroute.kind.effect(&reroute, &at_curse),
            Some(Effect::Reroute { curse: curse.id.clone() })
        );
    }

    #[test]
    fn test_unowned_card_is_never_playable() {
        let table = FakeTable::default();
        let stray = CardFacts {
            owner: None,
            ..card("ANNOUNCEMENT-1-1", ActionKind::Announcement, RED, 1)
        };
        assert!(!stray.kind.playable_against(&table, &stray, BLUE).unwrap());
    }
}
