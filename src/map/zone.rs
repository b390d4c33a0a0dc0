//! Zone decks.
//!
//! Each zone's starting deck is instantiated once per game as live cards.
//! A zone's deck is whatever of those cards is neither dealt nor reserved.

use tracing::debug;

use crate::catalog::Special;
use crate::core::{DeckId, Result, TeamId, ZoneNumber};
use crate::game::Game;
use crate::store::{ActionRecord, DocumentKind, DocumentStore, ExpectedVersion};

use super::Reward;

impl<S: DocumentStore> Game<S> {
    /// Create live cards for every zone's starting deck.
    ///
    /// The `k`th copy of a code in a zone gets the deck id `CODE-zone-k`.
    pub(crate) fn create_decks(&mut self) -> Result<()> {
        let catalog = self.shared_catalog();
        let mut deck = Vec::new();

        for zone in ZoneNumber::all() {
            let codes = catalog.start_deck(zone);
            for (i, code) in codes.iter().enumerate() {
                let copy = codes[..i].iter().filter(|c| *c == code).count() + 1;
                let id = DeckId::for_card(code, zone, copy);
                self.docs.save(
                    DocumentKind::Action,
                    id.as_str(),
                    &ActionRecord::new(code.clone(), zone),
                    ExpectedVersion::Any,
                )?;
                self.docs.clear(DocumentKind::PendingCounter, id.as_str())?;
                deck.push(id);
            }
        }

        debug!(game = %self.id, cards = deck.len(), "zone decks created");
        self.docs.modify_meta(|meta| meta.deck = deck)
    }

    /// Every live card in the game, in deck order.
    pub fn all_cards(&self) -> Result<Vec<DeckId>> {
        Ok(self.docs.meta()?.deck)
    }

    /// Cards of `zone` still available to be dealt.
    pub fn zone_deck(&self, zone: ZoneNumber) -> Result<Vec<DeckId>> {
        let mut out = Vec::new();
        for id in self.all_cards()? {
            if let Some(record) = self.docs.action(&id)? {
                if record.zone == zone && record.in_deck() {
                    out.push(id);
                }
            }
        }
        Ok(out)
    }

    /// Deal a reward from `zone`'s deck.
    ///
    /// A team holding reward-choice gets several cards reserved to pick from;
    /// anyone else is dealt one card at random. `None` if the deck is empty.
    pub fn deal_action(&mut self, team: TeamId, zone: ZoneNumber) -> Result<Option<Reward>> {
        let deck = self.zone_deck(zone)?;
        if deck.is_empty() {
            return Ok(None);
        }
        let choice = self
            .docs
            .team(team)?
            .is_some_and(|record| record.has_special(Special::RewardChoice));

        if choice {
            let count = self.config().reward_choice_count;
            let options = self.rng.sample(&deck, count);
            for id in &options {
                self.reserve_card(id, team)?;
            }
            Ok(Some(Reward::Choice(options)))
        } else {
            let Some(id) = self.rng.choose(&deck).cloned() else {
                return Ok(None);
            };
            self.deal_card(&id, team)?;
            Ok(Some(Reward::Action(id)))
        }
    }
}
