//! Shared fixtures for the integration tests.
//!
//! The fixture map has four lines over fourteen stops:
//!
//! ```text
//! blue:   B1 (1)  BY (1/2)  B2 (2)  BX (2/3)  B3 (3)
//! green:  G1 (1)  G2 (2)  G3 (3)
//! red:    R1 (1)  R2 (2)  R3 (3)
//! yellow: Y2 (2)  Y3 (3)  Y4 (4)
//! ```
//!
//! Every stop has one challenge, `C` followed by the stop code.

#![allow(dead_code)]

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tramopoly::{
    Catalog, ChallengeId, DeckId, Engine, EngineConfig, Game, LineColour, ManualClock, MemoryStore, StopCode, TeamId,
};

pub const CATALOG: &str = r#"{
    "lines": [
        {"colour": "blue", "hex": "0000ff", "emoji": "🔵"},
        {"colour": "green", "hex": "00ff00", "emoji": "🟢"},
        {"colour": "red", "hex": "ff0000", "emoji": "🔴"},
        {"colour": "yellow", "hex": "ffff00", "emoji": "🟡"}
    ],
    "challenges": [
        {"id": "CB1", "title": "Sing a Song"},
        {"id": "CBY", "title": "Count the Trams"},
        {"id": "CB2", "title": "Quick Sketch", "veto_minutes": 5},
        {"id": "CBX", "title": "Find a Bench"},
        {"id": "CB3", "title": "Paper Plane"},
        {"id": "CG1", "title": "Green Thing"},
        {"id": "CG2", "title": "Hum a Tune"},
        {"id": "CG3", "title": "Odd Socks"},
        {"id": "CR1", "title": "Red Door"},
        {"id": "CR2", "title": "Tall Tale"},
        {"id": "CR3", "title": "Three Steps"},
        {"id": "CY2", "title": "Yellow Sign"},
        {"id": "CY3", "title": "Lamp Post"},
        {"id": "CY4", "title": "Last Stop"}
    ],
    "stops": [
        {"code": "B1", "name": "Blue One", "zone": 1, "lines": ["blue"], "challenges": ["CB1"]},
        {"code": "BY", "name": "Blue Junction", "zone": 1, "border": true, "lines": ["blue"], "challenges": ["CBY"]},
        {"code": "B2", "name": "Blue Two", "zone": 2, "lines": ["blue"], "challenges": ["CB2"]},
        {"code": "BX", "name": "Blue Cross", "zone": 2, "border": true, "lines": ["blue"], "challenges": ["CBX"]},
        {"code": "B3", "name": "Blue Three", "zone": 3, "lines": ["blue"], "challenges": ["CB3"]},
        {"code": "G1", "name": "Green One", "zone": 1, "lines": ["green"], "challenges": ["CG1"]},
        {"code": "G2", "name": "Green Two", "zone": 2, "lines": ["green"], "challenges": ["CG2"]},
        {"code": "G3", "name": "Green Three", "zone": 3, "lines": ["green"], "challenges": ["CG3"]},
        {"code": "R1", "name": "Red One", "zone": 1, "lines": ["red"], "challenges": ["CR1"]},
        {"code": "R2", "name": "Red Two", "zone": 2, "lines": ["red"], "challenges": ["CR2"]},
        {"code": "R3", "name": "Red Three", "zone": 3, "lines": ["red"], "challenges": ["CR3"]},
        {"code": "Y2", "name": "Yellow Two", "zone": 2, "lines": ["yellow"], "challenges": ["CY2"]},
        {"code": "Y3", "name": "Yellow Three", "zone": 3, "lines": ["yellow"], "challenges": ["CY3"]},
        {"code": "Y4", "name": "Yellow Four", "zone": 4, "lines": ["yellow"], "challenges": ["CY4"]}
    ],
    "actions": [
        {"code": "ANNOUNCEMENT", "title": "Announcement", "tagline": "Show us your hand"},
        {"code": "TICKETINSPECTION", "title": "Ticket Inspection"},
        {"code": "INTERCHANGE", "title": "Interchange"},
        {"code": "RAILROADED", "title": "Railroaded"},
        {"code": "DERAILMENT", "title": "Derailment"},
        {"code": "CANCELLED", "title": "Cancelled"},
        {"code": "REROUTED", "title": "Rerouted"},
        {"code": "CURSE-CLEAR-SING", "title": "Sing"},
        {"code": "CURSE-ONGOING-HOP", "title": "Hop", "timer_minutes": 20}
    ],
    "specials": [
        {"code": "IMMUNITY", "title": "Immunity"},
        {"code": "REWARDCHOICE", "title": "Reward Choice"},
        {"code": "DONATION", "title": "Donation"},
        {"code": "DROPSECRETS", "title": "Drop Secrets"},
        {"code": "ADDSECRETS", "title": "Add Secrets"}
    ],
    "start_decks": [
        {"zone": 1, "cards": ["CANCELLED", "CANCELLED", "RAILROADED", "CURSE-CLEAR-SING", "ANNOUNCEMENT"]},
        {"zone": 2, "cards": ["REROUTED", "DERAILMENT", "INTERCHANGE", "CURSE-ONGOING-HOP", "TICKETINSPECTION", "CANCELLED"]},
        {"zone": 3, "cards": ["CANCELLED", "DERAILMENT"]},
        {"zone": 4, "cards": ["CANCELLED"]}
    ],
    "rewards": [
        "B2",
        {"type": "special", "stop": "G2", "code": "IMMUNITY"},
        {"type": "choice", "count": 1, "parts": ["R1", "R2"]}
    ],
    "search": {
        "Blue One": "B1",
        "green two": "G2"
    }
}"#;

/// Cards in the fixture deck.
pub const DECK_SIZE: usize = 14;

/// A game with two teams and a hand-driven clock.
pub struct Fixture {
    pub game: Game<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub red: TeamId,
    pub blue: TeamId,
}

pub fn catalog() -> Catalog {
    Catalog::from_json(CATALOG).unwrap()
}

pub fn fixture() -> Fixture {
    fixture_with(catalog(), EngineConfig::default())
}

/// Route engine logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture_with(catalog: Catalog, config: EngineConfig) -> Fixture {
    init_tracing();
    let clock = Arc::new(ManualClock::default());
    let engine = Engine::new(catalog).with_config(config).with_clock(clock.clone());
    let mut game = engine.create_game(MemoryStore::new(), 7).unwrap();
    let red = game.add_team("Red Team", "red").unwrap();
    let blue = game.add_team("Team Blue", "blue").unwrap();
    Fixture { game, clock, red, blue }
}

pub fn stop(code: &str) -> StopCode {
    StopCode::new(code)
}

pub fn stops(codes: &[&str]) -> Vec<StopCode> {
    codes.iter().map(|code| stop(code)).collect()
}

pub fn line(colour: &str) -> LineColour {
    LineColour::new(colour)
}

pub fn card(id: &str) -> DeckId {
    DeckId::new(id)
}

pub fn challenge(id: &str) -> ChallengeId {
    ChallengeId::new(id)
}

/// Put a card straight into `team`'s hand.
pub fn give(game: &mut Game<MemoryStore>, id: &str, team: TeamId) {
    game.documents_mut()
        .modify_action(&card(id), |record| {
            record.dealt = true;
            record.owner = Some(team);
        })
        .unwrap();
}

/// Claim each stop for `team`.
pub fn claim_all(game: &mut Game<MemoryStore>, team: TeamId, codes: &[&str]) {
    for code in codes {
        game.claim_stop(&stop(code), team).unwrap();
    }
}

/// Claim three stops and lock them into `colour`.
pub fn lock_line(game: &mut Game<MemoryStore>, team: TeamId, colour: &str, codes: &[&str]) {
    claim_all(game, team, codes);
    assert!(game.claim_line(team, &line(colour), &stops(codes)).unwrap());
}
