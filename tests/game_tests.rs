//! Game lifecycle integration tests.
//!
//! These tests cover game creation, reward placement, secrets and the
//! specials that move them, start and reset, and win detection.

mod common;

use std::sync::Arc;

use chrono::Duration;
use common::*;
use tramopoly::store::TeamRecord;
use tramopoly::{
    DocumentKind, Engine, EngineConfig, EngineError, ExpectedVersion, GameId, ManualClock, MemoryStore, Reward,
    SharedStore, Special, StopCode, StoreError, ZoneNumber,
};

fn zone_of(f: &Fixture, code: &StopCode) -> ZoneNumber {
    f.game.catalog().stop(code.as_str()).unwrap().zone
}

// =============================================================================
// Creation Tests
// =============================================================================

/// Test that a new game gets a code and a full deck.
#[test]
fn test_create_game() {
    let f = fixture();

    assert_eq!(f.game.id().as_str().len(), 4);
    assert!(f.game.id().as_str().chars().all(|c| c.is_ascii_uppercase()));
    assert_eq!(f.game.all_cards().unwrap().len(), DECK_SIZE);
    assert_eq!(f.game.zone_deck(ZoneNumber::new(1)).unwrap().len(), 5);
    assert_eq!(f.game.zone_deck(ZoneNumber::new(2)).unwrap().len(), 6);
    assert!(f.game.all_cards().unwrap().contains(&card("CANCELLED-1-2")));
    assert!(!f.game.in_progress().unwrap());
}

/// Test that a game can be reopened from its store.
#[test]
fn test_open_game() {
    let f = fixture();
    let engine = f.game.engine().clone();
    let id = f.game.id().clone();
    let store = f.game.into_store();

    let reopened = engine.open_game(store, id.clone(), 1).unwrap().unwrap();
    assert_eq!(reopened.id(), &id);
    assert_eq!(reopened.teams().unwrap().len(), 2);

    assert!(engine
        .open_game(MemoryStore::new(), GameId::new("ZZZZ"), 1)
        .unwrap()
        .is_none());
}

/// Test that games sharing a store never share a code.
#[test]
fn test_shared_store_codes_unique() {
    let engine = Engine::new(catalog()).with_clock(Arc::new(ManualClock::default()));
    let store = SharedStore::new();

    let first = engine.create_game(store.clone(), 3).unwrap();
    let second = engine.create_game(store.clone(), 3).unwrap();

    assert_ne!(first.id(), second.id());
}

/// Test that a stale write through a second handle is reported as a conflict.
#[test]
fn test_stale_write_conflicts() {
    let engine = Engine::new(catalog()).with_clock(Arc::new(ManualClock::default()));
    let store = SharedStore::new();
    let mut game = engine.create_game(store.clone(), 5).unwrap();
    let red = game.add_team("Red Team", "red").unwrap();
    let mut other = engine.open_game(store, game.id().clone(), 6).unwrap().unwrap();

    let (version, record) = game
        .documents()
        .fetch::<TeamRecord>(DocumentKind::Team, "0")
        .unwrap();
    assert!(other.start_challenge(red, &challenge("CB1")).unwrap());

    let err = game
        .documents_mut()
        .save(DocumentKind::Team, "0", &record.unwrap(), ExpectedVersion::after_read(version))
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Conflict { .. })));
    assert_eq!(game.current_challenge(red).unwrap(), Some(challenge("CB1")));
}

// =============================================================================
// Reward Tests
// =============================================================================

/// Test that the placement tree flags rewards and binds specials.
#[test]
fn test_assign_rewards() {
    let mut f = fixture();
    f.game.assign_rewards().unwrap();

    assert!(f.game.stop(&stop("B2")).unwrap().unwrap().has_reward);
    assert_eq!(f.game.stop(&stop("G2")).unwrap().unwrap().special, Some(Special::Immunity));
    let chosen = ["R1", "R2"]
        .iter()
        .filter(|code| f.game.stop(&stop(code)).unwrap().unwrap().has_reward)
        .count();
    assert_eq!(chosen, 1);
    assert!(!f.game.stop(&stop("B1")).unwrap().unwrap().has_reward);
}

/// Test that claiming a reward stop deals a card from its zone once.
#[test]
fn test_reward_dealt_on_claim() {
    let mut f = fixture();
    f.game.assign_rewards().unwrap();

    let Some(Reward::Action(dealt)) = f.game.claim_stop(&stop("B2"), f.red).unwrap() else {
        panic!("B2 should pay out a card");
    };
    let view = f.game.card(&dealt).unwrap().unwrap();
    assert_eq!(view.zone, ZoneNumber::new(2));
    assert_eq!(view.owner, Some(f.red));
    assert_eq!(f.game.hand(f.red).unwrap().len(), 1);
    assert_eq!(f.game.zone_deck(ZoneNumber::new(2)).unwrap().len(), 5);
    assert!(!f.game.stop(&stop("B2")).unwrap().unwrap().has_reward);

    assert_eq!(f.game.claim_stop(&stop("B2"), f.blue).unwrap(), None);
}

/// Test that a special ability goes to the first claimant only.
#[test]
fn test_special_granted_on_claim() {
    let mut f = fixture();
    f.game.assign_rewards().unwrap();

    assert_eq!(
        f.game.claim_stop(&stop("G2"), f.red).unwrap(),
        Some(Reward::Special(Special::Immunity))
    );
    assert!(f.game.has_curse_immunity(f.red).unwrap());

    assert_eq!(f.game.claim_stop(&stop("G2"), f.blue).unwrap(), None);
    assert!(!f.game.has_curse_immunity(f.blue).unwrap());
}

/// Test that reward choice reserves cards and returns the unpicked ones.
#[test]
fn test_reward_choice() {
    let mut f = fixture();
    f.game.add_special(f.red, Special::RewardChoice).unwrap();
    f.game.assign_rewards().unwrap();

    let Some(Reward::Choice(options)) = f.game.claim_stop(&stop("B2"), f.red).unwrap() else {
        panic!("reward choice should offer several cards");
    };
    assert_eq!(options.len(), 2);
    assert_eq!(f.game.reserved_actions(f.red).unwrap().len(), 2);
    assert!(f.game.hand(f.red).unwrap().is_empty());
    assert_eq!(f.game.zone_deck(ZoneNumber::new(2)).unwrap().len(), 4);

    assert!(!f.game.choose_action(f.blue, &options[0]).unwrap());
    assert!(f.game.choose_action(f.red, &options[0]).unwrap());

    let hand = f.game.hand(f.red).unwrap();
    assert_eq!(hand.len(), 1);
    assert_eq!(hand[0].id, options[0]);
    assert!(f.game.reserved_actions(f.red).unwrap().is_empty());
    assert_eq!(f.game.zone_deck(ZoneNumber::new(2)).unwrap().len(), 5);
    assert!(!f.game.choose_action(f.red, &options[1]).unwrap());
}

/// Test that an empty zone deck pays out nothing.
#[test]
fn test_empty_deck_pays_nothing() {
    let mut f = fixture();
    let zone = ZoneNumber::new(4);

    assert!(matches!(f.game.deal_action(f.red, zone).unwrap(), Some(Reward::Action(_))));
    assert_eq!(f.game.deal_action(f.red, zone).unwrap(), None);
}

// =============================================================================
// Secret Tests
// =============================================================================

/// Test that every team gets one secret per secret zone and none are shared.
#[test]
fn test_deal_all_secrets() {
    let mut f = fixture();
    f.game.deal_all_secrets().unwrap();

    let red = f.game.retained_secrets(f.red).unwrap();
    let blue = f.game.retained_secrets(f.blue).unwrap();
    assert_eq!(red.len(), 3);
    assert_eq!(blue.len(), 3);
    for (i, secret) in red.iter().enumerate() {
        assert_eq!(zone_of(&f, secret), ZoneNumber::new(i as u8 + 1));
        assert!(!blue.contains(secret));
    }
}

/// Test that secrets are only dealt from unclaimed stops.
#[test]
fn test_secret_never_claimed() {
    let mut f = fixture();
    let zone = ZoneNumber::new(4);
    f.game.claim_stop(&stop("Y4"), f.blue).unwrap();

    assert_eq!(f.game.deal_secret(f.red, zone, None).unwrap(), None);

    f.game.unclaim_stop(&stop("Y4")).unwrap();
    assert_eq!(f.game.deal_secret(f.red, zone, None).unwrap(), Some(stop("Y4")));
    // Already held by a team
    assert_eq!(f.game.deal_secret(f.blue, zone, None).unwrap(), None);
}

/// Test that flagged secrets are redealt in their zone at the start.
#[test]
fn test_mulligan_redeals() {
    let mut f = fixture();
    f.game.deal_all_secrets().unwrap();
    let flagged = f.game.retained_secrets(f.red).unwrap()[0].clone();

    assert!(f.game.mulligan_secret(f.red, &flagged).unwrap());
    assert!(!f.game.mulligan_secret(f.red, &flagged).unwrap());
    assert_eq!(f.game.mulliganed_secrets(f.red).unwrap(), vec![flagged.clone()]);

    assert!(f.game.start().unwrap());

    let red = f.game.retained_secrets(f.red).unwrap();
    let blue = f.game.retained_secrets(f.blue).unwrap();
    assert_eq!(red.len(), 3);
    assert!(!red.contains(&flagged));
    assert!(f.game.mulliganed_secrets(f.red).unwrap().is_empty());
    let replacement = red.iter().find(|secret| zone_of(&f, secret) == ZoneNumber::new(1)).unwrap();
    assert!(!blue.contains(replacement));
}

/// Test that mulligans are limited and close once the game starts.
#[test]
fn test_mulligan_limits() {
    let mut f = fixture_with(catalog(), EngineConfig::default().with_max_mulligans(1));
    f.game.deal_all_secrets().unwrap();
    let secrets = f.game.retained_secrets(f.red).unwrap();

    assert!(f.game.mulligan_secret(f.red, &secrets[0]).unwrap());
    assert!(!f.game.mulligan_secret(f.red, &secrets[1]).unwrap());
    assert!(!f.game.mulligan_secret(f.red, &stop("Y4")).unwrap());

    f.game.reset_mulligan(f.red).unwrap();
    assert!(f.game.mulligan_secret(f.red, &secrets[1]).unwrap());

    f.game.reset_mulligan(f.red).unwrap();
    assert!(f.game.start().unwrap());
    assert!(!f.game.mulligan_secret(f.red, &secrets[0]).unwrap());
}

/// Test revealing a chosen secret and then random ones.
#[test]
fn test_reveal_secret() {
    let mut f = fixture();
    f.game.add_secret(f.red, &stop("B1")).unwrap();
    f.game.add_secret(f.red, &stop("G1")).unwrap();

    assert_eq!(f.game.reveal_secret(f.red, Some(&stop("G1"))).unwrap(), Some(stop("G1")));
    assert_eq!(f.game.revealed_secrets(f.red).unwrap(), vec![stop("G1")]);
    assert_eq!(f.game.reveal_secret(f.red, Some(&stop("G1"))).unwrap(), None);

    assert_eq!(f.game.reveal_secret(f.red, None).unwrap(), Some(stop("B1")));
    assert_eq!(f.game.reveal_secret(f.red, None).unwrap(), None);
    assert!(f.game.unrevealed_secrets(f.red).unwrap().is_empty());
}

/// Test that donation hands one secret to each rival and is used up.
#[test]
fn test_donate_secrets() {
    let mut f = fixture();
    f.game.add_secret(f.red, &stop("B1")).unwrap();
    f.game.add_secret(f.red, &stop("G1")).unwrap();

    assert!(!f.game.donate_secrets(f.red, &stops(&["B1"])).unwrap());

    f.game.add_special(f.red, Special::Donation).unwrap();
    // One secret per rival, no more
    assert!(!f.game.donate_secrets(f.red, &stops(&["B1", "G1"])).unwrap());
    assert!(!f.game.donate_secrets(f.red, &stops(&["R1"])).unwrap());
    assert!(f.game.donate_secrets(f.red, &stops(&["B1"])).unwrap());

    assert_eq!(f.game.retained_secrets(f.red).unwrap(), vec![stop("G1")]);
    assert_eq!(f.game.retained_secrets(f.blue).unwrap(), vec![stop("B1")]);
    assert!(!f.game.has_special(f.red, Special::Donation).unwrap());
    assert!(!f.game.donate_secrets(f.red, &stops(&["G1"])).unwrap());
}

/// Test that one stop cannot be donated to two rivals.
#[test]
fn test_donate_secrets_distinct() {
    let mut f = fixture();
    let green = f.game.add_team("Green Team", "green").unwrap();
    f.game.add_secret(f.red, &stop("B1")).unwrap();
    f.game.add_secret(f.red, &stop("G1")).unwrap();
    f.game.add_special(f.red, Special::Donation).unwrap();

    assert!(!f.game.donate_secrets(f.red, &stops(&["B1", "B1"])).unwrap());
    assert!(f.game.retained_secrets(f.blue).unwrap().is_empty());
    assert!(f.game.retained_secrets(green).unwrap().is_empty());

    assert!(f.game.donate_secrets(f.red, &stops(&["B1", "G1"])).unwrap());
    let mut given = f.game.retained_secrets(f.blue).unwrap();
    given.extend(f.game.retained_secrets(green).unwrap());
    given.sort();
    assert_eq!(given, stops(&["B1", "G1"]));
    assert!(f.game.retained_secrets(f.red).unwrap().is_empty());
}

/// Test that dropping secrets respects the configured count.
#[test]
fn test_drop_secrets() {
    let mut f = fixture();
    for code in ["B1", "G1", "R1"] {
        f.game.add_secret(f.red, &stop(code)).unwrap();
    }
    f.game.add_special(f.red, Special::DropSecrets).unwrap();

    assert!(!f.game.drop_secrets(f.red, &stops(&["B1", "G1", "R1"])).unwrap());
    assert!(f.game.drop_secrets(f.red, &stops(&["B1", "G1"])).unwrap());

    assert_eq!(f.game.retained_secrets(f.red).unwrap(), vec![stop("R1")]);
    assert!(!f.game.drop_secrets(f.red, &stops(&["R1"])).unwrap());
}

/// Test that add-secrets deals every rival an extra secret.
#[test]
fn test_add_secrets() {
    let mut f = fixture();
    assert!(!f.game.add_secrets(f.red).unwrap());

    f.game.add_special(f.red, Special::AddSecrets).unwrap();
    assert!(f.game.add_secrets(f.red).unwrap());

    let blue = f.game.retained_secrets(f.blue).unwrap();
    assert_eq!(blue.len(), 1);
    assert_eq!(zone_of(&f, &blue[0]), ZoneNumber::new(2));
    assert!(f.game.retained_secrets(f.red).unwrap().is_empty());
    assert!(!f.game.has_special(f.red, Special::AddSecrets).unwrap());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// Test that reset wipes the board but keeps the teams.
#[test]
fn test_start_and_reset() {
    let mut f = fixture();
    f.game.assign_rewards().unwrap();
    f.game.deal_all_secrets().unwrap();

    assert!(f.game.start().unwrap());
    assert!(!f.game.start().unwrap());
    assert!(f.game.in_progress().unwrap());

    f.game.claim_stop(&stop("B2"), f.red).unwrap();
    assert!(f.game.start_challenge(f.blue, &challenge("CG1")).unwrap());

    f.game.reset().unwrap();

    assert!(!f.game.in_progress().unwrap());
    assert_eq!(f.game.stop_owner(&stop("B2")).unwrap(), None);
    assert!(!f.game.stop(&stop("B2")).unwrap().unwrap().has_reward);
    assert_eq!(f.game.all_cards().unwrap().len(), DECK_SIZE);
    assert!(f.game.hand(f.red).unwrap().is_empty());
    assert!(f.game.secrets(f.red).unwrap().is_empty());
    assert_eq!(f.game.current_challenge(f.blue).unwrap(), None);
    assert_eq!(f.game.teams().unwrap().len(), 2);
    assert_eq!(f.game.team(f.red).unwrap().unwrap().name, "Red Team");
    assert_eq!(f.game.total_game_time().unwrap(), None);
}

/// Test that the game ends the moment a team has its secrets and lines.
#[test]
fn test_win_stamps_end_time() {
    let mut f = fixture();
    f.game.add_secret(f.red, &stop("Y4")).unwrap();
    assert!(f.game.start().unwrap());
    f.clock.advance(Duration::minutes(30));

    lock_line(&mut f.game, f.red, "blue", &["B1", "B2", "B3"]);
    lock_line(&mut f.game, f.red, "green", &["G1", "G2", "G3"]);
    lock_line(&mut f.game, f.red, "red", &["R1", "R2", "R3"]);

    assert!(!f.game.has_won(f.red).unwrap());
    assert_eq!(f.game.winner().unwrap(), None);
    assert!(f.game.in_progress().unwrap());

    f.game.claim_stop(&stop("Y4"), f.red).unwrap();

    assert!(f.game.has_won(f.red).unwrap());
    assert_eq!(f.game.winner().unwrap(), Some(f.red));
    assert!(!f.game.in_progress().unwrap());
    assert_eq!(f.game.total_game_time().unwrap(), Some(Duration::minutes(30)));

    // The stamp is written once
    f.clock.advance(Duration::minutes(5));
    assert!(f.game.check_game_over().unwrap());
    assert_eq!(f.game.total_game_time().unwrap(), Some(Duration::minutes(30)));
}

/// Test that the number of lines needed comes from the configuration.
#[test]
fn test_lines_to_win_configurable() {
    let mut f = fixture_with(catalog(), EngineConfig::default().with_lines_to_win(1));
    assert!(f.game.start().unwrap());

    lock_line(&mut f.game, f.blue, "yellow", &["Y2", "Y3", "Y4"]);

    assert_eq!(f.game.winner().unwrap(), Some(f.blue));
    assert!(!f.game.in_progress().unwrap());
}

// =============================================================================
// Lookup Tests
// =============================================================================

/// Test that teams can be found by loosely typed names.
#[test]
fn test_team_by_name() {
    let f = fixture();

    assert_eq!(f.game.team_by_name("red team").unwrap(), Some(f.red));
    assert_eq!(f.game.team_by_name("Team Red").unwrap(), Some(f.red));
    assert_eq!(f.game.team_by_name("RED").unwrap(), Some(f.red));
    assert_eq!(f.game.team_by_name("blue").unwrap(), Some(f.blue));
    assert_eq!(f.game.team_by_name("Team Blue!").unwrap(), Some(f.blue));
    assert_eq!(f.game.team_by_name("purple").unwrap(), None);
}

/// Test that stops can be found by loosely typed search terms.
#[test]
fn test_search_stop() {
    let f = fixture();

    assert_eq!(f.game.search_stop("Blue-One").unwrap().unwrap().code, stop("B1"));
    assert_eq!(f.game.search_stop("GREEN TWO!").unwrap().unwrap().code, stop("G2"));
    assert!(f.game.search_stop("nowhere").unwrap().is_none());
}
