/// Tests for character sheets: builds, level-ups, and the points wallet.
use chrono::{Duration, Utc};
use tempfile::TempDir;

use tilequest::config::GameConfig;
use tilequest::game::{
    accrue_points, award_experience, set_character, spend_point, GameError, GameStore,
    GameStoreBuilder,
};

fn setup_test_store() -> (GameStore, GameConfig, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = GameStoreBuilder::new(temp_dir.path()).open().unwrap();
    (store, GameConfig::default(), temp_dir)
}

#[test]
fn witch_elf_build_applies_modifiers() {
    let (store, config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();

    let built = set_character(&store, &config, player.id, "witch", "Elf").unwrap();
    assert_eq!(built.strength, 5);
    assert_eq!(built.intelligence, 20);
    assert_eq!(built.stealth, 15);
    // Elf band 80, witch multiplier 0.9.
    assert_eq!(built.max_hitpoints, 72);
    assert_eq!(built.hitpoints, 72);

    let reloaded = store.get_player(player.id).unwrap();
    assert_eq!(reloaded.max_hitpoints, 72);
    assert_eq!(reloaded.class_id, built.class_id);
    assert_eq!(reloaded.race_id, built.race_id);
}

#[test]
fn healer_human_build_applies_modifiers() {
    let (store, config, _temp) = setup_test_store();
    let player = store.create_player("bea", 100).unwrap();

    let built = set_character(&store, &config, player.id, "healer", "Human").unwrap();
    assert_eq!(built.strength, 12);
    assert_eq!(built.intelligence, 12);
    assert_eq!(built.stealth, 5);
    assert_eq!(built.max_hitpoints, 125);
}

#[test]
fn unknown_class_is_not_found() {
    let (store, config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();

    let err = set_character(&store, &config, player.id, "bard", "Human").unwrap_err();
    assert!(matches!(err, GameError::NotFound(_)));
}

#[test]
fn experience_award_persists_level_up() {
    let (store, _config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();

    let after = award_experience(&store, player.id, 100).unwrap();
    assert_eq!(after.level, 2);
    assert_eq!(after.strength, 15);
    assert_eq!(after.max_hitpoints, 150);
    assert_eq!(after.hitpoints, 150);

    let reloaded = store.get_player(player.id).unwrap();
    assert_eq!(reloaded.level, 2);
    assert_eq!(reloaded.experience, 100);
}

#[test]
fn points_accrue_by_whole_hours_and_keep_remainder() {
    let (store, config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();
    let start = Utc::now();

    // First call only initializes the clock.
    assert_eq!(accrue_points(&store, &config, player.id, start).unwrap(), 0);
    assert_eq!(store.get_player(player.id).unwrap().points, 0);

    // 2h30m later: two whole hours pay out, the half hour stays banked.
    let added = accrue_points(
        &store,
        &config,
        player.id,
        start + Duration::minutes(150),
    )
    .unwrap();
    assert_eq!(added, 10);
    let mid = store.get_player(player.id).unwrap();
    assert_eq!(mid.points, 10);
    assert_eq!(mid.points_accrued_at, Some(start + Duration::hours(2)));

    // At the 3h mark the banked half hour completes a third hour.
    let added = accrue_points(&store, &config, player.id, start + Duration::hours(3)).unwrap();
    assert_eq!(added, 5);
    assert_eq!(store.get_player(player.id).unwrap().points, 15);
}

#[test]
fn accrual_before_an_hour_awards_nothing() {
    let (store, config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();
    let start = Utc::now();

    accrue_points(&store, &config, player.id, start).unwrap();
    let added = accrue_points(
        &store,
        &config,
        player.id,
        start + Duration::minutes(59),
    )
    .unwrap();
    assert_eq!(added, 0);
    assert_eq!(store.get_player(player.id).unwrap().points, 0);
}

#[test]
fn spend_point_never_goes_negative() {
    let (store, _config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();

    // Spending with an empty wallet is a calm no-op.
    assert_eq!(spend_point(&store, player.id).unwrap(), 0);

    let mut funded = store.get_player(player.id).unwrap();
    funded.points = 2;
    store.put_player(funded).unwrap();

    assert_eq!(spend_point(&store, player.id).unwrap(), 1);
    assert_eq!(spend_point(&store, player.id).unwrap(), 0);
    assert_eq!(spend_point(&store, player.id).unwrap(), 0);
}
