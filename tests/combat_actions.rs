/// Tests for the legacy action table: rest, inspect, fight, quit, the
/// named fallback, and the one-action-per-tile rejection.
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use tilequest::config::GameConfig;
use tilequest::game::catalog::{TILE_TYPE_MONSTER_ID, TILE_TYPE_SCENE_ID, TILE_TYPE_SIGN_ID};
use tilequest::game::{
    generate_tile, get_active_playthrough, resolve_action, start_journey, GameError, GameStore,
    GameStoreBuilder, PlayerRecord, PlaythroughRecord, TileRecord,
};

fn setup_test_store() -> (GameStore, GameConfig, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = GameStoreBuilder::new(temp_dir.path()).open().unwrap();
    (store, GameConfig::default(), temp_dir)
}

fn setup_tile(
    store: &GameStore,
    config: &GameConfig,
    rng: &mut StdRng,
    tile_type_id: u64,
) -> (PlayerRecord, PlaythroughRecord, TileRecord) {
    let player = store
        .create_player("ada", config.players.starting_hitpoints)
        .unwrap();
    let (run, _first) = start_journey(store, config, rng, player.id).unwrap();
    let tile = generate_tile(store, config, rng, player.id, run.id, Some(tile_type_id)).unwrap();
    (player, run, tile)
}

fn set_hitpoints(store: &GameStore, player_id: u64, hitpoints: i32) {
    let mut player = store.get_player(player_id).unwrap();
    player.hitpoints = hitpoints;
    store.put_player(player).unwrap();
}

#[test]
fn rest_on_safe_tile_heals_ten_clamped() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(31);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);
    set_hitpoints(&store, player.id, 95);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.message, "You rest and recover 10 HP.");
    assert_eq!(outcome.player_hp_after, 100);
    assert_eq!(outcome.player_hp_delta, 5);
    assert!(outcome.tile_completed);
    assert!(outcome.player_alive);

    let closed = store.get_tile(player.id, tile.id).unwrap();
    assert!(closed.action_taken);
    assert!(closed.action_record_id.is_some());
}

#[test]
fn rest_at_full_health_is_a_clamped_no_op() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(42);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SIGN_ID);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    // The message reports the nominal heal; the delta reports what landed.
    assert_eq!(outcome.message, "You rest and recover 10 HP.");
    assert_eq!(outcome.player_hp_after, 100);
    assert_eq!(outcome.player_hp_delta, 0);
    assert!(outcome.tile_completed);
}

#[test]
fn rest_near_monster_costs_half_current_hp() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(32);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_MONSTER_ID);
    set_hitpoints(&store, player.id, 50);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    assert_eq!(
        outcome.message,
        "Resting near a monster is dangerous! You lost 25 HP."
    );
    assert_eq!(outcome.player_hp_after, 25);
    assert_eq!(outcome.player_hp_delta, -25);
}

#[test]
fn rest_near_monster_costs_at_least_ten() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(33);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_MONSTER_ID);
    set_hitpoints(&store, player.id, 15);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    assert_eq!(
        outcome.message,
        "Resting near a monster is dangerous! You lost 10 HP."
    );
    assert_eq!(outcome.player_hp_after, 5);
}

#[test]
fn second_action_on_a_tile_is_rejected() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(34);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);
    set_hitpoints(&store, player.id, 80);

    resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    let err = resolve_action(
        &store,
        &config,
        &mut rng,
        player.id,
        tile.id,
        "inspect",
        None,
    )
    .unwrap_err();
    assert!(matches!(err, GameError::TileAlreadyActioned(id) if id == tile.id));
    assert!(err.is_conflict());

    // The rejection must leave no trace: one action record, HP untouched.
    assert_eq!(store.list_action_records(tile.id).unwrap().len(), 1);
    assert_eq!(store.get_player(player.id).unwrap().hitpoints, 90);
}

#[test]
fn fight_costs_five_to_twenty_hp() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(35);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "fight", None).unwrap();
    assert!(outcome.message.starts_with("You fought bravely and took "));
    let lost = -outcome.player_hp_delta;
    assert!((5..=20).contains(&lost), "lost {} HP", lost);
    assert_eq!(outcome.player_hp_after, 100 - lost);
}

#[test]
fn inspect_messages_follow_tile_type() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(36);
    let (player, run, monster_tile) =
        setup_tile(&store, &config, &mut rng, TILE_TYPE_MONSTER_ID);

    let outcome = resolve_action(
        &store,
        &config,
        &mut rng,
        player.id,
        monster_tile.id,
        "inspect",
        None,
    )
    .unwrap();
    assert_eq!(
        outcome.message,
        "You carefully observe the creature, learning its patterns."
    );
    assert_eq!(outcome.player_hp_delta, 0);

    let scene_tile = generate_tile(
        &store,
        &config,
        &mut rng,
        player.id,
        run.id,
        Some(TILE_TYPE_SCENE_ID),
    )
    .unwrap();
    let outcome = resolve_action(
        &store,
        &config,
        &mut rng,
        player.id,
        scene_tile.id,
        "inspect",
        None,
    )
    .unwrap();
    assert_eq!(
        outcome.message,
        "You take a moment to examine your surroundings carefully."
    );
}

#[test]
fn quit_retreats_and_ends_the_run() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(37);
    let (player, run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SIGN_ID);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "quit", None).unwrap();
    assert_eq!(outcome.message, "You decide to retreat from this challenge.");
    assert!(outcome.should_end_playthrough);
    assert!(outcome.tile_completed);

    assert!(get_active_playthrough(&store, player.id).unwrap().is_none());
    let ended = store.get_playthrough(player.id, run.id).unwrap();
    assert!(ended.ended_at.is_some());
}

#[test]
fn unknown_action_names_fall_through() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(38);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "dance", None).unwrap();
    assert_eq!(outcome.message, "Performed action: dance");
    assert!(outcome.tile_completed);
    assert_eq!(outcome.player_hp_delta, 0);

    let records = store.list_action_records(tile.id).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "dance");
    assert!(records[0].action_option_id.is_none());
}

#[test]
fn empty_action_value_is_rejected_without_closing() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(39);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);

    let err = resolve_action(&store, &config, &mut rng, player.id, tile.id, "  ", None)
        .unwrap_err();
    assert!(matches!(err, GameError::NoActionSelected));

    // The tile stays open, so a real action still lands.
    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    assert!(outcome.tile_completed);
}

#[test]
fn numeric_action_values_resolve_by_id() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(40);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);
    set_hitpoints(&store, player.id, 60);

    // Option id 1 is "rest" in the canonical catalog.
    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "1", None).unwrap();
    assert_eq!(outcome.message, "You rest and recover 10 HP.");
    assert_eq!(outcome.player_hp_after, 70);
    assert_eq!(outcome.action_name, "rest");
}

#[test]
fn outcome_wire_shape_is_stable() {
    let (store, config, _temp) = setup_test_store();
    let mut rng = StdRng::seed_from_u64(41);
    let (player, _run, tile) = setup_tile(&store, &config, &mut rng, TILE_TYPE_SCENE_ID);

    let outcome =
        resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None).unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["success"], serde_json::json!(true));
    assert!(value["message"].is_string());
    assert!(value["player_hp_after"].is_i64() || value["player_hp_after"].is_u64());
    assert!(value["player_hp_delta"].is_i64() || value["player_hp_delta"].is_u64());
    assert_eq!(value["player_alive"], serde_json::json!(true));
    assert_eq!(value["tile_completed"], serde_json::json!(true));
    assert_eq!(value["should_end_playthrough"], serde_json::json!(false));
    assert!(value["monster_hp_after"].is_null());
}
