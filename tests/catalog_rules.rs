/// Tests for the rule catalog: seeding, action resolution, per-tile-type
/// filtering, and class/race gating of combat moves.
use chrono::Utc;
use tempfile::TempDir;

use tilequest::config::GameConfig;
use tilequest::game::catalog::{
    TILE_TYPE_MONSTER_ID, TILE_TYPE_SCENE_ID, TILE_TYPE_SIGN_ID, TILE_TYPE_TREASURE_ID,
};
use tilequest::game::{
    allowed_actions_for_tile_type, available_combat_moves, resolve_action_option, set_character,
    ActionOption, ActionResolution, GameStore, GameStoreBuilder,
};

fn setup_test_store() -> (GameStore, GameConfig, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = GameStoreBuilder::new(temp_dir.path()).open().unwrap();
    (store, GameConfig::default(), temp_dir)
}

#[test]
fn seeding_runs_once_per_database() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = GameStoreBuilder::new(temp_dir.path()).open().unwrap();
        assert_eq!(store.list_action_options().unwrap().len(), 4);
        assert_eq!(store.list_tile_types().unwrap().len(), 4);
        assert_eq!(store.list_player_classes().unwrap().len(), 3);
        assert_eq!(store.list_player_races().unwrap().len(), 3);
        assert_eq!(store.list_combat_moves().unwrap().len(), 8);
    }

    // Reopening the same database must not duplicate rows.
    let store = GameStoreBuilder::new(temp_dir.path()).open().unwrap();
    assert_eq!(store.seed_catalog_if_needed().unwrap(), 0);
    assert_eq!(store.list_action_options().unwrap().len(), 4);
    assert_eq!(store.list_combat_moves().unwrap().len(), 8);
}

#[test]
fn resolver_tries_code_then_id_then_name() {
    let (store, _config, _temp) = setup_test_store();

    let by_code = resolve_action_option(&store, "rest").unwrap();
    assert!(matches!(by_code, ActionResolution::Code(ref o) if o.code == "rest"));

    let by_id = resolve_action_option(&store, "2").unwrap();
    assert!(matches!(by_id, ActionResolution::Id(ref o) if o.code == "inspect"));

    // A row whose display name differs from its code exercises the last rung.
    store
        .put_action_option(ActionOption::new(
            9,
            "wave_x",
            "Wave Hello",
            "Greet the empty road.",
            Utc::now(),
        ))
        .unwrap();
    let by_name = resolve_action_option(&store, "Wave Hello").unwrap();
    assert!(matches!(by_name, ActionResolution::Name(ref o) if o.code == "wave_x"));

    let unmatched = resolve_action_option(&store, "juggle").unwrap();
    assert_eq!(unmatched, ActionResolution::Unmatched);
    assert_eq!(unmatched.matched_by(), "none");
}

#[test]
fn resolver_ignores_surrounding_whitespace() {
    let (store, _config, _temp) = setup_test_store();
    let resolved = resolve_action_option(&store, "  fight  ").unwrap();
    assert!(matches!(resolved, ActionResolution::Code(ref o) if o.code == "fight"));
    assert_eq!(
        resolve_action_option(&store, "   ").unwrap(),
        ActionResolution::Unmatched
    );
}

#[test]
fn sign_tiles_offer_rest_inspect_quit() {
    let (store, _config, _temp) = setup_test_store();
    let options = allowed_actions_for_tile_type(&store, TILE_TYPE_SIGN_ID).unwrap();
    let codes: Vec<&str> = options.iter().map(|o| o.code.as_str()).collect();
    assert_eq!(codes, vec!["inspect", "quit", "rest"]);
}

#[test]
fn treasure_tiles_drop_fight() {
    let (store, _config, _temp) = setup_test_store();
    let options = allowed_actions_for_tile_type(&store, TILE_TYPE_TREASURE_ID).unwrap();
    assert_eq!(options.len(), 3);
    assert!(options.iter().all(|o| o.code != "fight"));
}

#[test]
fn scene_and_monster_tiles_offer_everything() {
    let (store, _config, _temp) = setup_test_store();
    for tile_type_id in [TILE_TYPE_SCENE_ID, TILE_TYPE_MONSTER_ID] {
        let options = allowed_actions_for_tile_type(&store, tile_type_id).unwrap();
        let codes: Vec<&str> = options.iter().map(|o| o.code.as_str()).collect();
        // Sorted by display name.
        assert_eq!(codes, vec!["fight", "inspect", "quit", "rest"]);
    }
}

#[test]
fn combat_moves_gate_on_class() {
    let (store, config, _temp) = setup_test_store();
    let witch = store.create_player("morgan", 100).unwrap();
    set_character(&store, &config, witch.id, "witch", "Human").unwrap();
    let fighter = store.create_player("brand", 100).unwrap();
    set_character(&store, &config, fighter.id, "fighter", "Human").unwrap();

    let witch_codes: Vec<String> = available_combat_moves(&store, witch.id)
        .unwrap()
        .into_iter()
        .map(|m| m.code)
        .collect();
    assert!(witch_codes.contains(&"fireball".to_string()));
    assert!(!witch_codes.contains(&"power_strike".to_string()));
    assert!(!witch_codes.contains(&"greater_heal".to_string()));

    let fighter_codes: Vec<String> = available_combat_moves(&store, fighter.id)
        .unwrap()
        .into_iter()
        .map(|m| m.code)
        .collect();
    assert!(fighter_codes.contains(&"power_strike".to_string()));
    assert!(!fighter_codes.contains(&"fireball".to_string()));
}

#[test]
fn combat_moves_gate_on_race() {
    let (store, config, _temp) = setup_test_store();
    let elf = store.create_player("lira", 100).unwrap();
    set_character(&store, &config, elf.id, "fighter", "Elf").unwrap();
    let human = store.create_player("ada", 100).unwrap();
    set_character(&store, &config, human.id, "fighter", "Human").unwrap();

    let elf_codes: Vec<String> = available_combat_moves(&store, elf.id)
        .unwrap()
        .into_iter()
        .map(|m| m.code)
        .collect();
    assert!(elf_codes.contains(&"elven_grace".to_string()));
    assert_eq!(elf_codes.len(), 6);

    let human_codes: Vec<String> = available_combat_moves(&store, human.id)
        .unwrap()
        .into_iter()
        .map(|m| m.code)
        .collect();
    assert!(!human_codes.contains(&"elven_grace".to_string()));
    assert_eq!(human_codes.len(), 5);
}

#[test]
fn unbuilt_players_get_only_open_moves() {
    let (store, _config, _temp) = setup_test_store();
    let player = store.create_player("ada", 100).unwrap();
    let codes: Vec<String> = available_combat_moves(&store, player.id)
        .unwrap()
        .into_iter()
        .map(|m| m.code)
        .collect();
    assert_eq!(codes, vec!["attack_light", "attack_heavy", "defend", "heal"]);
}
