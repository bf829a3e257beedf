//! Action resolution: the one-action-per-tile engine.
//!
//! `resolve_action` is the single entry point hosts call when a player
//! acts on a tile. The whole read-check-mutate-write sequence runs under
//! the tile's row guard (player guard second), so concurrent submissions
//! serialize and exactly one of them closes the tile; the rest see
//! [`GameError::TileAlreadyActioned`].
//!
//! Two paths share that critical section. Combat moves roll a d100
//! against the move's success rate, roll damage inside the move's band,
//! floor the monster's persistent HP at zero, and log an encounter row
//! win or lose; the monster answers a non-lethal hit half the time. The
//! legacy verbs (rest, inspect, fight, quit) keep their original effect
//! table and always close the tile in one shot.

use chrono::Utc;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use crate::config::GameConfig;
use crate::game::catalog::{self, CombatMove};
use crate::game::errors::GameError;
use crate::game::storage::GameStore;
use crate::game::types::{EncounterRecord, PlayerRecord, TileRecord, ENCOUNTER_SCHEMA_VERSION};

/// Counter-attack damage band when a wounded monster strikes back.
const COUNTER_DAMAGE_MIN: i32 = 3;
const COUNTER_DAMAGE_MAX: i32 = 10;

/// Report handed back to the host after one resolution.
///
/// `success` is false only for a failed combat move; legacy actions that
/// execute at all count as successful. `player_hp_delta` is the actual
/// post-clamp change, which is what health bars need.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    pub action_name: String,
    pub player_hp_after: i32,
    pub player_hp_delta: i32,
    pub player_alive: bool,
    pub tile_completed: bool,
    pub monster_hp_after: Option<i32>,
    pub should_end_playthrough: bool,
}

/// Resolve one action against a tile.
///
/// A supplied `combat_move_code` that resolves in the catalog takes the
/// combat path; otherwise `action_value` runs through the action resolver
/// (code, then id, then name) and the legacy dispatch. An empty action
/// value with no usable combat move is [`GameError::NoActionSelected`].
pub fn resolve_action(
    store: &GameStore,
    config: &GameConfig,
    rng: &mut StdRng,
    player_id: u64,
    tile_id: u64,
    action_value: &str,
    combat_move_code: Option<&str>,
) -> Result<ActionOutcome, GameError> {
    let (_tile_guard, mut tile) = store.lock_tile(player_id, tile_id)?;
    let _player_guard = store.lock_player(player_id);
    let mut player = store.get_player(player_id)?;

    if tile.action_taken {
        return Err(GameError::TileAlreadyActioned(tile.id));
    }

    if let Some(code) = combat_move_code {
        if let Some(combat_move) = store.combat_move_by_code(code.trim())? {
            return execute_combat_move(store, config, rng, &mut player, &mut tile, &combat_move);
        }
    }

    let value = action_value.trim();
    if value.is_empty() {
        return Err(GameError::NoActionSelected);
    }

    let resolution = catalog::resolve_action_option(store, value)?;
    let (option_id, action_name) = match resolution.option() {
        Some(option) => (Some(option.id), option.name.clone()),
        None => (None, value.to_string()),
    };
    debug!(
        "action '{}' on tile {} matched by {}",
        action_name,
        tile.id,
        resolution.matched_by()
    );

    execute_legacy_action(store, rng, &mut player, &mut tile, option_id, &action_name)
}

/// The combat moves this player's class and race unlock.
pub fn available_combat_moves(
    store: &GameStore,
    player_id: u64,
) -> Result<Vec<CombatMove>, GameError> {
    let player = store.get_player(player_id)?;
    catalog::eligible_combat_moves(store, &player)
}

/// Close the tile: link the closing action record, then flip
/// `action_taken` as the last write of the critical section.
pub fn complete_tile_action(
    store: &GameStore,
    tile: &mut TileRecord,
    action_record_id: u64,
) -> Result<(), GameError> {
    tile.action_record_id = Some(action_record_id);
    tile.action_taken = true;
    store.put_tile(tile.clone())
}

fn execute_combat_move(
    store: &GameStore,
    config: &GameConfig,
    rng: &mut StdRng,
    player: &mut PlayerRecord,
    tile: &mut TileRecord,
    combat_move: &CombatMove,
) -> Result<ActionOutcome, GameError> {
    let hp_before = player.hitpoints;
    let monster_before = tile.monster_current_hp.unwrap_or(config.monsters.fallback_hp);
    if tile.monster_current_hp.is_none() {
        // Rows written before monster HP was persisted get the fallback.
        tile.monster_max_hp = Some(config.monsters.fallback_hp);
        tile.monster_current_hp = Some(config.monsters.fallback_hp);
    }

    let roll = rng.gen_range(1..=100);
    let success = roll <= combat_move.success_rate;

    let mut damage_dealt = 0;
    let mut damage_received = 0;
    let mut tile_completed = false;

    let message = if !success {
        format!(
            "{} failed! (rolled {} vs {}% chance)",
            combat_move.name, roll, combat_move.success_rate
        )
    } else {
        let mut parts: Vec<String> = Vec::new();
        if combat_move.deals_damage() {
            let damage = rng.gen_range(combat_move.damage_min..=combat_move.damage_max);
            damage_dealt = tile.apply_monster_damage(damage);
            if !tile.is_monster_alive() {
                tile_completed = true;
                parts.push(format!(
                    "You hit for {} damage. The monster is defeated!",
                    damage
                ));
            } else {
                parts.push(format!("You hit for {} damage.", damage));
                if rng.gen_bool(0.5) {
                    let counter = rng.gen_range(COUNTER_DAMAGE_MIN..=COUNTER_DAMAGE_MAX);
                    damage_received = player.take_damage(counter);
                    parts.push(format!("The monster counter-attacks for {} damage!", counter));
                }
            }
        }
        if combat_move.heal_amount > 0 {
            let healed = player.heal(combat_move.heal_amount);
            parts.push(format!("You recover {} HP.", healed));
        }
        if combat_move.defense_boost > 0 {
            parts.push(format!("Your defense rises by {}.", combat_move.defense_boost));
        }
        if parts.is_empty() {
            format!("{}!", combat_move.name)
        } else {
            format!("{}! {}", combat_move.name, parts.join(" "))
        }
    };

    let record = store.lookup_or_create_action_record(tile.id, None, &combat_move.name)?;
    store.put_player(player.clone())?;

    let encounter = EncounterRecord {
        id: 0,
        tile_id: tile.id,
        player_id: player.id,
        combat_move_id: combat_move.id,
        player_hp_before: hp_before,
        player_hp_after: player.hitpoints,
        monster_hp_before: Some(monster_before),
        monster_hp_after: tile.monster_current_hp,
        damage_dealt,
        damage_received,
        was_successful: success,
        result_message: message.clone(),
        created_at: Utc::now(),
        schema_version: ENCOUNTER_SCHEMA_VERSION,
    };
    store.append_encounter(encounter)?;

    if tile_completed {
        complete_tile_action(store, tile, record.id)?;
    } else {
        store.put_tile(tile.clone())?;
    }

    debug!(
        "combat move {} on tile {}: success={} dealt={} received={} monster_hp={:?}",
        combat_move.code, tile.id, success, damage_dealt, damage_received, tile.monster_current_hp
    );

    Ok(ActionOutcome {
        success,
        message,
        action_name: combat_move.name.clone(),
        player_hp_after: player.hitpoints,
        player_hp_delta: player.hitpoints - hp_before,
        player_alive: player.is_alive(),
        tile_completed,
        monster_hp_after: tile.monster_current_hp,
        should_end_playthrough: false,
    })
}

fn execute_legacy_action(
    store: &GameStore,
    rng: &mut StdRng,
    player: &mut PlayerRecord,
    tile: &mut TileRecord,
    option_id: Option<u64>,
    action_name: &str,
) -> Result<ActionOutcome, GameError> {
    let hp_before = player.hitpoints;
    let tile_type_name = store
        .get_tile_type(tile.tile_type_id)?
        .map(|tile_type| tile_type.name)
        .unwrap_or_default();
    let on_monster = tile_type_name == "monster";

    let mut should_end_playthrough = false;
    let message = match action_name {
        "rest" => {
            if on_monster {
                // Half your current HP, but never a slap on the wrist.
                let damage = (((player.hitpoints as f64) * 0.5).round() as i32).max(10);
                player.take_damage(damage);
                format!("Resting near a monster is dangerous! You lost {} HP.", damage)
            } else {
                player.heal(10);
                "You rest and recover 10 HP.".to_string()
            }
        }
        "fight" => {
            let damage = rng.gen_range(5..=20);
            player.take_damage(damage);
            format!("You fought bravely and took {} damage!", damage)
        }
        "inspect" => {
            if on_monster {
                "You carefully observe the creature, learning its patterns.".to_string()
            } else if tile_type_name == "treasure" {
                if rng.gen_range(1..=100) == 1 {
                    let healed = player.max_hitpoints - player.hitpoints;
                    player.heal(healed);
                    format!(
                        "You found a magical healing artifact! Restored {} HP to full health!",
                        healed
                    )
                } else {
                    "You inspect the area and find hints of treasure nearby.".to_string()
                }
            } else {
                "You take a moment to examine your surroundings carefully.".to_string()
            }
        }
        "quit" => {
            should_end_playthrough = true;
            "You decide to retreat from this challenge.".to_string()
        }
        other => format!("Performed action: {}", other),
    };

    let record = store.lookup_or_create_action_record(tile.id, option_id, action_name)?;
    store.put_player(player.clone())?;
    complete_tile_action(store, tile, record.id)?;

    if should_end_playthrough {
        // Best effort: the retreat stands even if the bookkeeping fails.
        if let Err(err) = end_tile_playthrough(store, tile) {
            warn!(
                "failed to end playthrough {} during quit: {}",
                tile.playthrough_id, err
            );
        }
    }

    Ok(ActionOutcome {
        success: true,
        message,
        action_name: action_name.to_string(),
        player_hp_after: player.hitpoints,
        player_hp_delta: player.hitpoints - hp_before,
        player_alive: player.is_alive(),
        tile_completed: true,
        monster_hp_after: tile.monster_current_hp,
        should_end_playthrough,
    })
}

fn end_tile_playthrough(store: &GameStore, tile: &TileRecord) -> Result<(), GameError> {
    let mut run = store.get_playthrough(tile.player_id, tile.playthrough_id)?;
    if run.is_active() {
        run.ended_at = Some(Utc::now());
        store.put_playthrough(run)?;
    }
    Ok(())
}
