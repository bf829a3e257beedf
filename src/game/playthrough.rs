//! Playthrough lifecycle: starting a run, walking it, ending it, and the
//! full restart.
//!
//! A player has at most one active playthrough. All lifecycle mutations
//! run under the player's row guard so a double-submitted "start" cannot
//! create two live runs.

use chrono::Utc;
use log::info;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::game::errors::GameError;
use crate::game::storage::GameStore;
use crate::game::tilegen;
use crate::game::types::{PlayerRecord, PlaythroughRecord, TileRecord};

/// Start a fresh playthrough and generate its first tile.
///
/// Fails with [`GameError::PlaythroughActive`] if the player already has
/// a live run; end or restart it first.
pub fn start_journey(
    store: &GameStore,
    config: &GameConfig,
    rng: &mut StdRng,
    player_id: u64,
) -> Result<(PlaythroughRecord, TileRecord), GameError> {
    let _guard = store.lock_player(player_id);
    let player = store.get_player(player_id)?;

    if let Some(active) = store.active_playthrough(player_id)? {
        return Err(GameError::PlaythroughActive(active.id));
    }

    let run = PlaythroughRecord::new(store.next_id()?, player_id);
    store.put_playthrough(run.clone())?;
    let tile = tilegen::generate_tile(store, config, rng, player_id, run.id, None)?;
    info!(
        "player {} started playthrough {} on tile {}",
        player.username, run.id, tile.id
    );
    Ok((run, tile))
}

/// The player's live run, if any.
pub fn get_active_playthrough(
    store: &GameStore,
    player_id: u64,
) -> Result<Option<PlaythroughRecord>, GameError> {
    store.active_playthrough(player_id)
}

/// Stamp the live run's end timestamp. Idempotent: returns `None` when
/// nothing was active.
pub fn end_active_playthrough(
    store: &GameStore,
    player_id: u64,
) -> Result<Option<PlaythroughRecord>, GameError> {
    let _guard = store.lock_player(player_id);
    let Some(mut run) = store.active_playthrough(player_id)? else {
        return Ok(None);
    };
    run.ended_at = Some(Utc::now());
    store.put_playthrough(run.clone())?;
    info!("player {} ended playthrough {}", player_id, run.id);
    Ok(Some(run))
}

/// True when the run needs its next tile generated: either no tile exists
/// yet or the newest one has consumed its action.
pub fn needs_new_tile(
    store: &GameStore,
    player_id: u64,
    playthrough_id: u64,
) -> Result<bool, GameError> {
    let latest = store.latest_tile(player_id, Some(playthrough_id))?;
    Ok(latest.map_or(true, |tile| tile.action_taken))
}

/// Wipe the player's adventure and hand back a fresh sheet.
///
/// Ends the live run, deletes every tile and encounter, and resets the
/// character (stats, HP, level, experience, class and race). The points
/// wallet and its accrual clock survive; they are earned by wall-clock
/// time, not by the run.
pub fn restart(
    store: &GameStore,
    config: &GameConfig,
    player_id: u64,
) -> Result<PlayerRecord, GameError> {
    let _guard = store.lock_player(player_id);
    let mut player = store.get_player(player_id)?;

    if let Some(mut run) = store.active_playthrough(player_id)? {
        run.ended_at = Some(Utc::now());
        store.put_playthrough(run)?;
    }
    let tiles = store.delete_player_tiles(player_id)?;
    let encounters = store.delete_player_encounters(player_id)?;

    player.strength = 10;
    player.intelligence = 10;
    player.stealth = 10;
    player.level = 1;
    player.experience = 0;
    player.class_id = None;
    player.race_id = None;
    player.max_hitpoints = config.players.starting_hitpoints;
    player.hitpoints = config.players.starting_hitpoints;
    store.put_player(player.clone())?;

    info!(
        "player {} restarted: {} tiles and {} encounters cleared",
        player.username, tiles, encounters
    );
    Ok(player)
}
