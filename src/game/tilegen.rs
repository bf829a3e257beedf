//! Tile generation: rolls the type, renders the content line, and stamps
//! monster HP where applicable.
//!
//! Content is decided entirely at generation time and stored on the tile;
//! later reads never re-render. Monster tiles roll max HP inside the
//! configured band, scale it by the difficulty multiplier, and advertise
//! the final number in the content string so what the player reads always
//! matches the stored `monster_max_hp`.

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::GameConfig;
use crate::game::errors::GameError;
use crate::game::storage::GameStore;
use crate::game::types::TileRecord;

fn choose<'a>(rng: &mut StdRng, opts: &[&'a str]) -> &'a str {
    let i = rng.gen_range(0..opts.len());
    opts[i]
}

const MONSTER_NAMES: &[&str] = &["Elephant", "Giraffe", "Gryffon", "Dragon"];

const SIGN_OPENERS: &[&str] = &["Beware:", "Notice:", "Travelers!", "Heed this:", "Scrawled here:"];

const SIGN_SUBJECTS: &[&str] = &[
    "the toll bridge",
    "the old mill",
    "the witch's hollow",
    "the salt marsh",
    "the broken watchtower",
    "the king's road",
];

const SIGN_CLAIMS: &[&str] = &[
    "is closed until further notice",
    "belongs to the crows now",
    "floods when the moon is full",
    "has not been safe since winter",
    "charges double after dark",
    "hides more than it shows",
];

/// Compose a short procedural signpost line.
pub fn generate_signpost(rng: &mut StdRng) -> String {
    format!(
        "{} {} {}.",
        choose(rng, SIGN_OPENERS),
        choose(rng, SIGN_SUBJECTS),
        choose(rng, SIGN_CLAIMS)
    )
}

/// Roll a monster's max HP inside the configured band and scale it by the
/// difficulty multiplier (fraction dropped).
fn roll_monster_hp(config: &GameConfig, rng: &mut StdRng) -> i32 {
    let base = rng.gen_range(config.monsters.hp_min..=config.monsters.hp_max);
    (base as f32 * config.monsters.difficulty_multiplier) as i32
}

/// Create and persist the next tile of a playthrough.
///
/// When `tile_type_id` is `None` the type is drawn uniformly from the
/// catalog. Returns the stored record.
pub fn generate_tile(
    store: &GameStore,
    config: &GameConfig,
    rng: &mut StdRng,
    player_id: u64,
    playthrough_id: u64,
    tile_type_id: Option<u64>,
) -> Result<TileRecord, GameError> {
    let tile_type = match tile_type_id {
        Some(id) => store
            .get_tile_type(id)?
            .ok_or_else(|| GameError::NotFound(format!("tile type: {}", id)))?,
        None => {
            let types = store.list_tile_types()?;
            if types.is_empty() {
                return Err(GameError::Internal(
                    "tile type catalog is empty".to_string(),
                ));
            }
            let index = rng.gen_range(0..types.len());
            types[index].clone()
        }
    };

    let id = store.next_id()?;
    let tile = match tile_type.name.as_str() {
        "monster" => {
            let hp = roll_monster_hp(config, rng);
            let content = format!("{} ({} HP)", choose(rng, MONSTER_NAMES), hp);
            TileRecord::new(id, player_id, playthrough_id, tile_type.id, &content)
                .with_monster_hp(hp)
        }
        "sign" => {
            let content = generate_signpost(rng);
            TileRecord::new(id, player_id, playthrough_id, tile_type.id, &content)
        }
        "treasure" => TileRecord::new(
            id,
            player_id,
            playthrough_id,
            tile_type.id,
            "A battered chest sits half-buried in the dirt.",
        ),
        _ => TileRecord::new(
            id,
            player_id,
            playthrough_id,
            tile_type.id,
            "A quiet stretch of road. Nothing stirs.",
        ),
    };

    store.put_tile(tile.clone())?;
    debug!(
        "generated {} tile {} for player {} (playthrough {})",
        tile_type.name, tile.id, player_id, playthrough_id
    );
    Ok(tile)
}

/// The newest tile for a player, optionally scoped to one playthrough.
pub fn latest_tile(
    store: &GameStore,
    player_id: u64,
    playthrough_id: Option<u64>,
) -> Result<Option<TileRecord>, GameError> {
    store.latest_tile(player_id, playthrough_id)
}
