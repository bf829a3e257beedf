//! Tile-walk adventure engine: data model, persistence, and the
//! one-action-per-tile resolution rules.
//!
//! The store ([`GameStore`]) owns sled persistence, the seeded rule
//! catalog, and the in-process row locks; the manager modules
//! ([`playthrough`], [`combat`], [`player`], [`tilegen`]) are free
//! functions over a store handle so hosts can call the engine from any
//! request-handling shape they like.

pub mod catalog;
pub mod combat;
pub mod errors;
pub mod lock;
pub mod player;
pub mod playthrough;
pub mod storage;
pub mod tilegen;
pub mod types;

pub use catalog::{
    allowed_actions_for_tile_type, canonical_catalog_seed, eligible_combat_moves,
    resolve_action_option, ActionOption, ActionResolution, CatalogSeed, CombatMove, PlayerClass,
    PlayerRace, TileTypeOption,
};
pub use combat::{
    available_combat_moves, complete_tile_action, resolve_action, ActionOutcome,
};
pub use errors::GameError;
pub use lock::{LockTable, RowGuard};
pub use player::{
    accrue_points, apply_character_build, award_experience, grant_experience, set_character,
    spend_point,
};
pub use playthrough::{
    end_active_playthrough, get_active_playthrough, needs_new_tile, restart, start_journey,
};
pub use storage::{EncounterStats, GameStore, GameStoreBuilder};
pub use tilegen::{generate_signpost, generate_tile, latest_tile};
pub use types::*;
