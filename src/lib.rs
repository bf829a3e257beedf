//! # Tilequest - Tile-Walk Adventure Engine
//!
//! Tilequest is the rules and persistence core of a linear tile-walk
//! adventure: a player starts a playthrough, walks a sequence of randomly
//! typed tiles (scene, monster, sign, treasure), and resolves exactly one
//! action per tile. Monster tiles carry persistent HP, so a fight can
//! span many requests. The crate is a plain synchronous library; web or
//! chat hosts own sessions, routing, and templating and call down into
//! these functions.
//!
//! ## Features
//!
//! - **One action per tile**: in-process row guards plus a persisted
//!   `action_taken` flag make resolution at-most-once even under
//!   concurrent double-submits.
//! - **Persistent combat**: monster HP lives on the tile; combat moves
//!   roll success and damage, monsters counter-attack, and every
//!   execution is logged to an append-only encounter history.
//! - **Rule catalog**: actions, tile types, classes, races, and combat
//!   moves are seeded data, with class/race gating and per-tile-type
//!   action filtering resolved against the catalog at runtime.
//! - **Character sheets**: class/race stat builds, 1.5× level-ups, idle
//!   points accrual, and argon2id password storage on the player record.
//! - **Embedded persistence**: everything is bincode records in sled
//!   trees with schema-version checks on read; no external database.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use tilequest::config::GameConfig;
//! use tilequest::game::{self, GameStoreBuilder};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = GameConfig::load("tilequest.toml")?;
//!     let store = GameStoreBuilder::new(&config.storage.data_dir).open()?;
//!     let mut rng = StdRng::from_entropy();
//!
//!     let player = store.create_player("ada", config.players.starting_hitpoints)?;
//!     let (run, tile) = game::start_journey(&store, &config, &mut rng, player.id)?;
//!     println!("tile {}: {}", tile.id, tile.content);
//!
//!     let outcome =
//!         game::resolve_action(&store, &config, &mut rng, player.id, tile.id, "rest", None)?;
//!     println!("{} (HP {})", outcome.message, outcome.player_hp_after);
//!
//!     game::end_active_playthrough(&store, player.id)?;
//!     let _ = run;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - the engine: storage, catalog, locks, and the manager
//!   modules for playthroughs, tiles, combat, and character sheets
//! - [`config`] - TOML configuration with defaults and validation

pub mod config;
pub mod game;

pub use config::GameConfig;
pub use game::errors::GameError;
