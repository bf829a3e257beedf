//! Sled-backed persistence for players, playthroughs, tiles, and combat
//! history, plus the seeded rule catalog.
//!
//! Records are bincode-encoded under string keys with zero-padded numeric
//! suffixes, so prefix scans walk a family in id order and the newest row
//! is always last. Ids come from sled's monotonic id generator. Reads of
//! single records verify the stored `schema_version` before handing the
//! record out.
//!
//! The store also owns the in-process [`LockTable`]; `lock_tile` and
//! `lock_player` are the only sanctioned way to start a read-check-write
//! sequence against those rows.

use std::path::{Path, PathBuf};

use argon2::Argon2;
use chrono::Utc;
use password_hash::{PasswordHasher, PasswordVerifier};
use serde::Serialize;
use sled::IVec;

use crate::game::catalog::{
    canonical_catalog_seed, ActionOption, CombatMove, PlayerClass, PlayerRace, TileTypeOption,
    CATALOG_SCHEMA_VERSION,
};
use crate::game::errors::GameError;
use crate::game::lock::{LockTable, RowGuard, FAMILY_PLAYERS, FAMILY_TILES};
use crate::game::types::{
    ActionRecord, EncounterRecord, PlayerRecord, PlaythroughRecord, TileRecord,
    ACTION_RECORD_SCHEMA_VERSION, ENCOUNTER_SCHEMA_VERSION, PLAYER_SCHEMA_VERSION,
    PLAYTHROUGH_SCHEMA_VERSION, TILE_SCHEMA_VERSION,
};

const TREE_PRIMARY: &str = "tilequest";
const TREE_CATALOG: &str = "tilequest_catalog";
const TREE_HISTORY: &str = "tilequest_history";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct GameStoreBuilder {
    path: PathBuf,
    ensure_catalog_seed: bool,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ensure_catalog_seed: true,
        }
    }

    /// Opt out of seeding the rule catalog during initialization (useful
    /// for targeted tests).
    pub fn without_catalog_seed(mut self) -> Self {
        self.ensure_catalog_seed = false;
        self
    }

    pub fn open(self) -> Result<GameStore, GameError> {
        GameStore::open_with_options(self.path, self.ensure_catalog_seed)
    }
}

/// Aggregated combat history for a player, for profile pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EncounterStats {
    pub total: usize,
    pub successful: usize,
    pub total_damage_dealt: i64,
    pub total_damage_received: i64,
}

impl EncounterStats {
    /// Share of successful executions, as a 0–100 percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.successful as f64 / self.total as f64) * 100.0
        }
    }
}

/// Sled-backed store for all engine state.
pub struct GameStore {
    db: sled::Db,
    primary: sled::Tree,
    catalog: sled::Tree,
    history: sled::Tree,
    locks: LockTable,
    argon2: Argon2<'static>,
}

impl GameStore {
    /// Open (or create) the game store rooted at `path`. The canonical
    /// rule catalog is inserted if no catalog rows exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, seed_catalog: bool) -> Result<Self, GameError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let primary = db.open_tree(TREE_PRIMARY)?;
        let catalog = db.open_tree(TREE_CATALOG)?;
        let history = db.open_tree(TREE_HISTORY)?;
        let store = Self {
            db,
            primary,
            catalog,
            history,
            locks: LockTable::new(),
            argon2: Argon2::default(),
        };

        if seed_catalog {
            store.seed_catalog_if_needed()?;
        }

        Ok(store)
    }

    // ------------------------------------------------------------------
    // Keys and codec helpers
    // ------------------------------------------------------------------

    fn player_key(id: u64) -> Vec<u8> {
        format!("players:{:020}", id).into_bytes()
    }

    fn username_key(username: &str) -> Vec<u8> {
        format!("usernames:{}", username.to_ascii_lowercase()).into_bytes()
    }

    fn run_key(player_id: u64, id: u64) -> Vec<u8> {
        format!("runs:{:020}:{:020}", player_id, id).into_bytes()
    }

    fn run_prefix(player_id: u64) -> Vec<u8> {
        format!("runs:{:020}:", player_id).into_bytes()
    }

    fn tile_key(player_id: u64, id: u64) -> Vec<u8> {
        format!("tiles:{:020}:{:020}", player_id, id).into_bytes()
    }

    fn tile_prefix(player_id: u64) -> Vec<u8> {
        format!("tiles:{:020}:", player_id).into_bytes()
    }

    fn action_record_key(tile_id: u64, option_id: Option<u64>, name: &str) -> Vec<u8> {
        // One key per (tile, action kind): catalog-backed kinds key on the
        // option id, everything else on the lowercased name.
        let kind = match option_id {
            Some(option_id) => format!("option:{:020}", option_id),
            None => format!("name:{}", name.to_ascii_lowercase()),
        };
        format!("action_records:{:020}:{}", tile_id, kind).into_bytes()
    }

    fn action_record_prefix(tile_id: u64) -> Vec<u8> {
        format!("action_records:{:020}:", tile_id).into_bytes()
    }

    fn encounter_key(player_id: u64, id: u64) -> Vec<u8> {
        format!("encounters:{:020}:{:020}", player_id, id).into_bytes()
    }

    fn encounter_prefix(player_id: u64) -> Vec<u8> {
        format!("encounters:{:020}:", player_id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GameError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, GameError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn list_prefix<T: serde::de::DeserializeOwned>(
        tree: &sled::Tree,
        prefix: &[u8],
    ) -> Result<Vec<T>, GameError> {
        tree.scan_prefix(prefix)
            .map(|entry| {
                entry
                    .map_err(GameError::from)
                    .and_then(|(_key, value)| Self::deserialize(value))
            })
            .collect()
    }

    /// Allocate the next record id from sled's monotonic generator.
    pub fn next_id(&self) -> Result<u64, GameError> {
        Ok(self.db.generate_id()?)
    }

    // ------------------------------------------------------------------
    // Row locks
    // ------------------------------------------------------------------

    /// Acquire the tile's row lock, then fetch it. Everything between this
    /// call and dropping the guard is the tile's critical section. Paths
    /// that also need the player guard must take it after this one.
    pub fn lock_tile(
        &self,
        player_id: u64,
        tile_id: u64,
    ) -> Result<(RowGuard, TileRecord), GameError> {
        let guard = self.locks.acquire(FAMILY_TILES, tile_id);
        let tile = self.get_tile(player_id, tile_id)?;
        Ok((guard, tile))
    }

    /// Acquire the player's row lock.
    pub fn lock_player(&self, player_id: u64) -> RowGuard {
        self.locks.acquire(FAMILY_PLAYERS, player_id)
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Create a player with a unique username. The username index entry is
    /// claimed with compare-and-swap, so concurrent registrations of the
    /// same name cannot both win.
    pub fn create_player(
        &self,
        username: &str,
        starting_hitpoints: i32,
    ) -> Result<PlayerRecord, GameError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(GameError::Internal("username cannot be empty".to_string()));
        }

        let id = self.next_id()?;
        let index_key = Self::username_key(trimmed);
        let claim = self.primary.compare_and_swap(
            index_key,
            None as Option<&[u8]>,
            Some(id.to_be_bytes().to_vec()),
        )?;
        if claim.is_err() {
            return Err(GameError::UsernameTaken(trimmed.to_string()));
        }

        let player = PlayerRecord::new(id, trimmed, starting_hitpoints);
        let bytes = Self::serialize(&player)?;
        self.primary.insert(Self::player_key(id), bytes)?;
        self.primary.flush()?;
        Ok(player)
    }

    /// Insert or update a player record.
    pub fn put_player(&self, mut player: PlayerRecord) -> Result<(), GameError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        player.touch();
        let key = Self::player_key(player.id);
        let bytes = Self::serialize(&player)?;
        self.primary.insert(key, bytes)?;
        self.primary.flush()?;
        Ok(())
    }

    /// Fetch a player record by id.
    pub fn get_player(&self, id: u64) -> Result<PlayerRecord, GameError> {
        let key = Self::player_key(id);
        let Some(bytes) = self.primary.get(&key)? else {
            return Err(GameError::NotFound(format!("player: {}", id)));
        };
        let record: PlayerRecord = Self::deserialize(bytes)?;
        if record.schema_version != PLAYER_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "player",
                expected: PLAYER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Look a player up through the username index.
    pub fn find_player_by_username(
        &self,
        username: &str,
    ) -> Result<Option<PlayerRecord>, GameError> {
        let Some(bytes) = self.primary.get(Self::username_key(username))? else {
            return Ok(None);
        };
        let mut id_bytes = [0u8; 8];
        if bytes.len() != 8 {
            return Err(GameError::Internal(format!(
                "corrupt username index entry for {}",
                username
            )));
        }
        id_bytes.copy_from_slice(&bytes);
        Ok(Some(self.get_player(u64::from_be_bytes(id_bytes))?))
    }

    /// Hash and store a password on the player record (argon2id).
    pub fn set_player_password(&self, player_id: u64, password: &str) -> Result<(), GameError> {
        if password.len() < 8 {
            return Err(GameError::CredentialHash(
                "password must be at least 8 characters".to_string(),
            ));
        }
        let mut player = self.get_player(player_id)?;
        let salt = password_hash::SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| GameError::CredentialHash(e.to_string()))?;
        player.password_hash = Some(hash.to_string());
        self.put_player(player)
    }

    /// Verify a password against the stored hash. Players without a stored
    /// hash never verify.
    pub fn verify_player_password(
        &self,
        player_id: u64,
        password: &str,
    ) -> Result<bool, GameError> {
        let player = self.get_player(player_id)?;
        let Some(stored) = &player.password_hash else {
            return Ok(false);
        };
        let parsed = password_hash::PasswordHash::new(stored)
            .map_err(|e| GameError::CredentialHash(e.to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    // ------------------------------------------------------------------
    // Playthroughs
    // ------------------------------------------------------------------

    /// Insert or update a playthrough record.
    pub fn put_playthrough(&self, mut run: PlaythroughRecord) -> Result<(), GameError> {
        run.schema_version = PLAYTHROUGH_SCHEMA_VERSION;
        let key = Self::run_key(run.player_id, run.id);
        let bytes = Self::serialize(&run)?;
        self.primary.insert(key, bytes)?;
        self.primary.flush()?;
        Ok(())
    }

    pub fn get_playthrough(
        &self,
        player_id: u64,
        playthrough_id: u64,
    ) -> Result<PlaythroughRecord, GameError> {
        let key = Self::run_key(player_id, playthrough_id);
        let Some(bytes) = self.primary.get(&key)? else {
            return Err(GameError::NotFound(format!(
                "playthrough: {}",
                playthrough_id
            )));
        };
        let record: PlaythroughRecord = Self::deserialize(bytes)?;
        if record.schema_version != PLAYTHROUGH_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "playthrough",
                expected: PLAYTHROUGH_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// All of a player's playthroughs, oldest first.
    pub fn list_playthroughs(&self, player_id: u64) -> Result<Vec<PlaythroughRecord>, GameError> {
        Self::list_prefix(&self.primary, &Self::run_prefix(player_id))
    }

    /// The player's most recently started playthrough with no end
    /// timestamp, if any.
    pub fn active_playthrough(
        &self,
        player_id: u64,
    ) -> Result<Option<PlaythroughRecord>, GameError> {
        let runs = self.list_playthroughs(player_id)?;
        Ok(runs.into_iter().filter(|run| run.is_active()).next_back())
    }

    // ------------------------------------------------------------------
    // Tiles
    // ------------------------------------------------------------------

    /// Insert or update a tile record.
    pub fn put_tile(&self, mut tile: TileRecord) -> Result<(), GameError> {
        tile.schema_version = TILE_SCHEMA_VERSION;
        let key = Self::tile_key(tile.player_id, tile.id);
        let bytes = Self::serialize(&tile)?;
        self.primary.insert(key, bytes)?;
        self.primary.flush()?;
        Ok(())
    }

    pub fn get_tile(&self, player_id: u64, tile_id: u64) -> Result<TileRecord, GameError> {
        let key = Self::tile_key(player_id, tile_id);
        let Some(bytes) = self.primary.get(&key)? else {
            return Err(GameError::NotFound(format!("tile: {}", tile_id)));
        };
        let record: TileRecord = Self::deserialize(bytes)?;
        if record.schema_version != TILE_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "tile",
                expected: TILE_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// The newest tile for a player, optionally restricted to one
    /// playthrough. Keys are id-ordered, so the last match wins.
    pub fn latest_tile(
        &self,
        player_id: u64,
        playthrough_id: Option<u64>,
    ) -> Result<Option<TileRecord>, GameError> {
        let tiles: Vec<TileRecord> = Self::list_prefix(&self.primary, &Self::tile_prefix(player_id))?;
        Ok(tiles
            .into_iter()
            .filter(|tile| playthrough_id.map_or(true, |id| tile.playthrough_id == id))
            .next_back())
    }

    /// Remove every tile belonging to the player. Returns how many were
    /// deleted. Callers wanting a full wipe also delete the encounters.
    pub fn delete_player_tiles(&self, player_id: u64) -> Result<usize, GameError> {
        let mut keys = Vec::new();
        for entry in self.primary.scan_prefix(&Self::tile_prefix(player_id)) {
            let (key, _) = entry?;
            keys.push(key);
        }
        for key in &keys {
            self.primary.remove(key)?;
        }
        self.primary.flush()?;
        Ok(keys.len())
    }

    // ------------------------------------------------------------------
    // Action records
    // ------------------------------------------------------------------

    /// Fetch the action record for `(tile, action kind)`, creating it on
    /// first use. Repeated resolutions of the same kind against the same
    /// tile converge on one record.
    pub fn lookup_or_create_action_record(
        &self,
        tile_id: u64,
        action_option_id: Option<u64>,
        name: &str,
    ) -> Result<ActionRecord, GameError> {
        let key = Self::action_record_key(tile_id, action_option_id, name);
        if let Some(bytes) = self.history.get(&key)? {
            let record: ActionRecord = Self::deserialize(bytes)?;
            if record.schema_version != ACTION_RECORD_SCHEMA_VERSION {
                return Err(GameError::SchemaMismatch {
                    entity: "action_record",
                    expected: ACTION_RECORD_SCHEMA_VERSION,
                    found: record.schema_version,
                });
            }
            return Ok(record);
        }

        let record = ActionRecord::new(self.next_id()?, tile_id, action_option_id, name);
        let bytes = Self::serialize(&record)?;
        self.history.insert(key, bytes)?;
        self.history.flush()?;
        Ok(record)
    }

    /// All action records created against a tile, oldest first.
    pub fn list_action_records(&self, tile_id: u64) -> Result<Vec<ActionRecord>, GameError> {
        Self::list_prefix(&self.history, &Self::action_record_prefix(tile_id))
    }

    // ------------------------------------------------------------------
    // Encounters
    // ------------------------------------------------------------------

    /// Append a combat log row. The record's id is assigned here; the
    /// assigned id is returned.
    pub fn append_encounter(&self, mut encounter: EncounterRecord) -> Result<u64, GameError> {
        encounter.id = self.next_id()?;
        encounter.schema_version = ENCOUNTER_SCHEMA_VERSION;
        let key = Self::encounter_key(encounter.player_id, encounter.id);
        let bytes = Self::serialize(&encounter)?;
        self.history.insert(key, bytes)?;
        self.history.flush()?;
        Ok(encounter.id)
    }

    /// A player's combat history, newest first, with pagination.
    pub fn list_encounters(
        &self,
        player_id: u64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<EncounterRecord>, GameError> {
        let mut rows: Vec<EncounterRecord> =
            Self::list_prefix(&self.history, &Self::encounter_prefix(player_id))?;
        rows.reverse();
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    pub fn count_encounters(&self, player_id: u64) -> Result<usize, GameError> {
        let count = self
            .history
            .scan_prefix(&Self::encounter_prefix(player_id))
            .count();
        Ok(count)
    }

    /// Aggregate a player's whole combat history.
    pub fn encounter_stats(&self, player_id: u64) -> Result<EncounterStats, GameError> {
        let rows: Vec<EncounterRecord> =
            Self::list_prefix(&self.history, &Self::encounter_prefix(player_id))?;
        let mut stats = EncounterStats {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            if row.was_successful {
                stats.successful += 1;
            }
            stats.total_damage_dealt += row.damage_dealt as i64;
            stats.total_damage_received += row.damage_received as i64;
        }
        Ok(stats)
    }

    /// Remove every encounter belonging to the player. Returns how many
    /// were deleted.
    pub fn delete_player_encounters(&self, player_id: u64) -> Result<usize, GameError> {
        let mut keys = Vec::new();
        for entry in self.history.scan_prefix(&Self::encounter_prefix(player_id)) {
            let (key, _) = entry?;
            keys.push(key);
        }
        for key in &keys {
            self.history.remove(key)?;
        }
        self.history.flush()?;
        Ok(keys.len())
    }

    // ------------------------------------------------------------------
    // Rule catalog
    // ------------------------------------------------------------------

    pub fn put_action_option(&self, mut option: ActionOption) -> Result<(), GameError> {
        option.schema_version = CATALOG_SCHEMA_VERSION;
        let key = format!("actions:{:020}", option.id).into_bytes();
        let bytes = Self::serialize(&option)?;
        self.catalog.insert(key, bytes)?;
        self.catalog.flush()?;
        Ok(())
    }

    pub fn get_action_option(&self, id: u64) -> Result<Option<ActionOption>, GameError> {
        let key = format!("actions:{:020}", id).into_bytes();
        let Some(bytes) = self.catalog.get(&key)? else {
            return Ok(None);
        };
        let record: ActionOption = Self::deserialize(bytes)?;
        if record.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "action_option",
                expected: CATALOG_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }

    pub fn action_option_by_code(&self, code: &str) -> Result<Option<ActionOption>, GameError> {
        Ok(self
            .list_action_options()?
            .into_iter()
            .find(|option| option.code == code))
    }

    pub fn action_option_by_name(&self, name: &str) -> Result<Option<ActionOption>, GameError> {
        Ok(self
            .list_action_options()?
            .into_iter()
            .find(|option| option.name == name))
    }

    pub fn list_action_options(&self) -> Result<Vec<ActionOption>, GameError> {
        Self::list_prefix(&self.catalog, b"actions:")
    }

    pub fn put_tile_type(&self, mut tile_type: TileTypeOption) -> Result<(), GameError> {
        tile_type.schema_version = CATALOG_SCHEMA_VERSION;
        let key = format!("tile_types:{:020}", tile_type.id).into_bytes();
        let bytes = Self::serialize(&tile_type)?;
        self.catalog.insert(key, bytes)?;
        self.catalog.flush()?;
        Ok(())
    }

    pub fn get_tile_type(&self, id: u64) -> Result<Option<TileTypeOption>, GameError> {
        let key = format!("tile_types:{:020}", id).into_bytes();
        let Some(bytes) = self.catalog.get(&key)? else {
            return Ok(None);
        };
        let record: TileTypeOption = Self::deserialize(bytes)?;
        if record.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "tile_type",
                expected: CATALOG_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }

    pub fn tile_type_by_name(&self, name: &str) -> Result<Option<TileTypeOption>, GameError> {
        Ok(self
            .list_tile_types()?
            .into_iter()
            .find(|tile_type| tile_type.name == name))
    }

    pub fn list_tile_types(&self) -> Result<Vec<TileTypeOption>, GameError> {
        Self::list_prefix(&self.catalog, b"tile_types:")
    }

    pub fn put_player_class(&self, mut class: PlayerClass) -> Result<(), GameError> {
        class.schema_version = CATALOG_SCHEMA_VERSION;
        let key = format!("classes:{:020}", class.id).into_bytes();
        let bytes = Self::serialize(&class)?;
        self.catalog.insert(key, bytes)?;
        self.catalog.flush()?;
        Ok(())
    }

    pub fn get_player_class(&self, id: u64) -> Result<Option<PlayerClass>, GameError> {
        let key = format!("classes:{:020}", id).into_bytes();
        let Some(bytes) = self.catalog.get(&key)? else {
            return Ok(None);
        };
        Ok(Some(Self::deserialize(bytes)?))
    }

    pub fn player_class_by_name(&self, name: &str) -> Result<Option<PlayerClass>, GameError> {
        Ok(self
            .list_player_classes()?
            .into_iter()
            .find(|class| class.name == name))
    }

    pub fn list_player_classes(&self) -> Result<Vec<PlayerClass>, GameError> {
        Self::list_prefix(&self.catalog, b"classes:")
    }

    pub fn put_player_race(&self, mut race: PlayerRace) -> Result<(), GameError> {
        race.schema_version = CATALOG_SCHEMA_VERSION;
        let key = format!("races:{:020}", race.id).into_bytes();
        let bytes = Self::serialize(&race)?;
        self.catalog.insert(key, bytes)?;
        self.catalog.flush()?;
        Ok(())
    }

    pub fn get_player_race(&self, id: u64) -> Result<Option<PlayerRace>, GameError> {
        let key = format!("races:{:020}", id).into_bytes();
        let Some(bytes) = self.catalog.get(&key)? else {
            return Ok(None);
        };
        Ok(Some(Self::deserialize(bytes)?))
    }

    pub fn player_race_by_name(&self, name: &str) -> Result<Option<PlayerRace>, GameError> {
        Ok(self
            .list_player_races()?
            .into_iter()
            .find(|race| race.name == name))
    }

    pub fn list_player_races(&self) -> Result<Vec<PlayerRace>, GameError> {
        Self::list_prefix(&self.catalog, b"races:")
    }

    pub fn put_combat_move(&self, mut combat_move: CombatMove) -> Result<(), GameError> {
        combat_move.schema_version = CATALOG_SCHEMA_VERSION;
        let key = format!("moves:{:020}", combat_move.id).into_bytes();
        let bytes = Self::serialize(&combat_move)?;
        self.catalog.insert(key, bytes)?;
        self.catalog.flush()?;
        Ok(())
    }

    pub fn get_combat_move(&self, id: u64) -> Result<Option<CombatMove>, GameError> {
        let key = format!("moves:{:020}", id).into_bytes();
        let Some(bytes) = self.catalog.get(&key)? else {
            return Ok(None);
        };
        let record: CombatMove = Self::deserialize(bytes)?;
        if record.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "combat_move",
                expected: CATALOG_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }

    pub fn combat_move_by_code(&self, code: &str) -> Result<Option<CombatMove>, GameError> {
        Ok(self
            .list_combat_moves()?
            .into_iter()
            .find(|combat_move| combat_move.code == code))
    }

    pub fn list_combat_moves(&self) -> Result<Vec<CombatMove>, GameError> {
        Self::list_prefix(&self.catalog, b"moves:")
    }

    /// Insert the canonical rule catalog if the catalog tree is empty.
    /// Returns how many rows were inserted (0 when already seeded).
    pub fn seed_catalog_if_needed(&self) -> Result<usize, GameError> {
        if self.catalog.scan_prefix(b"actions:").next().is_some() {
            return Ok(0);
        }
        let seed = canonical_catalog_seed(Utc::now());
        let mut inserted = 0usize;
        for option in seed.actions {
            self.put_action_option(option)?;
            inserted += 1;
        }
        for tile_type in seed.tile_types {
            self.put_tile_type(tile_type)?;
            inserted += 1;
        }
        for class in seed.classes {
            self.put_player_class(class)?;
            inserted += 1;
        }
        for race in seed.races {
            self.put_player_race(race)?;
            inserted += 1;
        }
        for combat_move in seed.moves {
            self.put_combat_move(combat_move)?;
            inserted += 1;
        }
        Ok(inserted)
    }
}
