//! Persisted record types for the tile-walk engine.
//!
//! Every record carries a `schema_version` stamped at creation; the storage
//! layer refuses to decode a record written by a different revision. HP
//! mutation goes through the clamped helpers on the records themselves so
//! no caller can push hitpoints below zero or above the maximum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PLAYER_SCHEMA_VERSION: u8 = 1;
pub const PLAYTHROUGH_SCHEMA_VERSION: u8 = 1;
pub const TILE_SCHEMA_VERSION: u8 = 1;
pub const ACTION_RECORD_SCHEMA_VERSION: u8 = 1;
pub const ENCOUNTER_SCHEMA_VERSION: u8 = 1;

// ============================================================================
// Player
// ============================================================================

/// A player's character sheet plus account bookkeeping.
///
/// `points` is the idle meta-currency accrued by wall-clock time; it is
/// deliberately outside the run-scoped stats that `restart` wipes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub id: u64,
    pub username: String,
    /// Argon2id PHC string; `None` until a password is set.
    pub password_hash: Option<String>,
    pub hitpoints: i32,
    pub max_hitpoints: i32,
    pub strength: i32,
    pub intelligence: i32,
    pub stealth: i32,
    pub level: i32,
    pub experience: i32,
    pub class_id: Option<u64>,
    pub race_id: Option<u64>,
    pub points: i32,
    /// High-water mark for points accrual; `None` before the first accrual
    /// call initializes the clock.
    pub points_accrued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PlayerRecord {
    pub fn new(id: u64, username: &str, starting_hitpoints: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.to_string(),
            password_hash: None,
            hitpoints: starting_hitpoints,
            max_hitpoints: starting_hitpoints,
            strength: 10,
            intelligence: 10,
            stealth: 10,
            level: 1,
            experience: 0,
            class_id: None,
            race_id: None,
            points: 0,
            points_accrued_at: None,
            created_at: now,
            updated_at: now,
            schema_version: PLAYER_SCHEMA_VERSION,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hitpoints > 0
    }

    /// Restore hitpoints, clamped to `max_hitpoints`. Negative amounts are
    /// treated as zero. Returns the HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        let before = self.hitpoints;
        self.hitpoints = (self.hitpoints + amount).min(self.max_hitpoints);
        self.hitpoints - before
    }

    /// Remove hitpoints, clamped at zero. Negative amounts are treated as
    /// zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        let before = self.hitpoints;
        self.hitpoints = (self.hitpoints - amount).max(0);
        before - self.hitpoints
    }

    /// Stamp `updated_at`; call before persisting a mutated record.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Playthrough
// ============================================================================

/// One run through the tile sequence. Active while `ended_at` is `None`;
/// a player has at most one active playthrough at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaythroughRecord {
    pub id: u64,
    pub player_id: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub schema_version: u8,
}

impl PlaythroughRecord {
    pub fn new(id: u64, player_id: u64) -> Self {
        Self {
            id,
            player_id,
            started_at: Utc::now(),
            ended_at: None,
            schema_version: PLAYTHROUGH_SCHEMA_VERSION,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

// ============================================================================
// Tile
// ============================================================================

/// One step of a playthrough. A tile accepts exactly one action; once
/// `action_taken` flips it is closed forever. Monster tiles additionally
/// carry persistent HP so combat can span several engine calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileRecord {
    pub id: u64,
    pub player_id: u64,
    pub playthrough_id: u64,
    pub tile_type_id: u64,
    /// Pre-rendered flavor text shown when the player arrives.
    pub content: String,
    pub action_taken: bool,
    /// Set when the closing action is recorded.
    pub action_record_id: Option<u64>,
    pub monster_max_hp: Option<i32>,
    pub monster_current_hp: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl TileRecord {
    pub fn new(id: u64, player_id: u64, playthrough_id: u64, tile_type_id: u64, content: &str) -> Self {
        Self {
            id,
            player_id,
            playthrough_id,
            tile_type_id,
            content: content.to_string(),
            action_taken: false,
            action_record_id: None,
            monster_max_hp: None,
            monster_current_hp: None,
            created_at: Utc::now(),
            schema_version: TILE_SCHEMA_VERSION,
        }
    }

    pub fn with_monster_hp(mut self, hp: i32) -> Self {
        self.monster_max_hp = Some(hp);
        self.monster_current_hp = Some(hp);
        self
    }

    /// True when this tile has a monster with HP remaining.
    pub fn is_monster_alive(&self) -> bool {
        matches!(self.monster_current_hp, Some(hp) if hp > 0)
    }

    /// Remaining monster HP as a 0–100 percentage, for health bars.
    pub fn monster_hp_percent(&self) -> Option<f32> {
        match (self.monster_current_hp, self.monster_max_hp) {
            (Some(current), Some(max)) if max > 0 => {
                Some((current.max(0) as f32 / max as f32) * 100.0)
            }
            _ => None,
        }
    }

    /// Apply damage to the monster, flooring current HP at zero. Returns
    /// the damage actually absorbed. No-op on tiles without a monster.
    pub fn apply_monster_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        match self.monster_current_hp {
            Some(current) => {
                let after = (current - amount).max(0);
                self.monster_current_hp = Some(after);
                current - after
            }
            None => 0,
        }
    }
}

// ============================================================================
// Action record
// ============================================================================

/// Audit row recording which kind of action was resolved against a tile.
/// One record exists per (tile, action kind); repeated resolutions reuse
/// it rather than stacking duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub id: u64,
    pub tile_id: u64,
    /// Catalog action this record resolved to; `None` for name-only
    /// fallbacks and combat moves.
    pub action_option_id: Option<u64>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl ActionRecord {
    pub fn new(id: u64, tile_id: u64, action_option_id: Option<u64>, name: &str) -> Self {
        Self {
            id,
            tile_id,
            action_option_id,
            name: name.to_string(),
            created_at: Utc::now(),
            schema_version: ACTION_RECORD_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// Encounter
// ============================================================================

/// Append-only combat log row: one per combat-move execution, carrying
/// before/after HP on both sides so history can be replayed without
/// re-deriving state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncounterRecord {
    pub id: u64,
    pub tile_id: u64,
    pub player_id: u64,
    pub combat_move_id: u64,
    pub player_hp_before: i32,
    pub player_hp_after: i32,
    pub monster_hp_before: Option<i32>,
    pub monster_hp_after: Option<i32>,
    pub damage_dealt: i32,
    pub damage_received: i32,
    pub was_successful: bool,
    pub result_message: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}
