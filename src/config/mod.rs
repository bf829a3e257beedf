//! # Configuration Management Module
//!
//! Centralized configuration for the tile-walk engine: type-safe sections
//! with serde defaults, TOML persistence, and validation. Hosts load one
//! file at startup and pass the config down to the engine functions that
//! need tuning knobs.
//!
//! ## Configuration Structure
//!
//! - [`StorageConfig`] - where the sled store lives
//! - [`MonsterConfig`] - monster HP rolls and difficulty scaling
//! - [`PlayerConfig`] - new-character defaults
//! - [`PointsConfig`] - idle points accrual
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tilequest::config::GameConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = GameConfig::load("tilequest.toml")?;
//!     println!("data dir: {}", config.storage.data_dir);
//!
//!     // Write a starter file for new deployments
//!     GameConfig::create_default("tilequest.example.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//!
//! [monsters]
//! hp_min = 60
//! hp_max = 120
//! difficulty_multiplier = 1.0
//! fallback_hp = 50
//!
//! [players]
//! starting_hitpoints = 100
//!
//! [points]
//! accrual_per_hour = 5
//! ```
//!
//! Every field has a default, so a missing section or an empty file is a
//! valid configuration.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub monsters: MonsterConfig,
    #[serde(default)]
    pub players: PlayerConfig,
    #[serde(default)]
    pub points: PointsConfig,
}

/// Data persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the sled database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

/// Monster generation and difficulty settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonsterConfig {
    /// Lower bound of the monster max-HP roll, inclusive.
    #[serde(default = "default_hp_min")]
    pub hp_min: i32,
    /// Upper bound of the monster max-HP roll, inclusive.
    #[serde(default = "default_hp_max")]
    pub hp_max: i32,
    /// Scales the rolled HP; values above 1.0 make tougher monsters.
    #[serde(default = "default_difficulty_multiplier")]
    pub difficulty_multiplier: f32,
    /// HP assumed when a combat move targets a tile whose monster HP was
    /// never recorded (legacy rows).
    #[serde(default = "default_fallback_hp")]
    pub fallback_hp: i32,
}

/// New-character defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_starting_hitpoints")]
    pub starting_hitpoints: i32,
}

/// Idle points accrual settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointsConfig {
    /// Points granted per whole elapsed hour since the last accrual.
    #[serde(default = "default_accrual_per_hour")]
    pub accrual_per_hour: i32,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_hp_min() -> i32 {
    60
}

fn default_hp_max() -> i32 {
    120
}

fn default_difficulty_multiplier() -> f32 {
    1.0
}

fn default_fallback_hp() -> i32 {
    50
}

fn default_starting_hitpoints() -> i32 {
    100
}

fn default_accrual_per_hour() -> i32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            hp_min: default_hp_min(),
            hp_max: default_hp_max(),
            difficulty_multiplier: default_difficulty_multiplier(),
            fallback_hp: default_fallback_hp(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_hitpoints: default_starting_hitpoints(),
        }
    }
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            accrual_per_hour: default_accrual_per_hour(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            monsters: MonsterConfig::default(),
            players: PlayerConfig::default(),
            points: PointsConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        Self::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    /// Parse configuration from TOML text. Missing fields take defaults.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file.
    pub fn create_default(path: &str) -> Result<()> {
        let config = GameConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;
        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.monsters.hp_min < 1 {
            return Err(anyhow!("monsters.hp_min must be at least 1"));
        }
        if self.monsters.hp_max < self.monsters.hp_min {
            return Err(anyhow!(
                "monsters.hp_max ({}) must be >= monsters.hp_min ({})",
                self.monsters.hp_max,
                self.monsters.hp_min
            ));
        }
        if !self.monsters.difficulty_multiplier.is_finite()
            || self.monsters.difficulty_multiplier <= 0.0
        {
            return Err(anyhow!(
                "monsters.difficulty_multiplier must be a positive number"
            ));
        }
        if self.monsters.fallback_hp < 1 {
            return Err(anyhow!("monsters.fallback_hp must be at least 1"));
        }
        if self.players.starting_hitpoints < 1 {
            return Err(anyhow!("players.starting_hitpoints must be at least 1"));
        }
        if self.points.accrual_per_hour < 0 {
            return Err(anyhow!("points.accrual_per_hour must not be negative"));
        }
        Ok(())
    }
}
