//! Rule catalog: the reference data every resolution consults.
//!
//! Four small vocabularies (action options, tile types, classes, races)
//! plus the combat-move table live in the store and are seeded once at
//! open. Ids are fixed by the canonical seed so cross-references such as
//! `CombatMove::requires_class` stay stable across databases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::errors::GameError;
use crate::game::storage::GameStore;
use crate::game::types::PlayerRecord;

pub const CATALOG_SCHEMA_VERSION: u8 = 1;

/// Canonical tile type ids. The names are what gameplay rules key on.
pub const TILE_TYPE_SCENE_ID: u64 = 1;
pub const TILE_TYPE_MONSTER_ID: u64 = 2;
pub const TILE_TYPE_SIGN_ID: u64 = 3;
pub const TILE_TYPE_TREASURE_ID: u64 = 4;

/// Canonical class ids referenced by combat-move gating.
pub const CLASS_WITCH_ID: u64 = 1;
pub const CLASS_FIGHTER_ID: u64 = 2;
pub const CLASS_HEALER_ID: u64 = 3;

/// Canonical race ids referenced by combat-move gating.
pub const RACE_HUMAN_ID: u64 = 1;
pub const RACE_ELF_ID: u64 = 2;
pub const RACE_PANDARIAN_ID: u64 = 3;

// ============================================================================
// Catalog rows
// ============================================================================

/// A legacy action the player can take on a tile (rest, inspect, fight,
/// quit). `code` is the stable machine identifier; `name` is display text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionOption {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl ActionOption {
    pub fn new(id: u64, code: &str, name: &str, description: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            schema_version: CATALOG_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileTypeOption {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl TileTypeOption {
    pub fn new(id: u64, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at: now,
            schema_version: CATALOG_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerClass {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PlayerClass {
    pub fn new(id: u64, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at: now,
            schema_version: CATALOG_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRace {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PlayerRace {
    pub fn new(id: u64, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at: now,
            schema_version: CATALOG_SCHEMA_VERSION,
        }
    }
}

/// One row of the combat-move table. Damage rolls uniformly in
/// `damage_min..=damage_max` when `damage_max > 0`; `success_rate` is a
/// percentage checked with a d100 before any effect lands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombatMove {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub damage_min: i32,
    pub damage_max: i32,
    pub heal_amount: i32,
    pub defense_boost: i32,
    pub success_rate: i32,
    /// Class required to use the move; `None` means open to all classes.
    pub requires_class: Option<u64>,
    /// Race required to use the move; `None` means open to all races.
    pub requires_race: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl CombatMove {
    pub fn new(id: u64, code: &str, name: &str, description: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            damage_min: 0,
            damage_max: 0,
            heal_amount: 0,
            defense_boost: 0,
            success_rate: 100,
            requires_class: None,
            requires_race: None,
            created_at: now,
            schema_version: CATALOG_SCHEMA_VERSION,
        }
    }

    pub fn with_damage(mut self, min: i32, max: i32) -> Self {
        self.damage_min = min;
        self.damage_max = max;
        self
    }

    pub fn with_heal(mut self, amount: i32) -> Self {
        self.heal_amount = amount;
        self
    }

    pub fn with_defense(mut self, boost: i32) -> Self {
        self.defense_boost = boost;
        self
    }

    pub fn with_success_rate(mut self, rate: i32) -> Self {
        self.success_rate = rate;
        self
    }

    pub fn for_class(mut self, class_id: u64) -> Self {
        self.requires_class = Some(class_id);
        self
    }

    pub fn for_race(mut self, race_id: u64) -> Self {
        self.requires_race = Some(race_id);
        self
    }

    pub fn deals_damage(&self) -> bool {
        self.damage_max > 0
    }
}

// ============================================================================
// Canonical seed
// ============================================================================

/// Everything `seed_catalog_if_needed` inserts into a fresh store.
#[derive(Debug, Clone)]
pub struct CatalogSeed {
    pub actions: Vec<ActionOption>,
    pub tile_types: Vec<TileTypeOption>,
    pub classes: Vec<PlayerClass>,
    pub races: Vec<PlayerRace>,
    pub moves: Vec<CombatMove>,
}

/// The canonical rule catalog. Ids are load-bearing: gameplay code and
/// saved records reference them, so rows keep their positions forever and
/// new rows only ever append.
pub fn canonical_catalog_seed(now: DateTime<Utc>) -> CatalogSeed {
    let actions = vec![
        ActionOption::new(1, "rest", "rest", "Catch your breath and recover.", now),
        ActionOption::new(2, "inspect", "inspect", "Look closely at your surroundings.", now),
        ActionOption::new(3, "fight", "fight", "Throw yourself at whatever is here.", now),
        ActionOption::new(4, "quit", "quit", "Retreat and end the journey.", now),
    ];

    let tile_types = vec![
        TileTypeOption::new(TILE_TYPE_SCENE_ID, "scene", now),
        TileTypeOption::new(TILE_TYPE_MONSTER_ID, "monster", now),
        TileTypeOption::new(TILE_TYPE_SIGN_ID, "sign", now),
        TileTypeOption::new(TILE_TYPE_TREASURE_ID, "treasure", now),
    ];

    let classes = vec![
        PlayerClass::new(CLASS_WITCH_ID, "witch", now),
        PlayerClass::new(CLASS_FIGHTER_ID, "fighter", now),
        PlayerClass::new(CLASS_HEALER_ID, "healer", now),
    ];

    let races = vec![
        PlayerRace::new(RACE_HUMAN_ID, "Human", now),
        PlayerRace::new(RACE_ELF_ID, "Elf", now),
        PlayerRace::new(RACE_PANDARIAN_ID, "Pandarian", now),
    ];

    let moves = vec![
        CombatMove::new(1, "attack_light", "Light Attack", "A quick, reliable strike.", now)
            .with_damage(5, 10)
            .with_success_rate(95),
        CombatMove::new(2, "attack_heavy", "Heavy Attack", "A slow swing that hits hard when it lands.", now)
            .with_damage(10, 20)
            .with_success_rate(70),
        CombatMove::new(3, "defend", "Defend", "Brace behind your guard.", now)
            .with_defense(5)
            .with_success_rate(100),
        CombatMove::new(4, "heal", "Heal", "Bind your wounds mid-fight.", now)
            .with_heal(15)
            .with_success_rate(90),
        CombatMove::new(5, "fireball", "Fireball", "Hurl a searing bolt of witchfire.", now)
            .with_damage(15, 30)
            .with_success_rate(75)
            .for_class(CLASS_WITCH_ID),
        CombatMove::new(6, "power_strike", "Power Strike", "Put your whole weight behind the blade.", now)
            .with_damage(12, 25)
            .with_success_rate(80)
            .for_class(CLASS_FIGHTER_ID),
        CombatMove::new(7, "elven_grace", "Elven Grace", "Flow around the enemy, mending as you move.", now)
            .with_heal(10)
            .with_defense(5)
            .with_success_rate(85)
            .for_race(RACE_ELF_ID),
        CombatMove::new(8, "greater_heal", "Greater Heal", "Channel restorative power.", now)
            .with_heal(30)
            .with_success_rate(85)
            .for_class(CLASS_HEALER_ID),
    ];

    CatalogSeed {
        actions,
        tile_types,
        classes,
        races,
        moves,
    }
}

// ============================================================================
// Resolution and gating
// ============================================================================

/// How an incoming action value matched the catalog. The resolver tries
/// code first, then numeric id, then display name; the tag records which
/// rung matched so callers can log it.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResolution {
    /// Matched an option's `code` exactly.
    Code(ActionOption),
    /// Parsed as a number and matched an option id.
    Id(ActionOption),
    /// Matched an option's display `name`.
    Name(ActionOption),
    /// Nothing in the catalog matched.
    Unmatched,
}

impl ActionResolution {
    pub fn option(&self) -> Option<&ActionOption> {
        match self {
            ActionResolution::Code(opt)
            | ActionResolution::Id(opt)
            | ActionResolution::Name(opt) => Some(opt),
            ActionResolution::Unmatched => None,
        }
    }

    /// Short label for logs: which rung of the resolver matched.
    pub fn matched_by(&self) -> &'static str {
        match self {
            ActionResolution::Code(_) => "code",
            ActionResolution::Id(_) => "id",
            ActionResolution::Name(_) => "name",
            ActionResolution::Unmatched => "none",
        }
    }
}

/// Resolve an incoming action value against the catalog: exact code
/// match, then numeric id, then display name. Form posts send codes,
/// older clients send ids, and hand-typed values fall through to names.
pub fn resolve_action_option(
    store: &GameStore,
    value: &str,
) -> Result<ActionResolution, GameError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(ActionResolution::Unmatched);
    }

    if let Some(option) = store.action_option_by_code(value)? {
        return Ok(ActionResolution::Code(option));
    }

    if let Ok(id) = value.parse::<u64>() {
        if let Some(option) = store.get_action_option(id)? {
            return Ok(ActionResolution::Id(option));
        }
    }

    if let Some(option) = store.action_option_by_name(value)? {
        return Ok(ActionResolution::Name(option));
    }

    Ok(ActionResolution::Unmatched)
}

/// The action options a tile of the given type offers, sorted by name.
///
/// Sign tiles drop `fight` (nothing to fight) and keep rest/inspect/quit;
/// treasure tiles offer everything except `fight`; all other types offer
/// the full set.
pub fn allowed_actions_for_tile_type(
    store: &GameStore,
    tile_type_id: u64,
) -> Result<Vec<ActionOption>, GameError> {
    let tile_type = store
        .get_tile_type(tile_type_id)?
        .ok_or_else(|| GameError::NotFound(format!("tile type: {}", tile_type_id)))?;

    let mut options = store.list_action_options()?;
    match tile_type.name.as_str() {
        "sign" => options.retain(|o| matches!(o.code.as_str(), "rest" | "inspect" | "quit")),
        "treasure" => options.retain(|o| o.code != "fight"),
        _ => {}
    }
    options.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(options)
}

/// Combat moves the player may use: unrestricted moves plus those whose
/// class/race requirement matches the player's sheet. Seed order (by id).
pub fn eligible_combat_moves(
    store: &GameStore,
    player: &PlayerRecord,
) -> Result<Vec<CombatMove>, GameError> {
    let mut moves = store.list_combat_moves()?;
    moves.retain(|mv| {
        let class_ok = match mv.requires_class {
            Some(required) => player.class_id == Some(required),
            None => true,
        };
        let race_ok = match mv.requires_race {
            Some(required) => player.race_id == Some(required),
            None => true,
        };
        class_ok && race_ok
    });
    moves.sort_by_key(|mv| mv.id);
    Ok(moves)
}
