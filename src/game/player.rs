//! Character sheet logic: class/race builds, experience, and the idle
//! points wallet.
//!
//! Stat numbers follow the long-standing balance table: every build
//! starts from 10/10/10, races adjust stats and set the max-HP band
//! (Elves are fragile, Pandarians sturdy), then the class scales HP and
//! nudges stats. Level-ups multiply everything by 1.5 with the fraction
//! dropped, exactly as the original curve did.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::config::GameConfig;
use crate::game::catalog::{PlayerClass, PlayerRace};
use crate::game::errors::GameError;
use crate::game::storage::GameStore;
use crate::game::types::PlayerRecord;

/// Multiply and truncate, matching integer math in the balance table.
fn scaled(value: i32, factor: f64) -> i32 {
    (value as f64 * factor) as i32
}

/// Reset the sheet to baseline and apply race then class modifiers.
///
/// `base_hitpoints` is the configured starting HP and applies to Human
/// builds; Elf (80) and Pandarian (120) set their own bands before the
/// class multiplier. The build leaves the player fully healed at level 1
/// with zero experience.
pub fn apply_character_build(
    player: &mut PlayerRecord,
    class: &PlayerClass,
    race: &PlayerRace,
    base_hitpoints: i32,
) {
    player.strength = 10;
    player.intelligence = 10;
    player.stealth = 10;
    let mut max_hp = base_hitpoints;

    match race.name.as_str() {
        "Elf" => {
            player.strength -= 5;
            player.intelligence += 5;
            player.stealth += 5;
            max_hp = 80;
        }
        "Pandarian" => {
            player.strength += 5;
            player.intelligence -= 5;
            player.stealth += 5;
            max_hp = 120;
        }
        _ => {}
    }

    match class.name.as_str() {
        "witch" => {
            player.intelligence += 5;
            max_hp = scaled(max_hp, 0.9);
        }
        "fighter" => {
            player.strength += 5;
            player.intelligence -= 5;
            player.stealth -= 5;
            max_hp = scaled(max_hp, 1.5);
        }
        "healer" => {
            player.strength += 2;
            player.intelligence += 2;
            player.stealth -= 5;
            max_hp = scaled(max_hp, 1.25);
        }
        _ => {}
    }

    player.max_hitpoints = max_hp;
    player.hitpoints = max_hp;
    player.level = 1;
    player.experience = 0;
    player.class_id = Some(class.id);
    player.race_id = Some(race.id);
}

/// Look up the class and race by name and apply the build to the stored
/// player. Returns the updated record.
pub fn set_character(
    store: &GameStore,
    config: &GameConfig,
    player_id: u64,
    class_name: &str,
    race_name: &str,
) -> Result<PlayerRecord, GameError> {
    let class = store
        .player_class_by_name(class_name)?
        .ok_or_else(|| GameError::NotFound(format!("class: {}", class_name)))?;
    let race = store
        .player_race_by_name(race_name)?
        .ok_or_else(|| GameError::NotFound(format!("race: {}", race_name)))?;

    let _guard = store.lock_player(player_id);
    let mut player = store.get_player(player_id)?;
    apply_character_build(&mut player, &class, &race, config.players.starting_hitpoints);
    store.put_player(player.clone())?;
    info!(
        "player {} built as {} {} ({} max HP)",
        player.username, race.name, class.name, player.max_hitpoints
    );
    Ok(player)
}

/// Add experience and process any level-ups. Each level multiplies the
/// three stats and max HP by 1.5 (fraction dropped), fully heals, and
/// raises the next threshold to `level * 100`. Returns levels gained.
pub fn grant_experience(player: &mut PlayerRecord, amount: i32) -> u32 {
    player.experience += amount.max(0);
    let mut gained = 0u32;
    while player.experience >= player.level * 100 {
        player.strength = scaled(player.strength, 1.5);
        player.intelligence = scaled(player.intelligence, 1.5);
        player.stealth = scaled(player.stealth, 1.5);
        player.max_hitpoints = scaled(player.max_hitpoints, 1.5);
        player.hitpoints = player.max_hitpoints;
        player.level += 1;
        gained += 1;
    }
    gained
}

/// Store-level wrapper around [`grant_experience`].
pub fn award_experience(
    store: &GameStore,
    player_id: u64,
    amount: i32,
) -> Result<PlayerRecord, GameError> {
    let _guard = store.lock_player(player_id);
    let mut player = store.get_player(player_id)?;
    let gained = grant_experience(&mut player, amount);
    store.put_player(player.clone())?;
    if gained > 0 {
        info!(
            "player {} reached level {} (+{} XP)",
            player.username, player.level, amount
        );
    }
    Ok(player)
}

/// Grant idle points for whole hours elapsed since the last accrual and
/// return how many were added.
///
/// The first call only initializes the accrual clock and awards nothing.
/// Later calls advance the clock by the whole hours consumed, keeping the
/// remainder, so partial hours are never lost across calls.
pub fn accrue_points(
    store: &GameStore,
    config: &GameConfig,
    player_id: u64,
    now: DateTime<Utc>,
) -> Result<i32, GameError> {
    let _guard = store.lock_player(player_id);
    let mut player = store.get_player(player_id)?;

    let Some(last) = player.points_accrued_at else {
        player.points_accrued_at = Some(now);
        store.put_player(player)?;
        return Ok(0);
    };

    let hours = now.signed_duration_since(last).num_hours();
    if hours <= 0 {
        return Ok(0);
    }

    let added = config.points.accrual_per_hour * hours as i32;
    player.points += added;
    player.points_accrued_at = Some(last + Duration::hours(hours));
    store.put_player(player.clone())?;
    debug!(
        "player {} accrued {} points ({}h idle)",
        player.username, added, hours
    );
    Ok(added)
}

/// Spend one point if any are available. Returns the remaining balance;
/// spending at zero is a no-op, never an error.
pub fn spend_point(store: &GameStore, player_id: u64) -> Result<i32, GameError> {
    let _guard = store.lock_player(player_id);
    let mut player = store.get_player(player_id)?;
    if player.points > 0 {
        player.points -= 1;
        store.put_player(player.clone())?;
    }
    Ok(player.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::{CLASS_FIGHTER_ID, RACE_PANDARIAN_ID};

    fn class(name: &str) -> PlayerClass {
        PlayerClass::new(CLASS_FIGHTER_ID, name, Utc::now())
    }

    fn race(name: &str) -> PlayerRace {
        PlayerRace::new(RACE_PANDARIAN_ID, name, Utc::now())
    }

    #[test]
    fn pandarian_fighter_build() {
        let mut player = PlayerRecord::new(1, "ada", 100);
        apply_character_build(&mut player, &class("fighter"), &race("Pandarian"), 100);
        assert_eq!(player.strength, 20);
        assert_eq!(player.intelligence, 0);
        assert_eq!(player.stealth, 10);
        assert_eq!(player.max_hitpoints, 180);
        assert_eq!(player.hitpoints, 180);
    }

    #[test]
    fn unknown_names_leave_baseline() {
        let mut player = PlayerRecord::new(1, "ada", 100);
        apply_character_build(&mut player, &class("jester"), &race("Gnome"), 100);
        assert_eq!(
            (player.strength, player.intelligence, player.stealth),
            (10, 10, 10)
        );
        assert_eq!(player.max_hitpoints, 100);
    }

    #[test]
    fn level_up_multiplies_and_heals() {
        let mut player = PlayerRecord::new(1, "ada", 100);
        player.hitpoints = 40;
        let gained = grant_experience(&mut player, 100);
        assert_eq!(gained, 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.strength, 15);
        assert_eq!(player.max_hitpoints, 150);
        assert_eq!(player.hitpoints, 150);
        assert_eq!(player.experience, 100);
    }

    #[test]
    fn large_grant_levels_repeatedly() {
        let mut player = PlayerRecord::new(1, "ada", 100);
        let gained = grant_experience(&mut player, 250);
        // Thresholds 100 and 200 both cross; 300 does not.
        assert_eq!(gained, 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.strength, 22);
        assert_eq!(player.max_hitpoints, 225);
    }

    #[test]
    fn negative_experience_is_ignored() {
        let mut player = PlayerRecord::new(1, "ada", 100);
        assert_eq!(grant_experience(&mut player, -50), 0);
        assert_eq!(player.experience, 0);
        assert_eq!(player.level, 1);
    }
}
