//! Random encounter sampling.

use crate::core::{BattleConfig, BattleRng};
use crate::data::{EncounterTable, GameData};
use crate::roster::Enemy;

/// Draw a group of enemies from an encounter table.
///
/// Ids missing from `data` are skipped. An empty id list draws from every
/// known template. Returns an empty group if nothing is left to draw from.
pub fn sample_encounter(data: &GameData, table: &EncounterTable, rng: &mut BattleRng, config: &BattleConfig) -> Vec<Enemy> {
    let pool: &[String] = if table.monsters.is_empty() {
        data.monster_ids()
    } else {
        &table.monsters
    };
    let known: Vec<&str> = pool
        .iter()
        .filter(|id| {
            let found = data.monster(id).is_some();
            if !found {
                tracing::warn!(id = %id, "unknown monster id in encounter table");
            }
            found
        })
        .map(String::as_str)
        .collect();

    let (min, max) = table.size_range();
    let lo = i32::try_from(min).unwrap_or(i32::MAX);
    let hi = i32::try_from(max).unwrap_or(i32::MAX);
    let count = usize::try_from(rng.gen_range(lo..=hi)).unwrap_or(0);

    let mut enemies = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(template) = rng.choose(&known).and_then(|id| data.monster(id)) else {
            break;
        };
        enemies.push(Enemy::spawn(template, rng, config));
    }
    tracing::debug!(count = enemies.len(), "encounter sampled");
    enemies
}
