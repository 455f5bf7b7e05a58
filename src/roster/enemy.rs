//! Enemies spawned for a single battle.

use serde::{Deserialize, Serialize};

use crate::core::{BattleConfig, BattleRng};
use crate::data::MonsterTemplate;

/// A concrete monster. Owned by the battle and dropped when it ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub template_id: String,
    pub name: String,
    hp: i32,
    max_hp: i32,
    pub ac: i32,
    pub atk_low: i32,
    pub atk_high: i32,
    pub exp: u32,
    pub gold_low: u32,
    pub gold_high: u32,
    pub agi: i32,
}

impl Enemy {
    /// Sample a monster from its template.
    ///
    /// Hit points are rolled in the template range; agility is rolled in the
    /// configured default range when the template does not fix it.
    pub fn spawn(template: &MonsterTemplate, rng: &mut BattleRng, config: &BattleConfig) -> Self {
        let hp = rng.gen_range(template.hp_low..=template.hp_high).max(1);
        let agi = match template.agi {
            Some(agi) => agi,
            None => {
                let (lo, hi) = config.default_monster_agility;
                rng.gen_range(lo..=hi)
            }
        };
        Self {
            template_id: template.id.clone(),
            name: template.name.clone(),
            hp,
            max_hp: hp,
            ac: template.ac,
            atk_low: template.atk_low,
            atk_high: template.atk_high,
            exp: template.exp,
            gold_low: template.gold_low,
            gold_high: template.gold_high,
            agi,
        }
    }

    /// A fixed-stat enemy, for scripted fights and tests.
    pub fn fixed(name: impl Into<String>, hp: i32, ac: i32, agi: i32) -> Self {
        let hp = hp.max(1);
        Self {
            template_id: String::new(),
            name: name.into(),
            hp,
            max_hp: hp,
            ac,
            atk_low: 1,
            atk_high: 4,
            exp: 10,
            gold_low: 1,
            gold_high: 8,
            agi,
        }
    }

    /// Set the damage range.
    #[must_use]
    pub fn with_attack(mut self, low: i32, high: i32) -> Self {
        self.atk_low = low;
        self.atk_high = high;
        self
    }

    /// Set experience and gold range.
    #[must_use]
    pub fn with_loot(mut self, exp: u32, gold_low: u32, gold_high: u32) -> Self {
        self.exp = exp;
        self.gold_low = gold_low;
        self.gold_high = gold_high;
        self
    }

    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.max_hp
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Lose up to `amount` hp. Returns the hp actually lost.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        before - self.hp
    }
}
