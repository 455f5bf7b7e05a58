//! Monster templates and encounter tables.

use serde::{Deserialize, Serialize};

/// Static monster data. Concrete enemies are sampled from it per battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterTemplate {
    /// Unique id referenced by encounter tables.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hit point roll, inclusive.
    pub hp_low: i32,
    pub hp_high: i32,
    /// Armor class.
    pub ac: i32,
    /// Damage roll on a hit, inclusive.
    pub atk_low: i32,
    pub atk_high: i32,
    /// Experience awarded for the kill.
    pub exp: u32,
    /// Gold roll on victory, inclusive.
    pub gold_low: u32,
    pub gold_high: u32,
    /// Fixed agility. Randomized per spawn when absent.
    pub agi: Option<i32>,
}

impl Default for MonsterTemplate {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: "Monster".to_string(),
            hp_low: 6,
            hp_high: 10,
            ac: 8,
            atk_low: 1,
            atk_high: 4,
            exp: 10,
            gold_low: 1,
            gold_high: 8,
            agi: None,
        }
    }
}

impl MonsterTemplate {
    /// Create a template with default stats.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the hit point range.
    #[must_use]
    pub fn with_hp(mut self, low: i32, high: i32) -> Self {
        self.hp_low = low;
        self.hp_high = high;
        self
    }

    /// Set the damage range.
    #[must_use]
    pub fn with_attack(mut self, low: i32, high: i32) -> Self {
        self.atk_low = low;
        self.atk_high = high;
        self
    }

    /// Fix the agility.
    #[must_use]
    pub fn with_agi(mut self, agi: i32) -> Self {
        self.agi = Some(agi);
        self
    }

    /// Set the armor class.
    #[must_use]
    pub fn with_ac(mut self, ac: i32) -> Self {
        self.ac = ac;
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
}

/// Which monsters a random battle may draw and how many.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterTable {
    /// Allowed template ids. Empty means every known template.
    pub monsters: Vec<String>,
    /// Group size range, inclusive.
    pub group: (u32, u32),
}

impl Default for EncounterTable {
    fn default() -> Self {
        Self {
            monsters: Vec::new(),
            group: (1, 3),
        }
    }
}

impl EncounterTable {
    /// Create a table for the given monster ids and group range.
    pub fn new<S: Into<String>>(monsters: impl IntoIterator<Item = S>, min: u32, max: u32) -> Self {
        Self {
            monsters: monsters.into_iter().map(Into::into).collect(),
            group: (min, max),
        }
    }

    /// Group size range after normalization: at least one monster, and
    /// `max` never below `min`.
    #[must_use]
    pub fn size_range(&self) -> (u32, u32) {
        let (min, max) = self.group;
        let min = min.max(1);
        (min, max.max(min))
    }
}
