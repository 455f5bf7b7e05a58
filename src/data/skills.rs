//! Class skills.

use serde::{Deserialize, Serialize};

/// What a skill does. Closed set: the resolver matches it exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    /// Damage one enemy; always hits.
    Spell,
    /// Restore hp to one party member.
    Heal,
}

/// One skill a class knows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDef {
    /// Effect kind. Stored under `id` in data files.
    #[serde(rename = "id")]
    pub kind: SkillKind,
    /// Menu label.
    pub name: String,
    /// Mana cost.
    #[serde(default = "default_cost")]
    pub cost: i32,
}

fn default_cost() -> i32 {
    1
}

impl SkillDef {
    /// Create a skill with the default cost of 1 mp.
    pub fn new(kind: SkillKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            cost: default_cost(),
        }
    }

    /// Override the mana cost.
    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    /// Whether a caster with `mp` mana can use this skill now.
    #[must_use]
    pub fn affordable(&self, mp: i32) -> bool {
        mp > 0 && mp >= self.cost
    }
}
