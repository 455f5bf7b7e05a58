//! Read-only game data passed into every battle.
//!
//! [`GameData`] bundles the item, monster and class-skill tables. It is built
//! once (from JSON or with builders in tests) and borrowed by the battle, so
//! no lookup table is global.
//!
//! ## Example
//!
//! ```
//! use dungeon_battle::data::{GameData, MonsterTemplate};
//!
//! let data = GameData::new().with_monster(MonsterTemplate::new("goblin", "Goblin"));
//! assert_eq!(data.monster("goblin").map(|m| m.name.as_str()), Some("Goblin"));
//! ```

pub mod items;
pub mod monsters;
pub mod skills;

pub use items::{ItemDef, ItemKind};
pub use monsters::{EncounterTable, MonsterTemplate};
pub use skills::{SkillDef, SkillKind};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::core::DataError;
use crate::roster::CharacterClass;

/// Item, monster and skill lookups.
#[derive(Clone, Debug, Default)]
pub struct GameData {
    items: FxHashMap<String, ItemDef>,
    monsters: FxHashMap<String, MonsterTemplate>,
    /// Monster ids in load order, so "any monster" sampling is deterministic.
    monster_order: Vec<String>,
    skills: FxHashMap<CharacterClass, Vec<SkillDef>>,
}

#[derive(Deserialize)]
struct SkillFile {
    #[serde(default)]
    classes: FxHashMap<String, Vec<SkillDef>>,
}

impl GameData {
    /// Create empty game data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the three data documents.
    ///
    /// - `items`: a JSON array of item objects
    /// - `monsters`: a JSON array of monster objects
    /// - `skills`: `{ "classes": { "Mage": [ { "id": "spell", "name": "Spark" } ] } }`
    ///
    /// Entries without an id are skipped, a later duplicate id replaces an
    /// earlier one, and skill lists under unknown class names are ignored.
    pub fn from_json(items: &str, monsters: &str, skills: &str) -> Result<Self, DataError> {
        let items: Vec<ItemDef> = serde_json::from_str(items)?;
        let monsters: Vec<MonsterTemplate> = serde_json::from_str(monsters)?;
        let skills: SkillFile = serde_json::from_str(skills)?;

        let mut data = Self::new();
        for item in items.into_iter().filter(|it| !it.id.is_empty()) {
            data = data.with_item(item);
        }
        for monster in monsters.into_iter().filter(|m| !m.id.is_empty()) {
            data = data.with_monster(monster);
        }
        for (class_name, list) in skills.classes {
            match CharacterClass::from_name(&class_name) {
                Some(class) => {
                    data.skills.insert(class, list);
                }
                None => tracing::warn!("ignoring skills for unknown class {class_name:?}"),
            }
        }
        Ok(data)
    }

    /// Add or replace an item definition.
    #[must_use]
    pub fn with_item(mut self, item: ItemDef) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    /// Add or replace a monster template.
    #[must_use]
    pub fn with_monster(mut self, monster: MonsterTemplate) -> Self {
        if !self.monsters.contains_key(&monster.id) {
            self.monster_order.push(monster.id.clone());
        }
        self.monsters.insert(monster.id.clone(), monster);
        self
    }

    /// Teach a class a skill.
    #[must_use]
    pub fn with_skill(mut self, class: CharacterClass, skill: SkillDef) -> Self {
        self.skills.entry(class).or_default().push(skill);
        self
    }

    /// Look up an item.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    /// Look up a monster template.
    #[must_use]
    pub fn monster(&self, id: &str) -> Option<&MonsterTemplate> {
        self.monsters.get(id)
    }

    /// All monster ids in load order.
    #[must_use]
    pub fn monster_ids(&self) -> &[String] {
        &self.monster_order
    }

    /// Skills a class knows, in data order.
    #[must_use]
    pub fn skills_for(&self, class: CharacterClass) -> &[SkillDef] {
        self.skills.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A class's skill of the given kind, if it knows one.
    #[must_use]
    pub fn skill(&self, class: CharacterClass, kind: SkillKind) -> Option<&SkillDef> {
        self.skills_for(class).iter().find(|s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"[
        { "id": "potion_small", "name": "Small Potion", "type": "consumable", "heal": 8 },
        { "name": "Nameless" },
        { "id": "dagger", "name": "Dagger", "type": "weapon", "atk": 1 },
        { "id": "dagger", "name": "Fine Dagger", "type": "weapon", "atk": 2 }
    ]"#;

    const MONSTERS: &str = r#"[
        { "id": "goblin", "name": "Goblin", "hp_low": 4, "hp_high": 7 },
        { "id": "rat", "name": "Rat" }
    ]"#;

    const SKILLS: &str = r#"{
        "classes": {
            "Mage": [ { "id": "spell", "name": "Spark" } ],
            "Priest": [ { "id": "heal", "name": "Heal", "cost": 1 } ],
            "Bard": [ { "id": "heal", "name": "Song" } ]
        }
    }"#;

    #[test]
    fn test_from_json() {
        let data = GameData::from_json(ITEMS, MONSTERS, SKILLS).unwrap();

        assert_eq!(data.item("potion_small").and_then(ItemDef::battle_heal), Some(8));
        assert_eq!(data.item("dagger").map(|d| d.atk), Some(2));
        assert!(data.item("").is_none());

        assert_eq!(data.monster_ids(), &["goblin".to_string(), "rat".to_string()]);
        assert_eq!(data.monster("goblin").map(|m| m.hp_low), Some(4));

        assert_eq!(data.skills_for(CharacterClass::Mage).len(), 1);
        assert!(data.skill(CharacterClass::Priest, SkillKind::Heal).is_some());
        assert!(data.skills_for(CharacterClass::Fighter).is_empty());
    }

    #[test]
    fn test_from_json_error() {
        let err = GameData::from_json("[", MONSTERS, SKILLS).unwrap_err();
        assert!(matches!(err, DataError::Json(_)));
    }

    #[test]
    fn test_missing_classes_key_is_empty() {
        let data = GameData::from_json("[]", "[]", "{}").unwrap();
        assert!(data.skills_for(CharacterClass::Mage).is_empty());
    }
}
