//! Item definitions.

use serde::{Deserialize, Serialize};

/// What an item is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Adds to attack bonus when equipped.
    Weapon,
    /// Adds to armor class when equipped.
    Armor,
    /// Fills an accessory slot; may add AC and agility.
    Accessory,
    /// Used up on use. The only kind usable in battle.
    Consumable,
    /// Anything else (quest items, junk).
    #[serde(other)]
    Other,
}

/// Static item data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Unique id referenced by inventories and equipment slots.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Item category.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ItemKind,
    /// Hit points restored when consumed.
    #[serde(default)]
    pub heal: u32,
    /// Attack bonus when equipped as a weapon.
    #[serde(default)]
    pub atk: i32,
    /// Armor class bonus when equipped.
    #[serde(default)]
    pub ac: i32,
    /// Agility bonus when equipped as an accessory.
    #[serde(default)]
    pub agi: i32,
    /// Shop price.
    #[serde(default)]
    pub price: u32,
}

fn default_kind() -> ItemKind {
    ItemKind::Other
}

impl ItemDef {
    /// Create an item with no bonuses.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            heal: 0,
            atk: 0,
            ac: 0,
            agi: 0,
            price: 0,
        }
    }

    /// A consumable that restores `heal` hit points.
    pub fn potion(id: impl Into<String>, name: impl Into<String>, heal: u32) -> Self {
        Self {
            heal,
            ..Self::new(id, name, ItemKind::Consumable)
        }
    }

    /// Set the agility bonus.
    #[must_use]
    pub fn with_agi(mut self, agi: i32) -> Self {
        self.agi = agi;
        self
    }

    /// Set the AC bonus.
    #[must_use]
    pub fn with_ac(mut self, ac: i32) -> Self {
        self.ac = ac;
        self
    }

    /// Heal value if this item can be used in battle.
    #[must_use]
    pub fn battle_heal(&self) -> Option<u32> {
        (self.kind == ItemKind::Consumable && self.heal > 0).then_some(self.heal)
    }
}
