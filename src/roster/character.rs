//! Party members.
//!
//! A [`Character`] is owned by the roster, outside any battle. The battle
//! borrows the party mutably for its duration and changes only hp, mp, the
//! alive flag and experience.

use serde::{Deserialize, Serialize};

use crate::core::BattleRng;
use crate::data::GameData;

use super::ability_mod;

/// Base armor class before equipment.
pub const AC_BASE: i32 = 10;

/// Character class. Decides hit dice, mana pool and which skills are known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Fighter,
    Mage,
    Priest,
    Thief,
}

impl CharacterClass {
    /// All classes, in menu order.
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Fighter,
        CharacterClass::Mage,
        CharacterClass::Priest,
        CharacterClass::Thief,
    ];

    /// Parse a class from its display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Display name, also used as the key in skill data files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CharacterClass::Fighter => "Fighter",
            CharacterClass::Mage => "Mage",
            CharacterClass::Priest => "Priest",
            CharacterClass::Thief => "Thief",
        }
    }

    /// Hit points at level 1 before the vitality modifier.
    #[must_use]
    pub const fn base_hp(self) -> i32 {
        match self {
            CharacterClass::Fighter => 12,
            CharacterClass::Mage => 6,
            CharacterClass::Priest | CharacterClass::Thief => 8,
        }
    }

    /// Mana at level 1 before the casting modifier.
    #[must_use]
    pub const fn base_mp(self) -> i32 {
        match self {
            CharacterClass::Fighter | CharacterClass::Thief => 0,
            CharacterClass::Mage => 8,
            CharacterClass::Priest => 6,
        }
    }

    /// The attribute that powers this class's spells: IQ for mages, piety otherwise.
    #[must_use]
    pub const fn casting_score(self, attributes: &Attributes) -> i32 {
        match self {
            CharacterClass::Mage => attributes.iq,
            _ => attributes.piety,
        }
    }
}

impl std::fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The six rolled attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub iq: i32,
    pub piety: i32,
    pub vitality: i32,
    pub agility: i32,
    pub luck: i32,
}

impl Attributes {
    /// Every attribute set to the same score.
    #[must_use]
    pub const fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            iq: score,
            piety: score,
            vitality: score,
            agility: score,
            luck: score,
        }
    }

    /// Roll 3d6 for each attribute.
    pub fn roll(rng: &mut BattleRng) -> Self {
        let mut roll = || -> i32 { (0..3).map(|_| rng.gen_range(1..=6)).sum() };
        Self {
            strength: roll(),
            iq: roll(),
            piety: roll(),
            vitality: roll(),
            agility: roll(),
            luck: roll(),
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(10)
    }
}

/// Equipped gear.
///
/// Weapon attack and armor AC are cached on equip; accessory bonuses are
/// looked up in [`GameData`] when derived stats are computed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon_atk: i32,
    pub armor_ac: i32,
    pub weapon_id: Option<String>,
    pub armor_id: Option<String>,
    pub accessories: [Option<String>; 2],
}

impl Equipment {
    fn accessory_bonus(&self, data: &GameData, stat: impl Fn(&crate::data::ItemDef) -> i32) -> i32 {
        self.accessories
            .iter()
            .flatten()
            .filter_map(|id| data.item(id))
            .map(stat)
            .sum()
    }
}

/// A party member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub attributes: Attributes,
    hp: i32,
    max_hp: i32,
    mp: i32,
    max_mp: i32,
    /// Base armor class; equipment adds to it.
    pub ac: i32,
    pub exp: u32,
    pub alive: bool,
    pub equipment: Equipment,
}

impl Character {
    /// Create a level-1 character with full hp and mp.
    pub fn new(name: impl Into<String>, class: CharacterClass, attributes: Attributes) -> Self {
        let max_hp = (class.base_hp() + ability_mod(attributes.vitality)).max(1);
        let max_mp = (class.base_mp() + ability_mod(class.casting_score(&attributes))).max(0);
        Self {
            name: name.into(),
            class,
            level: 1,
            attributes,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            ac: AC_BASE,
            exp: 0,
            alive: true,
            equipment: Equipment::default(),
        }
    }

    /// Override the hp and mp pools. Current values are clamped into range.
    #[must_use]
    pub fn with_pools(mut self, max_hp: i32, max_mp: i32) -> Self {
        self.max_hp = max_hp.max(1);
        self.max_mp = max_mp.max(0);
        self.hp = self.hp.clamp(0, self.max_hp);
        self.mp = self.mp.clamp(0, self.max_mp);
        self
    }

    /// Equip a weapon bonus.
    #[must_use]
    pub fn with_weapon_atk(mut self, atk: i32) -> Self {
        self.equipment.weapon_atk = atk;
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
    pub const fn mp(&self) -> i32 {
        self.mp
    }

    #[must_use]
    pub const fn max_mp(&self) -> i32 {
        self.max_mp
    }

    /// Alive and standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive && self.hp > 0
    }

    /// Set hp, clamped to `[0, max_hp]`. Reaching 0 marks the character dead.
    ///
    /// Meant for out-of-battle tools (temple, fixtures). In battle, hp changes
    /// only through the action resolver.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
        if self.hp == 0 {
            self.alive = false;
        }
    }

    /// Set mp, clamped to `[0, max_mp]`.
    pub fn set_mp(&mut self, mp: i32) {
        self.mp = mp.clamp(0, self.max_mp);
    }

    /// Lose up to `amount` hp. Returns the hp actually lost.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        if self.hp == 0 {
            self.alive = false;
        }
        before - self.hp
    }

    /// Regain up to `amount` hp, capped at max. Returns the hp actually gained.
    pub(crate) fn restore_hp(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Pay `cost` mp. Refuses, leaving mp untouched, if the pool is short.
    pub(crate) fn spend_mp(&mut self, cost: i32) -> bool {
        if cost > self.mp {
            return false;
        }
        self.mp -= cost.max(0);
        true
    }

    /// Strength modifier plus weapon.
    #[must_use]
    pub fn attack_bonus(&self) -> i32 {
        ability_mod(self.attributes.strength) + self.equipment.weapon_atk
    }

    /// Base AC plus armor and accessory AC.
    #[must_use]
    pub fn defense_ac(&self, data: &GameData) -> i32 {
        self.ac + self.equipment.armor_ac + self.equipment.accessory_bonus(data, |it| it.ac)
    }

    /// Base agility plus accessory agility. Used for turn order.
    #[must_use]
    pub fn effective_agility(&self, data: &GameData) -> i32 {
        self.attributes.agility + self.equipment.accessory_bonus(data, |it| it.agi)
    }
}
