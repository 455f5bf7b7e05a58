//! Combatants: party members, the party roster, and spawned enemies.
//!
//! Party members live in the [`Party`] roster and are only borrowed by a
//! battle. Enemies are created from monster templates when a battle starts
//! and belong to it.

pub mod character;
pub mod enemy;
pub mod party;

pub use character::{Attributes, Character, CharacterClass, Equipment, AC_BASE};
pub use enemy::Enemy;
pub use party::{ConsumableStock, Party, ACTIVE_MAX};

use serde::{Deserialize, Serialize};

/// Which side of the fight a combatant is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Party,
    Enemy,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Party => f.write_str("party"),
            Side::Enemy => f.write_str("enemy"),
        }
    }
}

/// Attribute modifier: `floor((score - 10) / 2)`.
///
/// ```
/// use dungeon_battle::roster::ability_mod;
///
/// assert_eq!(ability_mod(10), 0);
/// assert_eq!(ability_mod(15), 2);
/// assert_eq!(ability_mod(7), -2);
/// ```
#[must_use]
pub const fn ability_mod(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}
