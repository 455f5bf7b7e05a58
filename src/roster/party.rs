//! The party roster.
//!
//! The roster outlives every battle. A battle borrows it mutably, reads the
//! active members' stats, and writes back hp, mp, alive flags, experience,
//! gold and consumed items.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::data::GameData;

use super::character::Character;

/// Maximum number of members fighting at once.
pub const ACTIVE_MAX: usize = 4;

/// Stock of one battle-usable consumable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumableStock {
    /// Item id.
    pub item_id: String,
    /// Display name.
    pub name: String,
    /// Units held.
    pub count: u32,
    /// Hit points restored per use.
    pub heal: u32,
}

/// All recruited characters, the active subset, and shared gold and items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    members: Vec<Character>,
    /// Roster indices of the active members, in display order.
    active: Vec<usize>,
    /// Shared gold pool.
    pub gold: u32,
    /// Shared inventory of item ids, one entry per unit.
    pub inventory: Vec<String>,
}

impl Party {
    /// Create an empty party.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recruit a character. Returns its roster index.
    ///
    /// New recruits join the active line-up while there is room.
    pub fn recruit(&mut self, member: Character) -> usize {
        self.members.push(member);
        let index = self.members.len() - 1;
        if self.active.len() < ACTIVE_MAX {
            self.active.push(index);
        }
        index
    }

    /// Replace the active line-up.
    ///
    /// Out-of-range and repeated indices are dropped and the list is cut to
    /// [`ACTIVE_MAX`].
    pub fn set_active(&mut self, indices: impl IntoIterator<Item = usize>) {
        let mut active: Vec<usize> = Vec::with_capacity(ACTIVE_MAX);
        for index in indices {
            if index < self.members.len() && !active.contains(&index) && active.len() < ACTIVE_MAX {
                active.push(index);
            }
        }
        self.active = active;
    }

    /// Roster indices of the active members, in display order.
    #[must_use]
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// Every recruited character.
    #[must_use]
    pub fn members(&self) -> &[Character] {
        &self.members
    }

    /// Look up a member by roster index.
    #[must_use]
    pub fn member(&self, index: usize) -> Option<&Character> {
        self.members.get(index)
    }

    pub(crate) fn member_mut(&mut self, index: usize) -> Option<&mut Character> {
        self.members.get_mut(index)
    }

    /// Whether a roster index is in the line-up.
    #[must_use]
    pub fn is_active(&self, index: usize) -> bool {
        self.active.contains(&index)
    }

    /// Active, alive and standing: the only members that may act or be targeted.
    #[must_use]
    pub fn is_fighting(&self, index: usize) -> bool {
        self.is_active(index) && self.member(index).is_some_and(Character::is_alive)
    }

    /// Roster indices of the fighting members, in display order.
    #[must_use]
    pub fn fighting_indices(&self) -> SmallVec<[usize; ACTIVE_MAX]> {
        self.active
            .iter()
            .copied()
            .filter(|&i| self.member(i).is_some_and(Character::is_alive))
            .collect()
    }

    /// Whether anyone in the line-up can still fight.
    #[must_use]
    pub fn any_fighting(&self) -> bool {
        !self.fighting_indices().is_empty()
    }

    /// Battle-usable consumables in inventory order, one entry per item id.
    #[must_use]
    pub fn consumables(&self, data: &GameData) -> Vec<ConsumableStock> {
        let mut stock: Vec<ConsumableStock> = Vec::new();
        for id in &self.inventory {
            if let Some(entry) = stock.iter_mut().find(|s| &s.item_id == id) {
                entry.count += 1;
                continue;
            }
            let Some(item) = data.item(id) else { continue };
            if let Some(heal) = item.battle_heal() {
                stock.push(ConsumableStock {
                    item_id: id.clone(),
                    name: item.name.clone(),
                    count: 1,
                    heal,
                });
            }
        }
        stock
    }

    /// Remove one unit of an item. Returns false if none was held.
    pub(crate) fn take_item(&mut self, item_id: &str) -> bool {
        match self.inventory.iter().position(|id| id == item_id) {
            Some(pos) => {
                self.inventory.remove(pos);
                true
            }
            None => false,
        }
    }
}
