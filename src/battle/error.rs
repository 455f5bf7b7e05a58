//! Battle errors.
//!
//! None of these are fatal. A rejected choice leaves the battle exactly where
//! it was, so the caller can show a disabled entry or simply ignore it.

use crate::data::SkillKind;
use crate::roster::CharacterClass;

use super::controller::{MenuOption, PhaseKind};
use super::CombatantRef;

/// Why the resolver could not build an action. No turn or resource is spent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The acting combatant is dead, benched or gone.
    #[error("no combatant able to act")]
    NoActor,

    /// No living target exists on the required side.
    #[error("no valid target")]
    NoTarget,

    /// The chosen target died or vanished before the choice was made.
    #[error("{0} is not a valid target")]
    InvalidTarget(CombatantRef),

    /// The actor's class does not know a skill of this kind.
    #[error("{class} cannot use {kind:?}")]
    NotACaster { class: CharacterClass, kind: SkillKind },

    /// Not enough mana.
    #[error("needs {need} mp but has {have}")]
    InsufficientMp { need: i32, have: i32 },

    /// The item is not held or cannot be used in battle.
    #[error("item {0:?} cannot be used")]
    ItemUnavailable(String),
}

/// Why the controller refused an input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// The battle already has a result.
    #[error("the battle is over")]
    BattleOver,

    /// The controller is animating or pausing, or the choice does not belong
    /// to the current menu.
    #[error("input not accepted during {0:?}")]
    NotAcceptingInput(PhaseKind),

    /// A menu entry that is not currently offered.
    #[error("{0:?} is not available")]
    OptionUnavailable(MenuOption),

    /// The resolver rejected the choice.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An action is already in flight.
    #[error(transparent)]
    TimelineBusy(#[from] super::timeline::TimelineBusy),
}
