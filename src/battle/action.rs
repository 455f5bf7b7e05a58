//! Resolved actions.
//!
//! An [`Action`] is the complete outcome of one move, decided when the move is
//! chosen. Every random roll is already baked in; applying it later only
//! copies numbers into the roster.

use serde::{Deserialize, Serialize};

use super::CombatantRef;

/// What a resolved action will do on impact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEffect {
    /// Party weapon attack against an enemy.
    Attack { target: usize, hit: bool, damage: i32 },
    /// Damage spell against an enemy. Always hits.
    Spell { target: usize, damage: i32, cost: i32 },
    /// Healing skill on a party member.
    Heal { target: usize, amount: i32, cost: i32 },
    /// Consumable used on a party member.
    ItemUse { target: usize, item_id: String, amount: i32 },
    /// Attempt to flee the battle.
    Run { success: bool },
    /// Enemy attack against a party member.
    EnemyAttack { target: usize, hit: bool, damage: i32 },
}

/// Tag-only form of [`ActionEffect`] for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    Spell,
    Heal,
    ItemUse,
    Run,
    EnemyAttack,
}

/// A resolved move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Who acts.
    pub actor: CombatantRef,
    /// What happens on impact.
    pub effect: ActionEffect,
    /// Log line describing the outcome.
    pub text: String,
}

impl Action {
    /// Tag of the effect.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self.effect {
            ActionEffect::Attack { .. } => ActionKind::Attack,
            ActionEffect::Spell { .. } => ActionKind::Spell,
            ActionEffect::Heal { .. } => ActionKind::Heal,
            ActionEffect::ItemUse { .. } => ActionKind::ItemUse,
            ActionEffect::Run { .. } => ActionKind::Run,
            ActionEffect::EnemyAttack { .. } => ActionKind::EnemyAttack,
        }
    }

    /// The combatant on the receiving end, if any.
    #[must_use]
    pub fn target(&self) -> Option<CombatantRef> {
        match self.effect {
            ActionEffect::Attack { target, .. } | ActionEffect::Spell { target, .. } => {
                Some(CombatantRef::enemy(target))
            }
            ActionEffect::Heal { target, .. }
            | ActionEffect::ItemUse { target, .. }
            | ActionEffect::EnemyAttack { target, .. } => Some(CombatantRef::party(target)),
            ActionEffect::Run { .. } => None,
        }
    }

    /// Whether the roll succeeded. Spells, heals and items always do.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        match self.effect {
            ActionEffect::Attack { hit, .. } | ActionEffect::EnemyAttack { hit, .. } => hit,
            ActionEffect::Run { success } => success,
            ActionEffect::Spell { .. } | ActionEffect::Heal { .. } | ActionEffect::ItemUse { .. } => true,
        }
    }

    /// Damage or healing carried by the action. Zero for runs.
    #[must_use]
    pub fn amount(&self) -> i32 {
        match self.effect {
            ActionEffect::Attack { damage, .. }
            | ActionEffect::Spell { damage, .. }
            | ActionEffect::EnemyAttack { damage, .. } => damage,
            ActionEffect::Heal { amount, .. } | ActionEffect::ItemUse { amount, .. } => amount,
            ActionEffect::Run { .. } => 0,
        }
    }

    /// Copyable summary for highlighting while the action plays.
    #[must_use]
    pub fn summary(&self) -> ActionSummary {
        ActionSummary {
            kind: self.kind(),
            actor: self.actor,
            target: self.target(),
        }
    }
}

/// Who is doing what to whom, without the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub kind: ActionKind,
    pub actor: CombatantRef,
    pub target: Option<CombatantRef>,
}
