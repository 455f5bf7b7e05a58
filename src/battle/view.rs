//! Read-only battle snapshot for the presentation layer.
//!
//! Target candidates and the highlight come from the same list, so the
//! renderer can never highlight a combatant other than the one a confirm
//! would select.

use serde::Serialize;

use crate::core::Millis;

use super::action::ActionSummary;
use super::controller::{BattleController, BattleResult, MenuOption, PhaseKind};
use super::events::PresentationEvent;
use super::scheduler::TurnToken;
use super::timeline::Stage;
use super::CombatantRef;

/// One combatant as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CombatantView {
    pub target: CombatantRef,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    /// Zero for enemies.
    pub mp: i32,
    pub max_mp: i32,
    pub agility: i32,
    /// Strength modifier plus weapon for party members; top of the damage
    /// range for enemies.
    pub attack_bonus: i32,
    pub armor_class: i32,
    pub alive: bool,
}

/// The in-flight action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnimationView {
    pub summary: ActionSummary,
    pub stage: Stage,
    /// Fraction of the current stage elapsed.
    pub progress: f32,
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleView {
    pub phase: PhaseKind,
    pub result: BattleResult,
    pub turn_order: Vec<TurnToken>,
    pub current_actor: Option<TurnToken>,
    /// Active members in display order.
    pub party: Vec<CombatantView>,
    pub enemies: Vec<CombatantView>,
    /// Offered commands; unavailable ones are left out.
    pub menu: Vec<MenuOption>,
    /// Labels of the open skill or item menu.
    pub submenu: Vec<String>,
    /// Highlighted row of the open menu.
    pub cursor: Option<usize>,
    pub target_candidates: Vec<CombatantRef>,
    pub highlight: Option<CombatantRef>,
    pub animation: Option<AnimationView>,
    pub events: Vec<PresentationEvent>,
}

impl BattleView {
    pub(crate) fn capture(battle: &BattleController<'_>, now: Millis) -> Self {
        let data = battle.data();
        let party = battle
            .party()
            .active()
            .iter()
            .filter_map(|&i| battle.party().member(i).map(|m| (i, m)))
            .map(|(i, m)| CombatantView {
                target: CombatantRef::party(i),
                name: m.name.clone(),
                hp: m.hp(),
                max_hp: m.max_hp(),
                mp: m.mp(),
                max_mp: m.max_mp(),
                agility: m.effective_agility(data),
                attack_bonus: m.attack_bonus(),
                armor_class: m.defense_ac(data),
                alive: m.is_alive(),
            })
            .collect();
        let enemies = battle
            .enemies()
            .iter()
            .enumerate()
            .map(|(i, e)| CombatantView {
                target: CombatantRef::enemy(i),
                name: e.name.clone(),
                hp: e.hp(),
                max_hp: e.max_hp(),
                mp: 0,
                max_mp: 0,
                agility: e.agi,
                attack_bonus: e.atk_high,
                armor_class: e.ac,
                alive: e.is_alive(),
            })
            .collect();

        let phase = battle.phase();
        let submenu = match phase.kind() {
            PhaseKind::SkillSelect => battle.skill_options().iter().map(|s| s.name.clone()).collect(),
            PhaseKind::ItemMenu => battle
                .item_options()
                .into_iter()
                .map(|s| format!("{} x{}", s.name, s.count))
                .collect(),
            _ => Vec::new(),
        };

        let target_candidates: Vec<CombatantRef> = battle.target_candidates().into_vec();
        let animation = battle.timeline().animation().map(|anim| AnimationView {
            summary: anim.summary(),
            stage: anim.stage(),
            progress: anim.progress(now),
        });
        let highlight = match phase.kind() {
            PhaseKind::TargetSelect => phase.cursor().and_then(|c| target_candidates.get(c).copied()),
            _ => animation.as_ref().and_then(|a| a.summary.target),
        };

        Self {
            phase: phase.kind(),
            result: battle.result(),
            turn_order: battle.scheduler().order().to_vec(),
            current_actor: battle.current_actor(),
            party,
            enemies,
            menu: battle.menu_options().into_vec(),
            submenu,
            cursor: phase.cursor(),
            target_candidates,
            highlight,
            animation,
            events: battle.events().live(now).cloned().collect(),
        }
    }
}
