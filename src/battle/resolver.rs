//! Action resolution.
//!
//! The resolver has two halves:
//!
//! - **Build** (`attack`, `spell`, `heal`, `use_item`, `run`, `enemy_attack`):
//!   check preconditions and roll every random outcome. A failed precondition
//!   returns a [`ResolveError`] and touches nothing.
//! - **Apply** ([`ActionResolver::apply`]): copy a built action's numbers
//!   into the roster. Called only from the timeline's Impact transition. This
//!   is the only place in a battle where hp, mp or the inventory change.

use crate::core::{BattleConfig, BattleRng, Millis};
use crate::data::{GameData, SkillDef, SkillKind};
use crate::roster::{ability_mod, Character, Enemy, Party};

use super::action::{Action, ActionEffect};
use super::error::ResolveError;
use super::events::EventQueue;
use super::CombatantRef;

/// Probability that a party attack hits.
///
/// `base + attack_bonus * per_bonus - (10 - target_ac) * per_ac`
///
/// ```
/// use dungeon_battle::battle::attack_hit_chance;
/// use dungeon_battle::core::BattleConfig;
///
/// let p = attack_hit_chance(2, 8, &BattleConfig::default());
/// assert!((p - 0.67).abs() < 1e-9);
/// ```
#[must_use]
pub fn attack_hit_chance(attack_bonus: i32, target_ac: i32, config: &BattleConfig) -> f64 {
    config.attack_base_hit + f64::from(attack_bonus) * config.attack_hit_per_bonus
        - f64::from(10 - target_ac) * config.attack_hit_per_ac
}

/// What applying an action did beyond hp changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImpactOutcome {
    /// A run attempt succeeded; the battle ends as fled.
    pub fled: bool,
    /// Log line for the message window.
    pub message: Option<String>,
}

/// Builds and applies actions against read-only game data and tuning.
#[derive(Clone, Copy, Debug)]
pub struct ActionResolver<'a> {
    data: &'a GameData,
    config: &'a BattleConfig,
}

impl<'a> ActionResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(data: &'a GameData, config: &'a BattleConfig) -> Self {
        Self { data, config }
    }

    fn fighter<'p>(party: &'p Party, actor: usize) -> Result<&'p Character, ResolveError> {
        if !party.is_fighting(actor) {
            return Err(ResolveError::NoActor);
        }
        party.member(actor).ok_or(ResolveError::NoActor)
    }

    fn enemy_target(enemies: &[Enemy], target: Option<usize>) -> Result<usize, ResolveError> {
        match target {
            Some(i) if enemies.get(i).is_some_and(Enemy::is_alive) => Ok(i),
            Some(i) => Err(ResolveError::InvalidTarget(CombatantRef::enemy(i))),
            None => enemies.iter().position(Enemy::is_alive).ok_or(ResolveError::NoTarget),
        }
    }

    /// Explicit targets must be fighting; without one, pick the member with
    /// the lowest hp fraction.
    fn ally_target(party: &Party, target: Option<usize>) -> Result<usize, ResolveError> {
        match target {
            Some(i) if party.is_fighting(i) => Ok(i),
            Some(i) => Err(ResolveError::InvalidTarget(CombatantRef::party(i))),
            None => party
                .fighting_indices()
                .into_iter()
                .filter_map(|i| party.member(i).map(|m| (i, m)))
                .min_by(|(_, a), (_, b)| {
                    // hp/max compared by cross-multiplication.
                    (i64::from(a.hp()) * i64::from(b.max_hp())).cmp(&(i64::from(b.hp()) * i64::from(a.max_hp())))
                })
                .map(|(i, _)| i)
                .ok_or(ResolveError::NoTarget),
        }
    }

    fn skill(&self, caster: &Character, kind: SkillKind) -> Result<&'a SkillDef, ResolveError> {
        let skill = self.data.skill(caster.class, kind).ok_or(ResolveError::NotACaster {
            class: caster.class,
            kind,
        })?;
        if !skill.affordable(caster.mp()) {
            return Err(ResolveError::InsufficientMp {
                need: skill.cost.max(1),
                have: caster.mp(),
            });
        }
        Ok(skill)
    }

    /// Weapon attack. Rolls the hit check, then the weapon die.
    pub fn attack(
        &self,
        rng: &mut BattleRng,
        party: &Party,
        enemies: &[Enemy],
        actor: usize,
        target: Option<usize>,
    ) -> Result<Action, ResolveError> {
        let attacker = Self::fighter(party, actor)?;
        let target = Self::enemy_target(enemies, target)?;
        let enemy = &enemies[target];

        let bonus = attacker.attack_bonus();
        let chance = attack_hit_chance(bonus, enemy.ac, self.config);
        let hit = rng.unit() < chance;
        let (lo, hi) = self.config.weapon_die;
        let damage = (rng.gen_range(lo..=hi) + bonus).max(1);

        let text = if hit {
            format!("{} hits {} for {damage}.", attacker.name, enemy.name)
        } else {
            format!("{} misses {}.", attacker.name, enemy.name)
        };
        Ok(Action {
            actor: CombatantRef::party(actor),
            effect: ActionEffect::Attack { target, hit, damage },
            text,
        })
    }

    /// Damage spell. Always hits; costs the skill's mp on impact.
    pub fn spell(
        &self,
        rng: &mut BattleRng,
        party: &Party,
        enemies: &[Enemy],
        actor: usize,
        target: Option<usize>,
    ) -> Result<Action, ResolveError> {
        let caster = Self::fighter(party, actor)?;
        let skill = self.skill(caster, SkillKind::Spell)?;
        let target = Self::enemy_target(enemies, target)?;

        let (lo, hi) = self.config.spell_roll;
        let damage = (rng.gen_range(lo..=hi) + ability_mod(caster.class.casting_score(&caster.attributes))).max(1);

        Ok(Action {
            actor: CombatantRef::party(actor),
            effect: ActionEffect::Spell {
                target,
                damage,
                cost: skill.cost.max(0),
            },
            text: format!("{} casts {} for {damage}!", caster.name, skill.name),
        })
    }

    /// Healing skill. Always succeeds; costs the skill's mp on impact.
    pub fn heal(
        &self,
        rng: &mut BattleRng,
        party: &Party,
        actor: usize,
        target: Option<usize>,
    ) -> Result<Action, ResolveError> {
        let healer = Self::fighter(party, actor)?;
        let skill = self.skill(healer, SkillKind::Heal)?;
        let target = Self::ally_target(party, target)?;

        let (lo, hi) = self.config.heal_roll;
        let amount = (rng.gen_range(lo..=hi) + ability_mod(healer.attributes.piety)).max(1);
        let target_name = party.member(target).map_or("", |m| m.name.as_str());

        Ok(Action {
            actor: CombatantRef::party(actor),
            effect: ActionEffect::Heal {
                target,
                amount,
                cost: skill.cost.max(0),
            },
            text: format!("{} heals {target_name}.", healer.name),
        })
    }

    /// Use a consumable. No roll; the item's heal value is the amount.
    pub fn use_item(&self, party: &Party, actor: usize, item_id: &str, target: Option<usize>) -> Result<Action, ResolveError> {
        let user = Self::fighter(party, actor)?;
        let unavailable = || ResolveError::ItemUnavailable(item_id.to_string());
        let item = self.data.item(item_id).ok_or_else(unavailable)?;
        let heal = item.battle_heal().ok_or_else(unavailable)?;
        if !party.inventory.iter().any(|id| id == item_id) {
            return Err(unavailable());
        }
        let target = Self::ally_target(party, target)?;
        let target_name = party.member(target).map_or("", |m| m.name.as_str());
        let amount = i32::try_from(heal).unwrap_or(i32::MAX);

        Ok(Action {
            actor: CombatantRef::party(actor),
            effect: ActionEffect::ItemUse {
                target,
                item_id: item_id.to_string(),
                amount,
            },
            text: format!("{} uses {} on {target_name}.", user.name, item.name),
        })
    }

    /// Attempt to flee.
    pub fn run(&self, rng: &mut BattleRng, party: &Party, actor: usize) -> Result<Action, ResolveError> {
        Self::fighter(party, actor)?;
        let success = rng.unit() < self.config.run_chance;
        let text = if success { "You fled!" } else { "You failed to run!" };
        Ok(Action {
            actor: CombatantRef::party(actor),
            effect: ActionEffect::Run { success },
            text: text.to_string(),
        })
    }

    /// Enemy turn: pick a random fighting party member, roll hit, roll damage.
    pub fn enemy_attack(
        &self,
        rng: &mut BattleRng,
        party: &Party,
        enemies: &[Enemy],
        actor: usize,
    ) -> Result<Action, ResolveError> {
        let enemy = enemies
            .get(actor)
            .filter(|e| e.is_alive())
            .ok_or(ResolveError::NoActor)?;
        let targets = party.fighting_indices();
        let target = *rng.choose(&targets).ok_or(ResolveError::NoTarget)?;
        let hit = rng.unit() < self.config.enemy_hit_chance;
        let damage = rng.gen_range(enemy.atk_low..=enemy.atk_high);
        let target_name = party.member(target).map_or("", |m| m.name.as_str());

        let text = if hit {
            format!("{} attacks {target_name} for {damage}.", enemy.name)
        } else {
            format!("{} misses {target_name}.", enemy.name)
        };
        Ok(Action {
            actor: CombatantRef::enemy(actor),
            effect: ActionEffect::EnemyAttack { target, hit, damage },
            text,
        })
    }

    /// Apply a built action. Consumes it, so it cannot be applied twice.
    ///
    /// A target that vanished since the action was built is skipped.
    pub fn apply(
        &self,
        action: Action,
        party: &mut Party,
        enemies: &mut [Enemy],
        events: &mut EventQueue,
        now: Millis,
    ) -> ImpactOutcome {
        let config = self.config;
        let mut outcome = ImpactOutcome {
            fled: false,
            message: Some(action.text),
        };

        match action.effect {
            ActionEffect::Attack { target, hit, damage } => {
                Self::strike_enemy(enemies, events, target, hit, damage, now, config);
            }
            ActionEffect::Spell { target, damage, cost } => {
                let paid = party
                    .member_mut(action.actor.index)
                    .is_some_and(|caster| caster.spend_mp(cost));
                if paid {
                    Self::strike_enemy(enemies, events, target, true, damage, now, config);
                } else {
                    tracing::warn!(actor = %action.actor, "spell fizzled: caster cannot pay");
                    outcome.message = None;
                }
            }
            ActionEffect::Heal { target, amount, cost } => {
                let paid = party.is_fighting(target)
                    && party
                        .member_mut(action.actor.index)
                        .is_some_and(|healer| healer.spend_mp(cost));
                if paid {
                    let restored = Self::mend(party, events, target, amount, now, config);
                    outcome.message = Some(format!(
                        "{} heals {} for {restored}.",
                        Self::member_name(party, action.actor.index),
                        Self::member_name(party, target)
                    ));
                } else {
                    tracing::warn!(actor = %action.actor, "heal fizzled");
                    outcome.message = None;
                }
            }
            ActionEffect::ItemUse { target, item_id, amount } => {
                if party.is_fighting(target) && party.take_item(&item_id) {
                    let restored = Self::mend(party, events, target, amount, now, config);
                    let item_name = self.data.item(&item_id).map_or(item_id.as_str(), |item| item.name.as_str());
                    outcome.message = Some(format!(
                        "{} uses {item_name} on {} (+{restored} HP).",
                        Self::member_name(party, action.actor.index),
                        Self::member_name(party, target)
                    ));
                } else {
                    tracing::warn!(actor = %action.actor, item = %item_id, "item use skipped");
                    outcome.message = None;
                }
            }
            ActionEffect::Run { success } => {
                outcome.fled = success;
            }
            ActionEffect::EnemyAttack { target, hit, damage } => {
                let who = CombatantRef::party(target);
                if !party.is_fighting(target) {
                    tracing::warn!(%who, "enemy attack target gone");
                } else if !hit {
                    events.miss(who, now, config);
                } else if let Some(member) = party.member_mut(target) {
                    member.take_damage(damage);
                    events.damage(who, damage, now, config);
                    if !member.is_alive() {
                        events.death(who, now, config);
                        tracing::info!(member = %member.name, "party member down");
                    }
                }
            }
        }
        outcome
    }

    fn strike_enemy(
        enemies: &mut [Enemy],
        events: &mut EventQueue,
        target: usize,
        hit: bool,
        damage: i32,
        now: Millis,
        config: &BattleConfig,
    ) {
        let who = CombatantRef::enemy(target);
        let Some(enemy) = enemies.get_mut(target).filter(|e| e.is_alive()) else {
            tracing::warn!(%who, "attack target gone");
            return;
        };
        if !hit {
            events.miss(who, now, config);
            return;
        }
        enemy.take_damage(damage);
        events.damage(who, damage, now, config);
        if !enemy.is_alive() {
            events.death(who, now, config);
            tracing::info!(enemy = %enemy.name, "enemy slain");
        }
    }

    /// Returns the hp actually restored; the floater shows the rolled amount.
    fn mend(party: &mut Party, events: &mut EventQueue, target: usize, amount: i32, now: Millis, config: &BattleConfig) -> i32 {
        let Some(member) = party.member_mut(target) else {
            return 0;
        };
        let restored = member.restore_hp(amount);
        events.heal(CombatantRef::party(target), amount, now, config);
        restored
    }

    fn member_name(party: &Party, index: usize) -> &str {
        party.member(index).map_or("", |m| m.name.as_str())
    }
}
