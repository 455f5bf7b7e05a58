//! The battle state machine.
//!
//! [`BattleController`] owns one battle from start to result. The caller
//! drives it with two entry points:
//!
//! - [`BattleController::tick`] advances time: the animation timeline, event
//!   expiry, and turn hand-off once the inter-action pause is over.
//! - [`BattleController::handle_input`] (or the `select_*` methods) feeds
//!   the party's decisions while a party member has the turn.
//!
//! Input that would create an action is refused while an action is playing.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{BattleConfig, BattleRng, BattleRngState, Millis};
use crate::data::{EncounterTable, GameData, SkillDef, SkillKind};
use crate::roster::{ConsumableStock, Enemy, Party, Side};

use super::action::Action;
use super::encounter::sample_encounter;
use super::error::{BattleError, ResolveError};
use super::events::EventQueue;
use super::resolver::ActionResolver;
use super::rewards::{roll_rewards, split_rewards, Rewards};
use super::scheduler::{TurnScheduler, TurnToken};
use super::timeline::{AnimationTimeline, TimelineStep};
use super::view::BattleView;
use super::CombatantRef;

/// Outcome of a battle. Leaves `Ongoing` exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleResult {
    #[default]
    Ongoing,
    Victory,
    Defeat,
    Fled,
}

/// Top-level command menu entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuOption {
    Attack,
    Skill,
    Item,
    Run,
}

impl MenuOption {
    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attack => "Attack",
            Self::Skill => "Skill",
            Self::Item => "Item",
            Self::Run => "Run",
        }
    }
}

impl std::fmt::Display for MenuOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the chosen target will receive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetIntent {
    Attack,
    Skill(SkillKind),
    Item(String),
}

impl TargetIntent {
    /// Which side the intent targets.
    #[must_use]
    pub fn side(&self) -> Side {
        match self {
            Self::Attack | Self::Skill(SkillKind::Spell) => Side::Enemy,
            Self::Skill(SkillKind::Heal) | Self::Item(_) => Side::Party,
        }
    }
}

/// Where the battle is within a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Party member choosing a command.
    MenuSelect { cursor: usize },
    /// Choosing a skill.
    SkillSelect { cursor: usize },
    /// Choosing a consumable.
    ItemMenu { cursor: usize },
    /// Choosing who receives the command.
    TargetSelect { intent: TargetIntent, cursor: usize },
    /// An action is playing on the timeline.
    Animating,
    /// Inter-action pause, or waiting for a death fade before victory.
    PostPause,
    /// The battle has a result.
    Finished,
}

/// Fieldless form of [`Phase`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    MenuSelect,
    SkillSelect,
    ItemMenu,
    TargetSelect,
    Animating,
    PostPause,
    Finished,
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::MenuSelect { .. } => PhaseKind::MenuSelect,
            Self::SkillSelect { .. } => PhaseKind::SkillSelect,
            Self::ItemMenu { .. } => PhaseKind::ItemMenu,
            Self::TargetSelect { .. } => PhaseKind::TargetSelect,
            Self::Animating => PhaseKind::Animating,
            Self::PostPause => PhaseKind::PostPause,
            Self::Finished => PhaseKind::Finished,
        }
    }

    /// Highlighted row in whichever menu is open.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        match *self {
            Self::MenuSelect { cursor }
            | Self::SkillSelect { cursor }
            | Self::ItemMenu { cursor }
            | Self::TargetSelect { cursor, .. } => Some(cursor),
            Self::Animating | Self::PostPause | Self::Finished => None,
        }
    }
}

/// Abstract input from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleInput {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
}

fn wrap_step(cursor: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (cursor + 1) % len
    } else {
        (cursor + len - 1) % len
    }
}

/// One battle between the party and a group of enemies.
///
/// Borrows the party for the whole battle; hp, mp, experience, gold and
/// consumed items are written straight back into it.
#[derive(Debug)]
pub struct BattleController<'a> {
    data: &'a GameData,
    config: BattleConfig,
    party: &'a mut Party,
    enemies: Vec<Enemy>,
    rng: BattleRng,
    scheduler: TurnScheduler,
    timeline: AnimationTimeline,
    events: EventQueue,
    phase: Phase,
    result: BattleResult,
    actor: Option<TurnToken>,
    rewards: Option<Rewards>,
    log: Vec<String>,
}

impl<'a> BattleController<'a> {
    /// Start a random encounter drawn from `table`.
    pub fn start(
        data: &'a GameData,
        party: &'a mut Party,
        table: &EncounterTable,
        config: BattleConfig,
        mut rng: BattleRng,
        now: Millis,
    ) -> Self {
        let enemies = sample_encounter(data, table, &mut rng.fork(), &config);
        Self::with_enemies(data, party, enemies, config, rng, now)
    }

    /// Start a battle against a fixed group.
    pub fn with_enemies(
        data: &'a GameData,
        party: &'a mut Party,
        enemies: Vec<Enemy>,
        config: BattleConfig,
        rng: BattleRng,
        now: Millis,
    ) -> Self {
        tracing::info!(enemies = enemies.len(), party = party.fighting_indices().len(), "battle start");
        let mut battle = Self {
            data,
            scheduler: TurnScheduler::new(config.max_stale_skips),
            config,
            party,
            enemies,
            rng,
            timeline: AnimationTimeline::new(),
            events: EventQueue::new(),
            phase: Phase::PostPause,
            result: BattleResult::Ongoing,
            actor: None,
            rewards: None,
            log: Vec::new(),
        };
        battle.begin_turn(now);
        battle
    }

    // === Time ===

    /// Advance the battle to `now`.
    pub fn tick(&mut self, now: Millis) {
        self.events.prune(now);
        if self.is_over() {
            return;
        }
        match self.timeline.advance(&self.config, now) {
            TimelineStep::Impact(action) => self.impact(action, now),
            TimelineStep::Recovered => self.phase = Phase::PostPause,
            TimelineStep::Finished => {
                self.scheduler.advance();
                self.begin_turn(now);
            }
            TimelineStep::Idle if self.phase == Phase::PostPause => self.begin_turn(now),
            TimelineStep::Idle | TimelineStep::Running => {}
        }
    }

    fn impact(&mut self, action: Action, now: Millis) {
        let resolver = ActionResolver::new(self.data, &self.config);
        let outcome = resolver.apply(action, self.party, &mut self.enemies, &mut self.events, now);
        if let Some(message) = outcome.message {
            self.push_log(message);
        }
        if outcome.fled {
            self.finish(BattleResult::Fled);
        }
    }

    /// Hand the turn to the next actor, or settle the battle.
    fn begin_turn(&mut self, now: Millis) {
        if self.is_over() {
            return;
        }
        self.actor = None;

        if !self.enemies.iter().any(Enemy::is_alive) {
            if self.events.death_fade_active(now) {
                self.phase = Phase::PostPause;
            } else {
                self.finish_victory();
            }
            return;
        }
        if !self.party.any_fighting() {
            self.finish_defeat();
            return;
        }

        let Some(token) = self.scheduler.current(self.data, self.party, &self.enemies) else {
            tracing::warn!("empty turn order with combatants on both sides");
            self.finish_defeat();
            return;
        };
        self.actor = Some(token);
        tracing::debug!(%token, "turn");

        match token.side {
            Side::Party => self.phase = Phase::MenuSelect { cursor: 0 },
            Side::Enemy => self.enemy_turn(token.index, now),
        }
    }

    fn enemy_turn(&mut self, index: usize, now: Millis) {
        let resolver = ActionResolver::new(self.data, &self.config);
        let built = resolver.enemy_attack(&mut self.rng, self.party, &self.enemies, index);
        let submitted = built
            .map_err(BattleError::from)
            .and_then(|action| self.submit(action, now));
        if let Err(err) = submitted {
            // Skip the turn; the next tick picks up the following token.
            tracing::warn!(%err, enemy = index, "enemy turn skipped");
            self.scheduler.advance();
            self.phase = Phase::PostPause;
        }
    }

    fn submit(&mut self, action: Action, now: Millis) -> Result<(), BattleError> {
        self.timeline.submit(action, &self.config, now)?;
        self.phase = Phase::Animating;
        Ok(())
    }

    fn finish(&mut self, result: BattleResult) {
        self.result = result;
        self.phase = Phase::Finished;
        self.actor = None;
        self.timeline.clear();
        tracing::info!(?result, "battle over");
    }

    fn finish_victory(&mut self) {
        let (exp, gold) = roll_rewards(&self.enemies, &mut self.rng);
        let rewards = split_rewards(self.party, exp, gold);
        self.push_log(format!("Victory! Each gains {} exp. Found {gold} gold.", rewards.share));
        self.rewards = Some(rewards);
        self.finish(BattleResult::Victory);
    }

    fn finish_defeat(&mut self) {
        self.push_log("The party has fallen...".to_string());
        self.finish(BattleResult::Defeat);
    }

    fn push_log(&mut self, line: String) {
        tracing::debug!(%line, "battle log");
        self.log.push(line);
    }

    // === Decisions ===

    /// Roster index of the party member whose command is being chosen.
    fn party_actor(&self) -> Result<usize, BattleError> {
        if self.is_over() {
            return Err(BattleError::BattleOver);
        }
        match (&self.phase, self.actor) {
            (
                Phase::MenuSelect { .. }
                | Phase::SkillSelect { .. }
                | Phase::ItemMenu { .. }
                | Phase::TargetSelect { .. },
                Some(TurnToken {
                    side: Side::Party,
                    index,
                }),
            ) => Ok(index),
            _ => Err(BattleError::NotAcceptingInput(self.phase.kind())),
        }
    }

    fn resolver(&self) -> ActionResolver<'_> {
        ActionResolver::new(self.data, &self.config)
    }

    /// Commands offered to the current party actor. Empty outside a party turn.
    #[must_use]
    pub fn menu_options(&self) -> SmallVec<[MenuOption; 4]> {
        if self.party_actor().is_err() {
            return SmallVec::new();
        }
        let mut options = SmallVec::new();
        options.push(MenuOption::Attack);
        if !self.skill_options().is_empty() {
            options.push(MenuOption::Skill);
        }
        if !self.party.consumables(self.data).is_empty() {
            options.push(MenuOption::Item);
        }
        options.push(MenuOption::Run);
        options
    }

    /// Skills the current actor knows and can pay for right now.
    #[must_use]
    pub fn skill_options(&self) -> SmallVec<[&'a SkillDef; 4]> {
        let Some(member) = self.party_actor().ok().and_then(|i| self.party.member(i)) else {
            return SmallVec::new();
        };
        self.data
            .skills_for(member.class)
            .iter()
            .filter(|skill| skill.affordable(member.mp()))
            .collect()
    }

    /// Consumables usable in battle.
    #[must_use]
    pub fn item_options(&self) -> Vec<ConsumableStock> {
        if self.party_actor().is_err() {
            return Vec::new();
        }
        self.party.consumables(self.data)
    }

    /// Valid targets for the pending command, in display order.
    #[must_use]
    pub fn target_candidates(&self) -> SmallVec<[CombatantRef; 8]> {
        let Phase::TargetSelect { intent, .. } = &self.phase else {
            return SmallVec::new();
        };
        match intent.side() {
            Side::Enemy => self
                .enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| e.is_alive())
                .map(|(i, _)| CombatantRef::enemy(i))
                .collect(),
            Side::Party => self
                .party
                .fighting_indices()
                .into_iter()
                .map(CombatantRef::party)
                .collect(),
        }
    }

    /// Choose a top-level command.
    ///
    /// Attack, Skill and Item open the next menu; Run resolves immediately.
    /// An option not currently offered is refused without changing state.
    pub fn select_option(&mut self, option: MenuOption, now: Millis) -> Result<(), BattleError> {
        let actor = self.party_actor()?;
        if !self.menu_options().contains(&option) {
            return Err(BattleError::OptionUnavailable(option));
        }
        match option {
            MenuOption::Attack => {
                self.phase = Phase::TargetSelect {
                    intent: TargetIntent::Attack,
                    cursor: 0,
                }
            }
            MenuOption::Skill => self.phase = Phase::SkillSelect { cursor: 0 },
            MenuOption::Item => self.phase = Phase::ItemMenu { cursor: 0 },
            MenuOption::Run => {
                let mut rng = self.rng.clone();
                let action = self.resolver().run(&mut rng, self.party, actor)?;
                self.submit(action, now)?;
                self.rng = rng;
            }
        }
        Ok(())
    }

    /// Choose a skill; moves on to target selection.
    pub fn select_skill(&mut self, kind: SkillKind) -> Result<(), BattleError> {
        let actor = self.party_actor()?;
        let member = self.party.member(actor).ok_or(ResolveError::NoActor)?;
        let skill = self.data.skill(member.class, kind).ok_or(ResolveError::NotACaster {
            class: member.class,
            kind,
        })?;
        if !skill.affordable(member.mp()) {
            return Err(ResolveError::InsufficientMp {
                need: skill.cost.max(1),
                have: member.mp(),
            }
            .into());
        }
        self.phase = Phase::TargetSelect {
            intent: TargetIntent::Skill(kind),
            cursor: 0,
        };
        Ok(())
    }

    /// Choose a consumable; moves on to target selection.
    pub fn select_item(&mut self, item_id: &str) -> Result<(), BattleError> {
        self.party_actor()?;
        if !self.party.consumables(self.data).iter().any(|s| s.item_id == item_id) {
            return Err(ResolveError::ItemUnavailable(item_id.to_string()).into());
        }
        self.phase = Phase::TargetSelect {
            intent: TargetIntent::Item(item_id.to_string()),
            cursor: 0,
        };
        Ok(())
    }

    /// Confirm a target and start the action.
    ///
    /// All rolls happen here. A refused target leaves the battle, the rng
    /// and the party untouched.
    pub fn select_target(&mut self, target: CombatantRef, now: Millis) -> Result<(), BattleError> {
        let actor = self.party_actor()?;
        let Phase::TargetSelect { intent, .. } = &self.phase else {
            return Err(BattleError::NotAcceptingInput(self.phase.kind()));
        };
        if target.side != intent.side() {
            return Err(ResolveError::InvalidTarget(target).into());
        }

        // Build against a scratch rng so a refusal consumes no randomness.
        let mut rng = self.rng.clone();
        let resolver = self.resolver();
        let action = match intent {
            TargetIntent::Attack => resolver.attack(&mut rng, self.party, &self.enemies, actor, Some(target.index)),
            TargetIntent::Skill(SkillKind::Spell) => {
                resolver.spell(&mut rng, self.party, &self.enemies, actor, Some(target.index))
            }
            TargetIntent::Skill(SkillKind::Heal) => resolver.heal(&mut rng, self.party, actor, Some(target.index)),
            TargetIntent::Item(item_id) => resolver.use_item(self.party, actor, item_id, Some(target.index)),
        }?;

        self.timeline.submit(action, &self.config, now)?;
        self.rng = rng;
        self.phase = Phase::Animating;
        Ok(())
    }

    /// Feed one navigation input.
    pub fn handle_input(&mut self, input: BattleInput, now: Millis) -> Result<(), BattleError> {
        self.party_actor()?;
        let forward = matches!(input, BattleInput::Down | BattleInput::Right);

        match self.phase.clone() {
            Phase::MenuSelect { cursor } => {
                let options = self.menu_options();
                let cursor = cursor.min(options.len().saturating_sub(1));
                match input {
                    BattleInput::Confirm => match options.get(cursor) {
                        Some(&option) => self.select_option(option, now)?,
                        None => return Err(BattleError::NotAcceptingInput(PhaseKind::MenuSelect)),
                    },
                    BattleInput::Cancel => {}
                    _ => {
                        self.phase = Phase::MenuSelect {
                            cursor: wrap_step(cursor, options.len(), forward),
                        }
                    }
                }
            }
            Phase::SkillSelect { cursor } => {
                let skills = self.skill_options();
                match input {
                    BattleInput::Confirm => match skills.get(cursor) {
                        Some(skill) => self.select_skill(skill.kind)?,
                        None => return Err(ResolveError::NoTarget.into()),
                    },
                    BattleInput::Cancel => self.back_to_menu(MenuOption::Skill),
                    _ => {
                        self.phase = Phase::SkillSelect {
                            cursor: wrap_step(cursor, skills.len(), forward),
                        }
                    }
                }
            }
            Phase::ItemMenu { cursor } => {
                let items = self.item_options();
                match input {
                    BattleInput::Confirm => match items.get(cursor) {
                        Some(stock) => self.select_item(&stock.item_id)?,
                        None => return Err(ResolveError::NoTarget.into()),
                    },
                    BattleInput::Cancel => self.back_to_menu(MenuOption::Item),
                    _ => {
                        self.phase = Phase::ItemMenu {
                            cursor: wrap_step(cursor, items.len(), forward),
                        }
                    }
                }
            }
            Phase::TargetSelect { intent, cursor } => {
                let candidates = self.target_candidates();
                match input {
                    BattleInput::Confirm => match candidates.get(cursor) {
                        Some(&target) => self.select_target(target, now)?,
                        None => return Err(ResolveError::NoTarget.into()),
                    },
                    BattleInput::Cancel => match intent {
                        TargetIntent::Attack => self.back_to_menu(MenuOption::Attack),
                        TargetIntent::Skill(_) => self.phase = Phase::SkillSelect { cursor: 0 },
                        TargetIntent::Item(_) => self.phase = Phase::ItemMenu { cursor: 0 },
                    },
                    _ => {
                        self.phase = Phase::TargetSelect {
                            intent,
                            cursor: wrap_step(cursor, candidates.len(), forward),
                        }
                    }
                }
            }
            Phase::Animating | Phase::PostPause | Phase::Finished => {
                return Err(BattleError::NotAcceptingInput(self.phase.kind()));
            }
        }
        Ok(())
    }

    fn back_to_menu(&mut self, from: MenuOption) {
        let cursor = self.menu_options().iter().position(|&o| o == from).unwrap_or(0);
        self.phase = Phase::MenuSelect { cursor };
    }

    // === Queries ===

    #[must_use]
    pub fn result(&self) -> BattleResult {
        self.result
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result != BattleResult::Ongoing
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn party(&self) -> &Party {
        self.party
    }

    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    #[must_use]
    pub fn data(&self) -> &'a GameData {
        self.data
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Whose turn it is. `None` between turns and after the battle.
    #[must_use]
    pub fn current_actor(&self) -> Option<TurnToken> {
        self.actor
    }

    /// Rng position, for saving a battle in progress.
    #[must_use]
    pub fn rng_state(&self) -> BattleRngState {
        self.rng.state()
    }

    #[must_use]
    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn timeline(&self) -> &AnimationTimeline {
        &self.timeline
    }

    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Rewards paid out, once the battle is won.
    #[must_use]
    pub fn rewards(&self) -> Option<&Rewards> {
        self.rewards.as_ref()
    }

    /// Log lines not yet drained.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Take every pending log line.
    pub fn drain_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self, now: Millis) -> BattleView {
        BattleView::capture(self, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ItemDef;
    use crate::roster::{Attributes, Character, CharacterClass};

    fn data() -> GameData {
        GameData::new()
            .with_item(ItemDef::potion("potion", "Potion", 8))
            .with_skill(CharacterClass::Mage, SkillDef::new(SkillKind::Spell, "Spark"))
            .with_skill(CharacterClass::Priest, SkillDef::new(SkillKind::Heal, "Heal"))
    }

    fn fast_party(class: CharacterClass) -> Party {
        let attrs = Attributes {
            agility: 18,
            ..Attributes::uniform(12)
        };
        let mut party = Party::new();
        party.recruit(Character::new("Hero", class, attrs));
        party
    }

    fn run_until_menu(battle: &mut BattleController<'_>, now: &mut u64) {
        for _ in 0..10_000 {
            if battle.is_over() || matches!(battle.phase(), Phase::MenuSelect { .. }) {
                return;
            }
            *now += 10;
            battle.tick(Millis(*now));
        }
        panic!("battle stuck in {:?}", battle.phase());
    }

    #[test]
    fn test_party_turn_opens_menu() {
        let data = data();
        let mut party = fast_party(CharacterClass::Fighter);
        let battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );

        assert_eq!(battle.phase(), &Phase::MenuSelect { cursor: 0 });
        assert_eq!(battle.current_actor(), Some(CombatantRef::party(0)));
        assert_eq!(battle.menu_options().as_slice(), &[MenuOption::Attack, MenuOption::Run]);
    }

    #[test]
    fn test_mage_without_mp_gets_no_skill_entry() {
        let data = data();
        let mut party = fast_party(CharacterClass::Mage);
        party.member_mut(0).unwrap().set_mp(0);
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );

        assert!(!battle.menu_options().contains(&MenuOption::Skill));
        let before = battle.phase().clone();
        assert_eq!(
            battle.select_option(MenuOption::Skill, Millis(5)),
            Err(BattleError::OptionUnavailable(MenuOption::Skill))
        );
        assert_eq!(battle.phase(), &before);
        assert!(!battle.timeline().is_busy());
    }

    #[test]
    fn test_skill_menu_lists_only_affordable_skills() {
        let data = GameData::new()
            .with_skill(CharacterClass::Mage, SkillDef::new(SkillKind::Heal, "Big Heal").with_cost(5))
            .with_skill(CharacterClass::Mage, SkillDef::new(SkillKind::Spell, "Spark"));
        let mut party = fast_party(CharacterClass::Mage);
        party.member_mut(0).unwrap().set_mp(2);
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );

        battle.select_option(MenuOption::Skill, Millis(0)).unwrap();
        let names: Vec<&str> = battle.skill_options().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Spark"]);
        assert_eq!(battle.view(Millis(0)).submenu, vec!["Spark".to_string()]);

        // The first row is the affordable spell, not the unaffordable heal.
        battle.handle_input(BattleInput::Confirm, Millis(0)).unwrap();
        assert_eq!(battle.phase(), &Phase::TargetSelect {
            intent: TargetIntent::Skill(SkillKind::Spell),
            cursor: 0,
        });

        battle.handle_input(BattleInput::Cancel, Millis(0)).unwrap();
        assert_eq!(
            battle.select_skill(SkillKind::Heal),
            Err(BattleError::Resolve(ResolveError::InsufficientMp { need: 5, have: 2 }))
        );
        assert_eq!(battle.phase(), &Phase::SkillSelect { cursor: 0 });
    }

    #[test]
    fn test_input_refused_while_animating() {
        let data = data();
        let mut party = fast_party(CharacterClass::Fighter);
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 50, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );

        battle.select_option(MenuOption::Attack, Millis(0)).unwrap();
        battle.select_target(CombatantRef::enemy(0), Millis(0)).unwrap();
        assert_eq!(battle.phase().kind(), PhaseKind::Animating);

        assert_eq!(
            battle.handle_input(BattleInput::Confirm, Millis(1)),
            Err(BattleError::NotAcceptingInput(PhaseKind::Animating))
        );
        assert_eq!(
            battle.select_option(MenuOption::Run, Millis(1)),
            Err(BattleError::NotAcceptingInput(PhaseKind::Animating))
        );
    }

    #[test]
    fn test_wrong_side_target_refused() {
        let data = data();
        let mut party = fast_party(CharacterClass::Fighter);
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );

        battle.select_option(MenuOption::Attack, Millis(0)).unwrap();
        assert_eq!(
            battle.select_target(CombatantRef::party(0), Millis(0)),
            Err(BattleError::Resolve(ResolveError::InvalidTarget(CombatantRef::party(0))))
        );
        assert_eq!(battle.phase().kind(), PhaseKind::TargetSelect);
    }

    #[test]
    fn test_menu_navigation_wraps_and_cancels() {
        let data = data();
        let mut party = fast_party(CharacterClass::Priest);
        party.inventory.push("potion".into());
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );

        assert_eq!(battle.menu_options().len(), 4);
        battle.handle_input(BattleInput::Up, Millis(0)).unwrap();
        assert_eq!(battle.phase(), &Phase::MenuSelect { cursor: 3 });
        battle.handle_input(BattleInput::Up, Millis(0)).unwrap();
        battle.handle_input(BattleInput::Confirm, Millis(0)).unwrap();
        assert_eq!(battle.phase(), &Phase::ItemMenu { cursor: 0 });

        battle.handle_input(BattleInput::Confirm, Millis(0)).unwrap();
        assert_eq!(battle.target_candidates().as_slice(), &[CombatantRef::party(0)]);
        battle.handle_input(BattleInput::Cancel, Millis(0)).unwrap();
        assert_eq!(battle.phase(), &Phase::ItemMenu { cursor: 0 });
        battle.handle_input(BattleInput::Cancel, Millis(0)).unwrap();
        assert_eq!(battle.phase(), &Phase::MenuSelect { cursor: 2 });
    }

    #[test]
    fn test_attack_resolves_and_returns_to_menu() {
        let data = data();
        let mut party = fast_party(CharacterClass::Fighter);
        let config = BattleConfig::default();
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Ogre", 60, 8, 1).with_attack(1, 1)],
            config,
            BattleRng::new(4),
            Millis(0),
        );

        battle.select_option(MenuOption::Attack, Millis(0)).unwrap();
        battle.select_target(CombatantRef::enemy(0), Millis(0)).unwrap();

        let mut now = 0;
        run_until_menu(&mut battle, &mut now);
        assert!(!battle.is_over());
        // Hero, then the ogre, then the hero again.
        assert_eq!(battle.current_actor(), Some(CombatantRef::party(0)));
        let log = battle.drain_log();
        assert_eq!(log.len(), 2);
        assert!(log[0].starts_with("Hero"));
        assert!(log[1].starts_with("Ogre"));
        assert!(battle.log().is_empty());
    }

    #[test]
    fn test_run_success_flees() {
        let data = data();
        let mut party = fast_party(CharacterClass::Fighter);
        let mut battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default().with_run_chance(1.0),
            BattleRng::new(1),
            Millis(0),
        );

        battle.select_option(MenuOption::Run, Millis(0)).unwrap();
        let mut now = 0;
        while !battle.is_over() && now < 5_000 {
            now += 10;
            battle.tick(Millis(now));
        }
        assert_eq!(battle.result(), BattleResult::Fled);
        assert_eq!(battle.phase(), &Phase::Finished);
        assert_eq!(battle.enemies()[0].hp(), 5);
        assert_eq!(battle.log(), &["You fled!".to_string()]);
        assert_eq!(
            battle.select_option(MenuOption::Attack, Millis(now)),
            Err(BattleError::BattleOver)
        );
    }

    #[test]
    fn test_no_enemies_is_immediate_victory() {
        let data = data();
        let mut party = fast_party(CharacterClass::Fighter);
        let battle = BattleController::with_enemies(
            &data,
            &mut party,
            Vec::new(),
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );
        assert_eq!(battle.result(), BattleResult::Victory);
        assert_eq!(battle.rewards().map(|r| r.total_exp), Some(0));
    }

    #[test]
    fn test_no_party_is_immediate_defeat() {
        let data = data();
        let mut party = Party::new();
        let battle = BattleController::with_enemies(
            &data,
            &mut party,
            vec![Enemy::fixed("Rat", 5, 8, 3)],
            BattleConfig::default(),
            BattleRng::new(1),
            Millis(0),
        );
        assert_eq!(battle.result(), BattleResult::Defeat);
        assert_eq!(battle.log(), &["The party has fallen...".to_string()]);
    }
}
