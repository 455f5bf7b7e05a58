//! End-to-end battle tests driven through the controller's public API.
//!
//! Every battle here runs on a fixed seed and a simulated clock that moves
//! 10 ms per tick.

use dungeon_battle::battle::{
    ActionEffect, ActionResolver, BattleController, BattleError, BattleInput, BattleResult, CombatantRef, EventKind,
    MenuOption, Phase, PhaseKind,
};
use dungeon_battle::core::{BattleConfig, BattleRng, Millis};
use dungeon_battle::data::{EncounterTable, GameData, ItemDef, MonsterTemplate, SkillDef, SkillKind};
use dungeon_battle::roster::{Attributes, Character, CharacterClass, Enemy, Party};

const TICK_MS: u64 = 10;
const TICK_LIMIT: u64 = 200_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn game_data() -> GameData {
    GameData::new()
        .with_item(ItemDef::potion("potion", "Potion", 8))
        .with_monster(MonsterTemplate::new("goblin", "Goblin").with_hp(3, 5).with_agi(4))
        .with_skill(CharacterClass::Mage, SkillDef::new(SkillKind::Spell, "Spark"))
        .with_skill(CharacterClass::Priest, SkillDef::new(SkillKind::Heal, "Heal"))
}

fn hero(name: &str, class: CharacterClass, agility: i32) -> Character {
    let attrs = Attributes {
        agility,
        ..Attributes::uniform(12)
    };
    Character::new(name, class, attrs)
}

/// Attack the first candidate on every party turn until the battle ends.
fn auto_battle(battle: &mut BattleController<'_>, now: &mut u64) {
    while !battle.is_over() && *now < TICK_LIMIT {
        if matches!(battle.phase(), Phase::MenuSelect { .. }) {
            battle.select_option(MenuOption::Attack, Millis(*now)).unwrap();
            let target = battle.target_candidates()[0];
            battle.select_target(target, Millis(*now)).unwrap();
        }
        *now += TICK_MS;
        battle.tick(Millis(*now));
    }
}

// =============================================================================
// Hit Chance and Rolls
// =============================================================================

#[test]
fn test_attack_hit_chance_and_damage_from_seed() {
    let data = game_data();
    let config = BattleConfig::default();
    let resolver = ActionResolver::new(&data, &config);
    let mut party = Party::new();
    // Strength 14 gives +2 to hit and damage.
    party.recruit(Character::new("Aric", CharacterClass::Fighter, Attributes::uniform(14)));
    let enemies = vec![Enemy::fixed("Goblin", 20, 8, 5)];

    for seed in 0..50 {
        let rng = BattleRng::new(seed);
        let mut probe = rng.clone();
        let roll = probe.unit();
        let die = probe.gen_range(1..=6);

        let action = resolver.attack(&mut rng.clone(), &party, &enemies, 0, Some(0)).unwrap();
        let ActionEffect::Attack { hit, damage, .. } = action.effect else {
            panic!("expected an attack, got {:?}", action.effect);
        };
        assert_eq!(hit, roll < 0.67, "seed {seed}");
        assert_eq!(damage, (die + 2).max(1), "seed {seed}");
    }
}

#[test]
fn test_hp_changes_only_at_impact() {
    let data = game_data();
    let config = BattleConfig::default();
    let mut party = Party::new();
    party.recruit(hero("Aric", CharacterClass::Fighter, 18).with_weapon_atk(20));
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        vec![Enemy::fixed("Ogre", 100, 8, 1)],
        config,
        BattleRng::new(3),
        Millis(0),
    );

    battle.select_option(MenuOption::Attack, Millis(0)).unwrap();
    battle.select_target(CombatantRef::enemy(0), Millis(0)).unwrap();

    let mut now = 0;
    while now < 370 {
        now += TICK_MS;
        battle.tick(Millis(now));
        assert_eq!(battle.enemies()[0].hp(), 100, "hp changed before impact at {now} ms");
    }
    // Windup 240 + pre-impact 140.
    battle.tick(Millis(380));
    let after_impact = battle.enemies()[0].hp();
    assert!(after_impact < 100);

    for t in (390..1_000).step_by(10) {
        battle.tick(Millis(t));
        if battle.phase().kind() == PhaseKind::MenuSelect {
            break;
        }
        assert_eq!(battle.enemies()[0].hp(), after_impact, "hp changed twice");
    }
}

// =============================================================================
// Encounters
// =============================================================================

#[test]
fn test_goblin_encounter_group_size() {
    init_tracing();
    let data = game_data();
    let table = EncounterTable::new(["goblin"], 1, 3);

    for seed in 0..40 {
        let mut party = Party::new();
        party.recruit(hero("Aric", CharacterClass::Fighter, 10));
        let battle = BattleController::start(
            &data,
            &mut party,
            &table,
            BattleConfig::default(),
            BattleRng::new(seed),
            Millis(0),
        );
        let count = battle.enemies().len();
        assert!((1..=3).contains(&count), "seed {seed} drew {count} goblins");
        assert!(battle.enemies().iter().all(|e| e.name == "Goblin"));
    }
}

// =============================================================================
// Menu Availability
// =============================================================================

#[test]
fn test_mage_without_mp_cannot_pick_skill() {
    let data = game_data();
    let mut mage = hero("Mira", CharacterClass::Mage, 18);
    mage.set_mp(0);
    let mut party = Party::new();
    party.recruit(mage);
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        vec![Enemy::fixed("Rat", 5, 8, 2)],
        BattleConfig::default(),
        BattleRng::new(1),
        Millis(0),
    );

    let options = battle.menu_options();
    assert!(!options.contains(&MenuOption::Skill));
    assert_eq!(battle.view(Millis(0)).menu, vec![MenuOption::Attack, MenuOption::Run]);

    let log_before = battle.log().to_vec();
    let err = battle.select_option(MenuOption::Skill, Millis(0)).unwrap_err();
    assert_eq!(err, BattleError::OptionUnavailable(MenuOption::Skill));
    assert_eq!(battle.phase(), &Phase::MenuSelect { cursor: 0 });
    assert_eq!(battle.log(), log_before.as_slice());
    assert_eq!(battle.party().member(0).unwrap().mp(), 0);

    // Going through the skill submenu directly is refused too.
    assert!(matches!(
        battle.select_skill(SkillKind::Spell),
        Err(BattleError::Resolve(_))
    ));
    assert_eq!(battle.phase(), &Phase::MenuSelect { cursor: 0 });
}

#[test]
fn test_spell_through_input_costs_mp() {
    let data = game_data();
    let mut party = Party::new();
    party.recruit(hero("Mira", CharacterClass::Mage, 18));
    let mp_before = party.member(0).unwrap().mp();
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        vec![Enemy::fixed("Ogre", 100, 8, 1)],
        BattleConfig::default(),
        BattleRng::new(6),
        Millis(0),
    );

    // Attack, Skill, Run: move down once to Skill.
    battle.handle_input(BattleInput::Down, Millis(0)).unwrap();
    battle.handle_input(BattleInput::Confirm, Millis(0)).unwrap();
    assert_eq!(battle.phase(), &Phase::SkillSelect { cursor: 0 });
    battle.handle_input(BattleInput::Confirm, Millis(0)).unwrap();
    battle.handle_input(BattleInput::Confirm, Millis(0)).unwrap();
    assert_eq!(battle.phase().kind(), PhaseKind::Animating);
    // Nothing is paid until impact.
    assert_eq!(battle.party().member(0).unwrap().mp(), mp_before);

    battle.tick(Millis(240));
    battle.tick(Millis(380));
    assert_eq!(battle.party().member(0).unwrap().mp(), mp_before - 1);
    assert!(battle.enemies()[0].hp() < 100);
}

// =============================================================================
// Victory, Rewards and Defeat
// =============================================================================

#[test]
fn test_victory_splits_experience_and_pools_gold() {
    init_tracing();
    let data = game_data();
    let mut fallen = hero("Bran", CharacterClass::Fighter, 10);
    fallen.set_hp(0);
    let mut party = Party::new();
    party.recruit(hero("Aric", CharacterClass::Fighter, 14));
    party.recruit(fallen);
    party.recruit(hero("Cora", CharacterClass::Thief, 16));

    let enemies = vec![
        Enemy::fixed("Goblin", 1, 8, 5).with_loot(20, 5, 5),
        Enemy::fixed("Hobgoblin", 1, 8, 6).with_loot(25, 7, 7),
    ];
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        enemies,
        BattleConfig::default().with_enemy_hit_chance(0.0),
        BattleRng::new(21),
        Millis(0),
    );

    let mut now = 0;
    auto_battle(&mut battle, &mut now);
    assert_eq!(battle.result(), BattleResult::Victory);

    let rewards = battle.rewards().cloned().unwrap();
    assert_eq!(rewards.total_exp, 45);
    assert_eq!(rewards.total_gold, 12);
    // 45 split two ways; the odd point is dropped.
    assert_eq!(rewards.share, 22);
    assert_eq!(rewards.recipients.as_slice(), &[0, 2]);

    let party = battle.party();
    assert_eq!(party.member(0).unwrap().exp, 22);
    assert_eq!(party.member(1).unwrap().exp, 0);
    assert_eq!(party.member(2).unwrap().exp, 22);
    assert_eq!(party.gold, 12);
}

#[test]
fn test_victory_waits_for_death_fade() {
    let data = game_data();
    let config = BattleConfig::default();
    let fade_ms = config.death_fade_ms;
    let mut party = Party::new();
    party.recruit(hero("Aric", CharacterClass::Fighter, 18).with_weapon_atk(20));
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        vec![Enemy::fixed("Rat", 1, 8, 1)],
        config,
        BattleRng::new(2),
        Millis(0),
    );

    battle.select_option(MenuOption::Attack, Millis(0)).unwrap();
    battle.select_target(CombatantRef::enemy(0), Millis(0)).unwrap();

    let mut now = 0;
    let mut killed_at = None;
    while !battle.is_over() && now < 5_000 {
        now += TICK_MS;
        battle.tick(Millis(now));
        if killed_at.is_none() && !battle.enemies()[0].is_alive() {
            killed_at = Some(now);
        }
        if battle.events().death_fade_active(Millis(now)) {
            assert_eq!(battle.result(), BattleResult::Ongoing, "victory during fade at {now} ms");
        }
    }

    let killed_at = killed_at.unwrap();
    assert_eq!(battle.result(), BattleResult::Victory);
    assert!(now >= killed_at + fade_ms, "victory at {now} ms, kill at {killed_at} ms");
}

#[test]
fn test_party_wipe_is_defeat() {
    let data = game_data();
    let mut party = Party::new();
    party.recruit(hero("Aric", CharacterClass::Fighter, 1));
    party.recruit(hero("Bran", CharacterClass::Fighter, 1));
    let enemies = vec![Enemy::fixed("Dragon", 500, 8, 30).with_attack(99, 99)];
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        enemies,
        BattleConfig::default().with_enemy_hit_chance(1.0),
        BattleRng::new(8),
        Millis(0),
    );

    let mut now = 0;
    auto_battle(&mut battle, &mut now);
    assert_eq!(battle.result(), BattleResult::Defeat);
    assert!(battle.party().members().iter().all(|m| !m.is_alive()));
    assert!(battle.party().members().iter().all(|m| m.hp() == 0));
    assert_eq!(battle.log().last().map(String::as_str), Some("The party has fallen..."));

    // Nothing moves after the result.
    let dragon_hp = battle.enemies()[0].hp();
    let log_len = battle.log().len();
    for t in 1..100 {
        battle.tick(Millis(now + t * TICK_MS));
    }
    assert_eq!(battle.enemies()[0].hp(), dragon_hp);
    assert_eq!(battle.log().len(), log_len);
    assert_eq!(battle.current_actor(), None);
    assert_eq!(
        battle.handle_input(BattleInput::Confirm, Millis(now)),
        Err(BattleError::BattleOver)
    );
}

#[test]
fn test_successful_run_leaves_everyone_untouched() {
    let data = game_data();
    let mut party = Party::new();
    party.recruit(hero("Aric", CharacterClass::Fighter, 18));
    let before = party.clone();
    let enemies = vec![Enemy::fixed("Rat", 5, 8, 2)];
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        enemies.clone(),
        BattleConfig::default().with_run_chance(1.0),
        BattleRng::new(5),
        Millis(0),
    );

    battle.select_option(MenuOption::Run, Millis(0)).unwrap();
    let mut now = 0;
    while !battle.is_over() && now < 5_000 {
        now += TICK_MS;
        battle.tick(Millis(now));
    }

    assert_eq!(battle.result(), BattleResult::Fled);
    assert_eq!(battle.enemies(), enemies.as_slice());
    assert_eq!(battle.party(), &before);
    assert!(battle.rewards().is_none());
}

#[test]
fn test_floaters_outlive_a_successful_run() {
    init_tracing();
    let data = game_data();
    let config = BattleConfig {
        floater_ms: 10_000,
        ..BattleConfig::default().with_run_chance(1.0).with_enemy_hit_chance(0.0)
    };
    let mut party = Party::new();
    party.recruit(hero("Aric", CharacterClass::Fighter, 18));
    // Armor class 40 puts the hit chance above 1.
    let mut battle = BattleController::with_enemies(
        &data,
        &mut party,
        vec![Enemy::fixed("Troll", 500, 40, 1)],
        config,
        BattleRng::new(3),
        Millis(0),
    );

    battle.select_option(MenuOption::Attack, Millis(0)).unwrap();
    battle.select_target(CombatantRef::enemy(0), Millis(0)).unwrap();
    let mut now = 0;
    while !matches!(battle.phase(), Phase::MenuSelect { .. }) {
        now += TICK_MS;
        battle.tick(Millis(now));
        assert!(now < 5_000, "stuck in {:?}", battle.phase());
    }
    assert!(battle.enemies()[0].hp() < 500);

    battle.select_option(MenuOption::Run, Millis(now)).unwrap();
    while !battle.is_over() {
        now += TICK_MS;
        battle.tick(Millis(now));
        assert!(now < 10_000, "run never resolved");
    }
    assert_eq!(battle.result(), BattleResult::Fled);
    assert!(!battle.timeline().is_busy());

    let floater = battle
        .events()
        .live(Millis(now))
        .find(|e| e.target == CombatantRef::enemy(0) && matches!(e.kind, EventKind::Damage(_)))
        .cloned()
        .expect("damage floater still live after fleeing");
    let expires = floater.started.0 + floater.duration_ms;
    assert!(expires > now);

    battle.tick(Millis(expires - 1));
    assert!(battle.events().events().contains(&floater));
    battle.tick(Millis(expires));
    assert!(!battle.events().events().contains(&floater));
    assert_eq!(battle.result(), BattleResult::Fled);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_battle() {
    let data = game_data();
    let table = EncounterTable::new(["goblin"], 2, 3);

    let play = |seed: u64| {
        let mut party = Party::new();
        party.recruit(hero("Aric", CharacterClass::Fighter, 12));
        party.recruit(hero("Cora", CharacterClass::Thief, 15));
        let mut battle = BattleController::start(
            &data,
            &mut party,
            &table,
            BattleConfig::default(),
            BattleRng::new(seed),
            Millis(0),
        );
        let mut now = 0;
        auto_battle(&mut battle, &mut now);
        let log = battle.drain_log();
        let result = battle.result();
        drop(battle);
        (result, log, party, now)
    };

    assert_eq!(play(77), play(77));
}
