//! Battles built from JSON data and configuration.

use dungeon_battle::battle::{stage_plan, BattleController, BattleResult, CombatantRef, MenuOption, Phase, Stage};
use dungeon_battle::core::{BattleConfig, BattleRng, Millis, StageProfile};
use dungeon_battle::data::{EncounterTable, GameData, SkillKind};
use dungeon_battle::roster::{Attributes, Character, CharacterClass, Party};

const ITEMS: &str = r#"[
    { "id": "potion_small", "name": "Small Potion", "type": "consumable", "heal": 8, "price": 10 },
    { "id": "ring_swift", "name": "Swift Ring", "type": "accessory", "agi": 3 },
    { "id": "torch", "name": "Torch", "type": "tool" }
]"#;

const MONSTERS: &str = r#"[
    { "id": "slime", "name": "Slime", "hp_low": 30, "hp_high": 30, "ac": 10,
      "atk_low": 1, "atk_high": 1, "exp": 5, "gold_low": 1, "gold_high": 2, "agi": 1 }
]"#;

const SKILLS: &str = r#"{
    "classes": {
        "Priest": [ { "id": "heal", "name": "Heal", "cost": 2 } ]
    }
}"#;

const CONFIG: &str = r#"{
    "stage_profile": "three_stage",
    "post_action_pause_ms": 100,
    "enemy_hit_chance": 0.0
}"#;

fn load() -> (GameData, BattleConfig) {
    let data = GameData::from_json(ITEMS, MONSTERS, SKILLS).unwrap();
    let config = BattleConfig::from_json(CONFIG).unwrap();
    (data, config)
}

fn priest() -> Character {
    let attrs = Attributes {
        agility: 16,
        ..Attributes::uniform(12)
    };
    Character::new("Tom", CharacterClass::Priest, attrs)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_config_overrides_and_defaults() {
    let (_, config) = load();
    assert_eq!(config.stage_profile, StageProfile::ThreeStage);
    assert_eq!(config.post_action_pause_ms, 100);
    let plan: Vec<(Stage, u64)> = stage_plan(&config).into_vec();
    assert_eq!(plan, vec![(Stage::Windup, 240), (Stage::Impact, 240), (Stage::Recover, 160)]);
    // Unspecified fields keep their defaults.
    assert!((config.run_chance - 0.55).abs() < f64::EPSILON);
    assert_eq!(config.death_fade_ms, 600);
}

#[test]
fn test_unknown_item_type_is_not_usable() {
    let (data, config) = load();
    let mut party = Party::new();
    party.recruit(priest());
    party.inventory = vec!["torch".to_string(), "ring_swift".to_string()];
    let table = EncounterTable::new(["slime"], 1, 1);
    let battle = BattleController::start(&data, &mut party, &table, config, BattleRng::new(1), Millis(0));

    assert!(battle.item_options().is_empty());
    assert!(!battle.menu_options().contains(&MenuOption::Item));
}

// =============================================================================
// Heal and Item Flow
// =============================================================================

#[test]
fn test_heal_skill_and_potion_in_three_stages() {
    let (data, config) = load();
    let mut tom = priest();
    tom.set_hp(2);
    let max_hp = tom.max_hp();
    let mut party = Party::new();
    party.recruit(tom);
    party.inventory.push("potion_small".to_string());
    let table = EncounterTable::new(["slime"], 1, 1);

    let mut battle = BattleController::start(&data, &mut party, &table, config, BattleRng::new(4), Millis(0));
    assert_eq!(battle.enemies().len(), 1);
    assert_eq!(battle.current_actor(), Some(CombatantRef::party(0)));
    assert_eq!(
        battle.menu_options().as_slice(),
        &[MenuOption::Attack, MenuOption::Skill, MenuOption::Item, MenuOption::Run]
    );

    // Heal: Windup 240, then Impact.
    battle.select_option(MenuOption::Skill, Millis(0)).unwrap();
    battle.select_skill(SkillKind::Heal).unwrap();
    battle.select_target(CombatantRef::party(0), Millis(0)).unwrap();
    battle.tick(Millis(239));
    assert_eq!(battle.party().member(0).unwrap().hp(), 2);
    battle.tick(Millis(240));
    let view = battle.view(Millis(240));
    assert_eq!(view.animation.map(|a| a.stage), Some(Stage::Impact));
    let healed = battle.party().member(0).unwrap().hp();
    assert!(healed > 2);
    assert_eq!(
        battle.party().member(0).unwrap().mp(),
        battle.party().member(0).unwrap().max_mp() - 2
    );

    // Finish the turn, let the slime miss, and come back around.
    let mut now = 240;
    while !matches!(battle.phase(), Phase::MenuSelect { .. }) {
        now += 10;
        battle.tick(Millis(now));
        assert!(now < 10_000);
    }

    battle.select_option(MenuOption::Item, Millis(now)).unwrap();
    battle.select_item("potion_small").unwrap();
    battle.select_target(CombatantRef::party(0), Millis(now)).unwrap();
    battle.tick(Millis(now + 240));

    assert_eq!(battle.party().member(0).unwrap().hp(), (healed + 8).min(max_hp));
    assert!(battle.party().inventory.is_empty());
    assert_eq!(battle.result(), BattleResult::Ongoing);
}
