//! Battle tuning configuration.
//!
//! Every probability, roll range and animation duration the engine uses lives
//! in [`BattleConfig`]. Defaults reproduce the classic tuning; games override
//! individual values with the `with_*` builders or by loading JSON.

use serde::{Deserialize, Serialize};

use super::error::DataError;

/// Which animation timeline an action plays through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageProfile {
    /// Windup, Impact, Recover.
    ThreeStage,
    /// Windup, PreImpact, Impact, Recover.
    FourStage,
}

/// Stage durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDurations {
    /// Actor flashes.
    pub windup: u64,
    /// Brief hold before the hit lands. Only used by [`StageProfile::FourStage`].
    pub pre_impact: u64,
    /// Target reacts; the effect is applied on entry.
    pub impact: u64,
    /// Settle back.
    pub recover: u64,
}

impl Default for StageDurations {
    fn default() -> Self {
        Self {
            windup: 240,
            pre_impact: 140,
            impact: 240,
            recover: 160,
        }
    }
}

/// Tuning for hit chances, rolls, timings and scheduler limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Party attack base hit probability.
    pub attack_base_hit: f64,
    /// Hit probability added per point of attack bonus.
    pub attack_hit_per_bonus: f64,
    /// Hit probability removed per point of target AC below 10.
    pub attack_hit_per_ac: f64,
    /// Weapon damage die, inclusive.
    pub weapon_die: (i32, i32),
    /// Spell damage roll before the casting modifier, inclusive.
    pub spell_roll: (i32, i32),
    /// Heal roll before the piety modifier, inclusive.
    pub heal_roll: (i32, i32),
    /// Probability that an enemy attack hits.
    pub enemy_hit_chance: f64,
    /// Probability that a run attempt succeeds.
    pub run_chance: f64,
    /// Monster agility range when a template omits it, inclusive.
    pub default_monster_agility: (i32, i32),

    /// Animation profile used for every action.
    pub stage_profile: StageProfile,
    /// Per-stage durations.
    pub stages: StageDurations,
    /// Pause between the end of one action and the next turn.
    pub post_action_pause_ms: u64,

    /// Damage and heal floaters.
    pub floater_ms: u64,
    /// "MISS" floaters.
    pub miss_floater_ms: u64,
    /// Shake marker on the struck combatant.
    pub hit_shake_ms: u64,
    /// Enemy death fade and party downed marker.
    pub death_fade_ms: u64,

    /// How many stale tokens the scheduler skips before rebuilding the order.
    pub max_stale_skips: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            attack_base_hit: 0.65,
            attack_hit_per_bonus: 0.03,
            attack_hit_per_ac: 0.02,
            weapon_die: (1, 6),
            spell_roll: (4, 8),
            heal_roll: (6, 10),
            enemy_hit_chance: 0.65,
            run_chance: 0.55,
            default_monster_agility: (5, 12),
            stage_profile: StageProfile::FourStage,
            stages: StageDurations::default(),
            post_action_pause_ms: 180,
            floater_ms: 800,
            miss_floater_ms: 700,
            hit_shake_ms: 300,
            death_fade_ms: 600,
            max_stale_skips: 10,
        }
    }
}

impl BattleConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Use the given animation profile.
    #[must_use]
    pub fn with_stage_profile(mut self, profile: StageProfile) -> Self {
        self.stage_profile = profile;
        self
    }

    /// Override the stage durations.
    #[must_use]
    pub fn with_stages(mut self, stages: StageDurations) -> Self {
        self.stages = stages;
        self
    }

    /// Override the inter-action pause.
    #[must_use]
    pub fn with_post_action_pause(mut self, ms: u64) -> Self {
        self.post_action_pause_ms = ms;
        self
    }

    /// Override the run success probability.
    #[must_use]
    pub fn with_run_chance(mut self, chance: f64) -> Self {
        self.run_chance = chance;
        self
    }

    /// Override the enemy hit probability.
    #[must_use]
    pub fn with_enemy_hit_chance(mut self, chance: f64) -> Self {
        self.enemy_hit_chance = chance;
        self
    }

    /// Override the enemy death fade duration.
    #[must_use]
    pub fn with_death_fade(mut self, ms: u64) -> Self {
        self.death_fade_ms = ms;
        self
    }
}
