//! # dungeon-battle
//!
//! A deterministic, tick-driven turn-based battle engine for a party-based
//! dungeon crawler.
//!
//! ## Design Principles
//!
//! 1. **Roll Once**: Every random outcome is decided when an action is
//!    created. Applying it later never rolls again.
//!
//! 2. **Apply Once**: Hit points, mana and inventory change in exactly one
//!    place, when the animation timeline enters its Impact stage.
//!
//! 3. **Caller Owns Time**: The engine reads no clocks. Callers pass a
//!    monotonic [`Millis`] into every tick, which makes battles replayable
//!    from a seed and a list of inputs.
//!
//! ## Modules
//!
//! - `core`: RNG, timestamps, tuning constants, data errors
//! - `data`: Items, monster templates, class skills (`GameData`)
//! - `roster`: Party members, the party, spawned enemies
//! - `battle`: Turn order, action resolution, animation timeline,
//!   presentation events, the battle controller

pub mod battle;
pub mod core;
pub mod data;
pub mod roster;

// Re-export commonly used types
pub use crate::core::{BattleConfig, BattleRng, BattleRngState, DataError, Millis, MonotonicClock, StageProfile};

pub use crate::data::{EncounterTable, GameData, ItemDef, ItemKind, MonsterTemplate, SkillDef, SkillKind};

pub use crate::roster::{Attributes, Character, CharacterClass, Enemy, Party, Side};

pub use crate::battle::{
    Action, ActionResolver, BattleController, BattleError, BattleInput, BattleResult, BattleView, CombatantRef,
    EventQueue, MenuOption, Phase, PresentationEvent, ResolveError, TurnScheduler,
};
