//! The turn-based battle engine.
//!
//! A battle is driven by two calls from outside: [`BattleController::tick`]
//! once per frame with the current monotonic time, and
//! [`BattleController::handle_input`] whenever the player presses a key.
//!
//! ## Flow
//!
//! 1. [`TurnScheduler`] picks the next combatant by effective agility.
//! 2. A party turn waits for menu and target choices; an enemy turn builds
//!    its attack immediately. Either way [`ActionResolver`] rolls every random
//!    outcome up front and returns an [`Action`].
//! 3. [`AnimationTimeline`] plays the action through its stages and hands it
//!    back exactly once on entering the Impact stage, where the resolver
//!    applies it to the roster and emits [`PresentationEvent`]s.
//! 4. After a short pause the controller checks for victory, defeat or
//!    flight, then moves on to the next token.
//!
//! ## Example
//!
//! ```
//! use dungeon_battle::battle::{BattleController, BattleResult};
//! use dungeon_battle::core::{BattleConfig, BattleRng, Millis};
//! use dungeon_battle::data::GameData;
//! use dungeon_battle::roster::{Attributes, Character, CharacterClass, Enemy, Party};
//!
//! let data = GameData::new();
//! let mut party = Party::new();
//! party.recruit(Character::new("Aric", CharacterClass::Fighter, Attributes::default()));
//!
//! let battle = BattleController::with_enemies(
//!     &data,
//!     &mut party,
//!     vec![Enemy::fixed("Goblin", 5, 8, 3)],
//!     BattleConfig::default(),
//!     BattleRng::new(7),
//!     Millis::ZERO,
//! );
//! assert_eq!(battle.result(), BattleResult::Ongoing);
//! ```

mod action;
mod controller;
mod encounter;
mod error;
mod events;
mod resolver;
mod rewards;
mod scheduler;
mod timeline;
mod view;

pub use action::{Action, ActionEffect, ActionKind, ActionSummary};
pub use controller::{BattleController, BattleInput, BattleResult, MenuOption, Phase, PhaseKind, TargetIntent};
pub use encounter::sample_encounter;
pub use error::{BattleError, ResolveError};
pub use events::{EventKind, EventQueue, FloaterColor, PresentationEvent};
pub use resolver::{attack_hit_chance, ActionResolver, ImpactOutcome};
pub use rewards::{roll_rewards, split_rewards, Rewards};
pub use scheduler::{TurnScheduler, TurnToken};
pub use timeline::{stage_plan, AnimationState, AnimationTimeline, Stage, TimelineBusy, TimelineStep};
pub use view::{AnimationView, BattleView, CombatantView};

use serde::{Deserialize, Serialize};

use crate::roster::Side;

/// A weak `(side, index)` reference to a combatant.
///
/// Party indices are roster indices; enemy indices index the battle's enemy
/// list. A reference never keeps its combatant alive and must be checked
/// against the current roster before use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantRef {
    pub side: Side,
    pub index: usize,
}

impl CombatantRef {
    /// Reference a party member by roster index.
    #[must_use]
    pub const fn party(index: usize) -> Self {
        Self { side: Side::Party, index }
    }

    /// Reference an enemy by battle index.
    #[must_use]
    pub const fn enemy(index: usize) -> Self {
        Self { side: Side::Enemy, index }
    }
}

impl std::fmt::Display for CombatantRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.side, self.index)
    }
}
