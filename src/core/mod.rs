//! Core engine types: RNG, timestamps, configuration, data errors.
//!
//! These are shared by every other module and know nothing about parties or
//! monsters.

pub mod clock;
pub mod config;
pub mod error;
pub mod rng;

pub use clock::{Millis, MonotonicClock};
pub use config::{BattleConfig, StageDurations, StageProfile};
pub use error::DataError;
pub use rng::{BattleRng, BattleRngState};
