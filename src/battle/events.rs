//! Presentation events: floaters and death fades.
//!
//! These records exist for the renderer only. Game state never depends on
//! them, with one exception: victory is held back while an enemy death fade
//! is still playing.

use serde::{Deserialize, Serialize};

use crate::core::{BattleConfig, Millis};

use super::CombatantRef;

/// What the renderer should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Damage number.
    Damage(i32),
    /// "MISS" callout.
    Miss,
    /// Heal number.
    Heal(i32),
    /// Brief shake on the struck combatant.
    HitShake,
    /// Enemy fading out after death.
    DeathFade,
    /// Party member collapsing.
    Downed,
}

/// Floater tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloaterColor {
    White,
    Yellow,
    Red,
}

/// One transient presentation record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationEvent {
    pub target: CombatantRef,
    pub kind: EventKind,
    pub color: FloaterColor,
    pub started: Millis,
    pub duration_ms: u64,
}

impl PresentationEvent {
    /// Floater text, if this event shows any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self.kind {
            EventKind::Damage(n) | EventKind::Heal(n) => Some(n.to_string()),
            EventKind::Miss => Some("MISS".to_string()),
            EventKind::HitShake | EventKind::DeathFade | EventKind::Downed => None,
        }
    }

    /// Milliseconds left before the event expires.
    #[must_use]
    pub fn remaining(&self, now: Millis) -> u64 {
        self.duration_ms.saturating_sub(now.since(self.started))
    }

    /// Expired once its age reaches its duration.
    #[must_use]
    pub fn is_expired(&self, now: Millis) -> bool {
        self.remaining(now) == 0
    }

    /// Fraction of the duration elapsed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Millis) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (now.since(self.started) as f32 / self.duration_ms as f32).min(1.0)
    }
}

/// Live presentation events.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<PresentationEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event.
    pub fn push(&mut self, target: CombatantRef, kind: EventKind, color: FloaterColor, now: Millis, duration_ms: u64) {
        self.events.push(PresentationEvent {
            target,
            kind,
            color,
            started: now,
            duration_ms,
        });
    }

    /// Damage number plus a shake on the target.
    pub fn damage(&mut self, target: CombatantRef, amount: i32, now: Millis, config: &BattleConfig) {
        self.push(target, EventKind::Damage(amount), FloaterColor::White, now, config.floater_ms);
        self.push(target, EventKind::HitShake, FloaterColor::Red, now, config.hit_shake_ms);
    }

    /// "MISS" over the intended target.
    pub fn miss(&mut self, target: CombatantRef, now: Millis, config: &BattleConfig) {
        self.push(target, EventKind::Miss, FloaterColor::White, now, config.miss_floater_ms);
    }

    /// Heal number.
    pub fn heal(&mut self, target: CombatantRef, amount: i32, now: Millis, config: &BattleConfig) {
        self.push(target, EventKind::Heal(amount), FloaterColor::Yellow, now, config.floater_ms);
    }

    /// Death fade for an enemy, downed marker for a party member.
    pub fn death(&mut self, target: CombatantRef, now: Millis, config: &BattleConfig) {
        let kind = match target.side {
            crate::roster::Side::Enemy => EventKind::DeathFade,
            crate::roster::Side::Party => EventKind::Downed,
        };
        self.push(target, kind, FloaterColor::White, now, config.death_fade_ms);
    }

    /// Drop expired events.
    pub fn prune(&mut self, now: Millis) {
        self.events.retain(|e| !e.is_expired(now));
    }

    /// Whether any enemy death fade still has time left.
    #[must_use]
    pub fn death_fade_active(&self, now: Millis) -> bool {
        self.events
            .iter()
            .any(|e| e.kind == EventKind::DeathFade && e.remaining(now) > 0)
    }

    /// All events, including any that expired since the last prune.
    #[must_use]
    pub fn events(&self) -> &[PresentationEvent] {
        &self.events
    }

    /// Events still live at `now`.
    pub fn live(&self, now: Millis) -> impl Iterator<Item = &PresentationEvent> + '_ {
        self.events.iter().filter(move |e| !e.is_expired(now))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
