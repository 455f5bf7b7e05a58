//! Animation timeline.
//!
//! One action at a time plays through a fixed sequence of stages. Each stage
//! lasts a fixed number of milliseconds of monotonic time; the timeline moves
//! at most one stage per `advance` call. Entering the Impact stage hands the
//! action back to the caller by value, which is the only point where its
//! effect can be applied. After the last stage a short pause runs before the
//! timeline reports that it is finished.
//!
//! ```text
//! submit ─▶ Windup ─▶ [PreImpact] ─▶ Impact ─▶ Recover ─▶ pause ─▶ Finished
//!                                     │
//!                                     └─ TimelineStep::Impact(action)
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{BattleConfig, Millis, StageProfile};

use super::action::{Action, ActionSummary};

/// Animation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Windup,
    PreImpact,
    Impact,
    Recover,
}

/// Refused submission: an action is already in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("an action is already in flight")]
pub struct TimelineBusy;

/// Progress of the in-flight action.
#[derive(Clone, Debug)]
pub struct AnimationState {
    action: Option<Action>,
    summary: ActionSummary,
    stages: SmallVec<[(Stage, u64); 4]>,
    stage_ix: usize,
    stage_started: Millis,
}

/// Stages and their durations for the configured profile, in play order.
#[must_use]
pub fn stage_plan(config: &BattleConfig) -> SmallVec<[(Stage, u64); 4]> {
    let s = &config.stages;
    match config.stage_profile {
        StageProfile::ThreeStage => smallvec::smallvec![
            (Stage::Windup, s.windup),
            (Stage::Impact, s.impact),
            (Stage::Recover, s.recover),
        ],
        StageProfile::FourStage => smallvec::smallvec![
            (Stage::Windup, s.windup),
            (Stage::PreImpact, s.pre_impact),
            (Stage::Impact, s.impact),
            (Stage::Recover, s.recover),
        ],
    }
}

impl AnimationState {
    fn new(action: Action, config: &BattleConfig, now: Millis) -> Self {
        let stages = stage_plan(config);
        Self {
            summary: action.summary(),
            action: Some(action),
            stages,
            stage_ix: 0,
            stage_started: now,
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stages[self.stage_ix].0
    }

    /// When the current stage began.
    #[must_use]
    pub fn stage_started(&self) -> Millis {
        self.stage_started
    }

    /// Fraction of the current stage elapsed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Millis) -> f32 {
        let duration = self.stages[self.stage_ix].1;
        if duration == 0 {
            return 1.0;
        }
        (now.since(self.stage_started) as f32 / duration as f32).min(1.0)
    }

    /// Who is acting on whom.
    #[must_use]
    pub fn summary(&self) -> ActionSummary {
        self.summary
    }

    /// Whether the effect has already been handed out.
    #[must_use]
    pub fn impact_applied(&self) -> bool {
        self.action.is_none()
    }
}

/// What one `advance` call did.
#[derive(Debug)]
pub enum TimelineStep {
    /// Nothing in flight.
    Idle,
    /// Still inside a stage or the pause.
    Running,
    /// Just entered Impact. Apply this action now; it will not come back.
    Impact(Action),
    /// Recover finished; the inter-action pause has begun.
    Recovered,
    /// The pause elapsed. The timeline is idle again.
    Finished,
}

#[derive(Clone, Debug, Default)]
enum TimelineState {
    #[default]
    Idle,
    Playing(AnimationState),
    Pausing { until: Millis },
}

/// Single-slot staged clock for actions.
#[derive(Clone, Debug, Default)]
pub struct AnimationTimeline {
    state: TimelineState,
}

impl AnimationTimeline {
    /// Create an idle timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing an action. Refused while another action or pause is running.
    pub fn submit(&mut self, action: Action, config: &BattleConfig, now: Millis) -> Result<(), TimelineBusy> {
        if !matches!(self.state, TimelineState::Idle) {
            return Err(TimelineBusy);
        }
        tracing::debug!(kind = ?action.kind(), actor = %action.actor, "action submitted");
        self.state = TimelineState::Playing(AnimationState::new(action, config, now));
        Ok(())
    }

    /// Move the clock forward to `now`.
    pub fn advance(&mut self, config: &BattleConfig, now: Millis) -> TimelineStep {
        match &mut self.state {
            TimelineState::Idle => TimelineStep::Idle,
            TimelineState::Pausing { until } => {
                if now >= *until {
                    self.state = TimelineState::Idle;
                    TimelineStep::Finished
                } else {
                    TimelineStep::Running
                }
            }
            TimelineState::Playing(anim) => {
                let (_, duration) = anim.stages[anim.stage_ix];
                if now.since(anim.stage_started) < duration {
                    return TimelineStep::Running;
                }
                if anim.stage_ix + 1 >= anim.stages.len() {
                    self.state = TimelineState::Pausing {
                        until: now + config.post_action_pause_ms,
                    };
                    return TimelineStep::Recovered;
                }
                anim.stage_ix += 1;
                anim.stage_started = now;
                tracing::trace!(stage = ?anim.stage(), "animation stage");
                if anim.stage() == Stage::Impact {
                    if let Some(action) = anim.action.take() {
                        return TimelineStep::Impact(action);
                    }
                }
                TimelineStep::Running
            }
        }
    }

    /// Drop whatever is playing. Used when the battle ends mid-action.
    pub fn clear(&mut self) {
        self.state = TimelineState::Idle;
    }

    /// Whether an action or its trailing pause occupies the timeline.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, TimelineState::Idle)
    }

    /// Whether the trailing pause is running.
    #[must_use]
    pub fn is_pausing(&self) -> bool {
        matches!(self.state, TimelineState::Pausing { .. })
    }

    /// The in-flight animation, if any.
    #[must_use]
    pub fn animation(&self) -> Option<&AnimationState> {
        match &self.state {
            TimelineState::Playing(anim) => Some(anim),
            _ => None,
        }
    }
}
