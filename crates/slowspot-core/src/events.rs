use serde::{Deserialize, Serialize};

use crate::breathing::{BreathPhase, BreathingPatternKind};
use crate::flow::{StepKind, StopReason};

/// Every state change in the preparation flow produces an Event.
/// Operations return the events they caused; front ends render from them.
///
/// `at_ms` is the flow's timer clock, not wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StepChanged {
        from: StepKind,
        to: StepKind,
        at_ms: u64,
    },
    ChecklistToggled {
        id: String,
        completed: bool,
        all_required_complete: bool,
    },
    SkipPromptOpened {
        from: StepKind,
    },
    SkipPromptCancelled,
    AlwaysSkipToggled {
        enabled: bool,
    },
    BreathingStarted {
        pattern: BreathingPatternKind,
        duration_secs: u32,
        at_ms: u64,
    },
    PhaseChanged {
        phase: BreathPhase,
        phase_index: usize,
        duration_ms: u64,
        /// Completed full cycles before this phase.
        cycle: u32,
        /// Scale to animate toward; `None` holds the current scale.
        animate_to: Option<f32>,
        at_ms: u64,
    },
    /// Breathing visual eases back to rest after stopping.
    AnimationReset {
        scale: f32,
        transition_ms: u64,
        at_ms: u64,
    },
    CountdownStarted {
        total_secs: u32,
        at_ms: u64,
    },
    CountdownTick {
        remaining_secs: u32,
        /// `m:ss`
        display: String,
        at_ms: u64,
    },
    CountdownCompleted {
        at_ms: u64,
    },
    BreathingStopped {
        reason: StopReason,
        at_ms: u64,
    },
    SkippedToIntention {
        from: StepKind,
        at_ms: u64,
    },
    PreferencePersisted {
        skip_instructions: bool,
    },
    PreferencePersistFailed {
        message: String,
    },
    SessionBegun {
        intention: String,
        at_ms: u64,
    },
}
