mod pattern;
mod scheduler;

pub use pattern::{
    BreathPhase, BreathingPatternKind, PhaseSpec, EXPANDED_SCALE, REST_SCALE,
};
pub use scheduler::{BreathingScheduler, RESET_TRANSITION_MS};
