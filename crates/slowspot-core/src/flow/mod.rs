mod breathing_step;
mod controller;
mod step;

pub use breathing_step::{BreathingStep, BreathingStepState, StopReason};
pub use controller::{BeginSession, FlowController, FlowSnapshot};
pub use step::{next_step, progress, StepKind, StepProgress};
