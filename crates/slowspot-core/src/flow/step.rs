use serde::{Deserialize, Serialize};
use std::fmt;

/// The four stages of the preparation wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Overview,
    Setup,
    Breathing,
    Intention,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::Overview,
        StepKind::Setup,
        StepKind::Breathing,
        StepKind::Intention,
    ];

    pub fn index(self) -> usize {
        match self {
            StepKind::Overview => 0,
            StepKind::Setup => 1,
            StepKind::Breathing => 2,
            StepKind::Intention => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Overview => "overview",
            StepKind::Setup => "setup",
            StepKind::Breathing => "breathing",
            StepKind::Intention => "intention",
        }
    }

    pub fn title_key(self) -> String {
        format!("instructions.steps.{}", self.as_str())
    }

    pub fn is_terminal(self) -> bool {
        self == StepKind::Intention
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward edge of the step graph.
///
/// ```text
/// overview -> setup -> breathing -> intention
///                  \______________/  (no breathing prep)
/// ```
pub fn next_step(current: StepKind, has_breathing: bool) -> Option<StepKind> {
    match current {
        StepKind::Overview => Some(StepKind::Setup),
        StepKind::Setup if has_breathing => Some(StepKind::Breathing),
        StepKind::Setup => Some(StepKind::Intention),
        StepKind::Breathing => Some(StepKind::Intention),
        StepKind::Intention => None,
    }
}

/// One entry of the step progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step: StepKind,
    pub active: bool,
    pub complete: bool,
}

/// Progress markers for all four steps, by position relative to `current`.
///
/// The breathing dot is always shown, so skipping it still marks it
/// complete once the flow is past it.
pub fn progress(current: StepKind) -> [StepProgress; 4] {
    StepKind::ALL.map(|step| StepProgress {
        step,
        active: step == current,
        complete: step.index() < current.index(),
    })
}
