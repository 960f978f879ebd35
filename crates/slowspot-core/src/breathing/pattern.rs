use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::TextResolver;

/// Scale the breathing circle grows toward while inhaling.
pub const EXPANDED_SCALE: f32 = 1.5;
/// Resting scale of the breathing circle.
pub const REST_SCALE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

impl BreathPhase {
    /// Scale this phase animates toward. Hold and rest keep the current scale.
    pub fn animation_target(self) -> Option<f32> {
        match self {
            BreathPhase::Inhale => Some(EXPANDED_SCALE),
            BreathPhase::Exhale => Some(REST_SCALE),
            BreathPhase::Hold | BreathPhase::Rest => None,
        }
    }

    /// Translation key for the on-screen cue. Rest shares the hold cue.
    pub fn label_key(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "meditation.breatheIn",
            BreathPhase::Exhale => "meditation.breatheOut",
            BreathPhase::Hold | BreathPhase::Rest => "instructions.breathingPrep.hold",
        }
    }

    pub fn label(self, text: &dyn TextResolver) -> String {
        let fallback = match self {
            BreathPhase::Inhale => "Breathe in",
            BreathPhase::Exhale => "Breathe out",
            BreathPhase::Hold | BreathPhase::Rest => "Hold",
        };
        text.text(self.label_key(), fallback)
    }
}

/// One timed phase of a breathing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSpec {
    pub phase: BreathPhase,
    pub duration_ms: u64,
}

const fn phase(phase: BreathPhase, duration_ms: u64) -> PhaseSpec {
    PhaseSpec { phase, duration_ms }
}

const BOX_PHASES: [PhaseSpec; 4] = [
    phase(BreathPhase::Inhale, 4_000),
    phase(BreathPhase::Hold, 4_000),
    phase(BreathPhase::Exhale, 4_000),
    phase(BreathPhase::Rest, 4_000),
];

const FOUR_SEVEN_EIGHT_PHASES: [PhaseSpec; 3] = [
    phase(BreathPhase::Inhale, 4_000),
    phase(BreathPhase::Hold, 7_000),
    phase(BreathPhase::Exhale, 8_000),
];

const EVEN_PHASES: [PhaseSpec; 2] = [
    phase(BreathPhase::Inhale, 4_000),
    phase(BreathPhase::Exhale, 4_000),
];

/// Built-in breathing patterns, selected by name.
///
/// Unknown names resolve to [`BreathingPatternKind::Equal`], including when
/// deserializing instruction data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BreathingPatternKind {
    Box,
    FourSevenEight,
    #[default]
    Equal,
    Calm,
}

impl BreathingPatternKind {
    pub const ALL: [BreathingPatternKind; 4] = [
        BreathingPatternKind::Box,
        BreathingPatternKind::FourSevenEight,
        BreathingPatternKind::Equal,
        BreathingPatternKind::Calm,
    ];

    pub fn from_name(name: &str) -> Self {
        match name {
            "box" => BreathingPatternKind::Box,
            "4-7-8" => BreathingPatternKind::FourSevenEight,
            "equal" => BreathingPatternKind::Equal,
            "calm" => BreathingPatternKind::Calm,
            other => {
                tracing::debug!(pattern = other, "unknown breathing pattern, using equal");
                BreathingPatternKind::Equal
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BreathingPatternKind::Box => "box",
            BreathingPatternKind::FourSevenEight => "4-7-8",
            BreathingPatternKind::Equal => "equal",
            BreathingPatternKind::Calm => "calm",
        }
    }

    pub fn phases(self) -> &'static [PhaseSpec] {
        match self {
            BreathingPatternKind::Box => &BOX_PHASES,
            BreathingPatternKind::FourSevenEight => &FOUR_SEVEN_EIGHT_PHASES,
            BreathingPatternKind::Equal | BreathingPatternKind::Calm => &EVEN_PHASES,
        }
    }

    /// Length of one full cycle in milliseconds.
    pub fn cycle_ms(self) -> u64 {
        self.phases().iter().map(|p| p.duration_ms).sum()
    }
}

impl fmt::Display for BreathingPatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BreathingPatternKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for BreathingPatternKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<BreathingPatternKind> for String {
    fn from(kind: BreathingPatternKind) -> Self {
        kind.name().to_string()
    }
}
