//! Pre-session instruction records.
//!
//! An [`Instruction`] is immutable structural data for one technique's
//! preparation: physical setup steps, an optional breathing exercise and
//! reminders for the main session. All display text is referenced by
//! translation key and resolved by the caller.

mod catalog;
mod time_of_day;

pub use catalog::{InstructionCatalog, InstructionProvider, DEFAULT_INSTRUCTION_ID};
pub use time_of_day::TimeOfDay;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::breathing::BreathingPatternKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    BreathAwareness,
    BodyScan,
    LovingKindness,
    OpenAwareness,
    Visualization,
    Mantra,
    Walking,
    Zen,
    Vipassana,
}

impl Technique {
    pub fn as_str(self) -> &'static str {
        match self {
            Technique::BreathAwareness => "breath_awareness",
            Technique::BodyScan => "body_scan",
            Technique::LovingKindness => "loving_kindness",
            Technique::OpenAwareness => "open_awareness",
            Technique::Visualization => "visualization",
            Technique::Mantra => "mantra",
            Technique::Walking => "walking",
            Technique::Zen => "zen",
            Technique::Vipassana => "vipassana",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical preparation step. `order` doubles as its checklist id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalSetupStep {
    pub order: u32,
    pub icon: String,
    #[serde(default)]
    pub optional: bool,
}

/// Optional breathing mini-exercise before the main session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingPrep {
    pub duration_secs: u32,
    pub pattern: BreathingPatternKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Gentle,
    Encouragement,
    Technique,
}

/// Reminder shown during the main session, `at_secs` after it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReminder {
    pub at_secs: u32,
    pub kind: ReminderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: String,
    /// 1 (beginner) to 5.
    pub session_level: u8,
    pub technique: Technique,
    pub time_of_day: TimeOfDay,
    pub physical_setup: Vec<PhysicalSetupStep>,
    #[serde(default)]
    pub breathing_prep: Option<BreathingPrep>,
    #[serde(default)]
    pub reminders: Vec<SessionReminder>,
}

impl Instruction {
    pub fn has_breathing_prep(&self) -> bool {
        self.breathing_prep.is_some()
    }

    pub fn title_key(&self) -> String {
        format!("instructions.{}.title", self.id)
    }

    pub fn subtitle_key(&self) -> String {
        format!("instructions.{}.subtitle", self.id)
    }

    pub fn setup_title_key(&self, order: u32) -> String {
        format!("instructions.{}.setup.{order}.title", self.id)
    }

    pub fn setup_description_key(&self, order: u32) -> String {
        format!("instructions.{}.setup.{order}.description", self.id)
    }

    pub fn breathing_instruction_key(&self) -> String {
        format!("instructions.{}.breathingPrep.instruction", self.id)
    }

    /// Reminders due within the first `elapsed_secs` of the session.
    pub fn reminders_due(&self, elapsed_secs: u32) -> impl Iterator<Item = &SessionReminder> {
        self.reminders.iter().filter(move |r| r.at_secs <= elapsed_secs)
    }
}
