//! Built-in instruction records and lookup.

use super::{
    BreathingPrep, Instruction, PhysicalSetupStep, ReminderKind, SessionReminder, Technique,
    TimeOfDay,
};
use crate::breathing::BreathingPatternKind;

/// Instruction used when a lookup key is unknown.
pub const DEFAULT_INSTRUCTION_ID: &str = "level1_breath";

/// Supplies the instruction for a session.
///
/// Implementations never fail: unknown keys resolve to a default record.
pub trait InstructionProvider {
    fn instruction(&self, level: u8, technique: &str) -> Instruction;
}

#[derive(Debug, Clone)]
pub struct InstructionCatalog {
    entries: Vec<Instruction>,
}

impl InstructionCatalog {
    /// Catalog from arbitrary records. The default id must be present for
    /// fallback to work; otherwise the first record is used.
    pub fn new(entries: Vec<Instruction>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self { entries })
    }

    pub fn builtin() -> Self {
        Self {
            entries: builtin_instructions(),
        }
    }

    pub fn all(&self) -> &[Instruction] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Instruction> {
        self.entries.iter().find(|i| i.id == id)
    }

    pub fn default_instruction(&self) -> &Instruction {
        self.get(DEFAULT_INSTRUCTION_ID)
            .unwrap_or(&self.entries[0])
    }

    /// Lookup by `level{level}_{technique}`, falling back to the default.
    pub fn lookup(&self, level: u8, technique: &str) -> &Instruction {
        let key = format!("level{level}_{technique}");
        match self.get(&key) {
            Some(instruction) => instruction,
            None => {
                tracing::debug!(%key, "no instruction for key, using default");
                self.default_instruction()
            }
        }
    }
}

impl Default for InstructionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl InstructionProvider for InstructionCatalog {
    fn instruction(&self, level: u8, technique: &str) -> Instruction {
        self.lookup(level, technique).clone()
    }
}

fn step(order: u32, icon: &str, optional: bool) -> PhysicalSetupStep {
    PhysicalSetupStep {
        order,
        icon: icon.to_string(),
        optional,
    }
}

fn breathing(duration_secs: u32, pattern: BreathingPatternKind) -> Option<BreathingPrep> {
    Some(BreathingPrep {
        duration_secs,
        pattern,
    })
}

fn reminder(at_secs: u32, kind: ReminderKind) -> SessionReminder {
    SessionReminder { at_secs, kind }
}

fn builtin_instructions() -> Vec<Instruction> {
    use BreathingPatternKind as P;
    use ReminderKind as R;

    vec![
        Instruction {
            id: "level1_breath".into(),
            session_level: 1,
            technique: Technique::BreathAwareness,
            time_of_day: TimeOfDay::Any,
            physical_setup: vec![
                step(1, "🪑", false),
                step(2, "🧘", false),
                step(3, "🙏", true),
                step(4, "👀", true),
            ],
            breathing_prep: breathing(60, P::Equal),
            reminders: vec![reminder(120, R::Gentle), reminder(300, R::Encouragement)],
        },
        Instruction {
            id: "level1_body_scan".into(),
            session_level: 1,
            technique: Technique::BodyScan,
            time_of_day: TimeOfDay::Evening,
            physical_setup: vec![
                step(1, "🛏️", false),
                step(2, "🦶", false),
                step(3, "🌡️", true),
            ],
            breathing_prep: breathing(45, P::Calm),
            reminders: vec![reminder(180, R::Gentle)],
        },
        Instruction {
            id: "level2_breath_counting".into(),
            session_level: 2,
            technique: Technique::BreathAwareness,
            time_of_day: TimeOfDay::Morning,
            physical_setup: vec![step(1, "🧘", false), step(2, "⚓", false)],
            breathing_prep: breathing(90, P::Box),
            reminders: vec![reminder(150, R::Technique), reminder(420, R::Encouragement)],
        },
        Instruction {
            id: "level3_loving_kindness".into(),
            session_level: 3,
            technique: Technique::LovingKindness,
            time_of_day: TimeOfDay::Afternoon,
            physical_setup: vec![step(1, "❤️", false), step(2, "😊", true)],
            breathing_prep: breathing(60, P::Calm),
            reminders: vec![reminder(200, R::Encouragement), reminder(450, R::Gentle)],
        },
        Instruction {
            id: "level4_open_awareness".into(),
            session_level: 4,
            technique: Technique::OpenAwareness,
            time_of_day: TimeOfDay::Any,
            physical_setup: vec![step(1, "🌊", false), step(2, "👁️", true)],
            breathing_prep: breathing(120, P::FourSevenEight),
            reminders: vec![reminder(240, R::Technique), reminder(540, R::Gentle)],
        },
        Instruction {
            id: "level5_vipassana".into(),
            session_level: 5,
            technique: Technique::Vipassana,
            time_of_day: TimeOfDay::Morning,
            physical_setup: vec![step(1, "🪷", false), step(2, "⛰️", false)],
            breathing_prep: breathing(180, P::Equal),
            reminders: vec![
                reminder(300, R::Technique),
                reminder(600, R::Technique),
                reminder(900, R::Gentle),
            ],
        },
        Instruction {
            id: "zen_meditation".into(),
            session_level: 3,
            technique: Technique::Zen,
            time_of_day: TimeOfDay::Any,
            physical_setup: vec![
                step(1, "🧘‍♂️", false),
                step(2, "👁️", false),
                step(3, "🎯", false),
            ],
            breathing_prep: None,
            reminders: vec![reminder(360, R::Gentle), reminder(720, R::Technique)],
        },
    ]
}
