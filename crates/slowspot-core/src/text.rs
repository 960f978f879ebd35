//! Display text lookup.
//!
//! The core never stores display strings. It asks a [`TextResolver`] for a
//! key and always supplies a literal fallback, so a missing or empty
//! translation degrades to English instead of failing.

use std::collections::HashMap;

/// Resolves translation keys to display strings.
pub trait TextResolver {
    /// Look up a key. `None` when the key is unknown.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Look up a key, falling back to `fallback` when it is missing or empty.
    fn text(&self, key: &str, fallback: &str) -> String {
        self.lookup(key)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl TextResolver for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolver with no entries; every lookup uses the caller's fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoText;

impl TextResolver for NoText {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Built-in English strings for the preparation flow.
#[derive(Debug, Clone)]
pub struct BuiltinText {
    entries: HashMap<&'static str, &'static str>,
}

const ENGLISH: &[(&str, &str)] = &[
    ("meditation.breatheIn", "Breathe in"),
    ("meditation.breatheOut", "Breathe out"),
    ("instructions.breathingPrep.hold", "Hold"),
    ("instructions.breathingPrep.breathe", "Breathe"),
    ("instructions.steps.overview", "Overview"),
    ("instructions.steps.setup", "Setup"),
    ("instructions.steps.breathing", "Breathing"),
    ("instructions.steps.intention", "Intention"),
    ("instructions.preparation.breathingExercise", "Quick Breathing Exercise"),
    ("instructions.preparation.startBreathing", "Start Breathing Prep"),
    ("instructions.preparation.skipStep", "Skip step"),
    ("instructions.preparation.skipAll", "Skip all"),
    ("instructions.preparation.finishEarly", "Finish Early"),
    ("instructions.skipModal.title", "Go to meditation"),
    (
        "instructions.skipModal.description",
        "You can skip the preparation and start meditation right away.",
    ),
    (
        "instructions.skipModal.dontShowAgain",
        "Don't show this introduction anymore",
    ),
    ("instructions.skipModal.startMeditation", "Begin"),
    ("instructions.timeOfDay.morning", "Good morning"),
    ("instructions.timeOfDay.afternoon", "Good afternoon"),
    ("instructions.timeOfDay.evening", "Good evening"),
    ("instructions.timeOfDay.night", "Good night"),
    (
        "instructions.timeOfDay.morningRecommendation",
        "Morning practice sets a calm tone for the day.",
    ),
    (
        "instructions.timeOfDay.afternoonRecommendation",
        "A short afternoon session helps you reset.",
    ),
    (
        "instructions.timeOfDay.eveningRecommendation",
        "Evening practice helps you unwind.",
    ),
    (
        "instructions.timeOfDay.nightRecommendation",
        "Keep it gentle before sleep.",
    ),
    ("common.cancel", "Cancel"),
];

impl BuiltinText {
    pub fn english() -> Self {
        Self {
            entries: ENGLISH.iter().copied().collect(),
        }
    }
}

impl Default for BuiltinText {
    fn default() -> Self {
        Self::english()
    }
}

impl TextResolver for BuiltinText {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|s| s.to_string())
    }
}
