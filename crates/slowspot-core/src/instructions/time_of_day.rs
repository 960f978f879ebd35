use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

/// Preferred practice time of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Any,
}

impl TimeOfDay {
    /// Greeting key for a local hour (0-23).
    pub fn greeting_key(hour: u32) -> &'static str {
        match hour {
            0..=11 => "instructions.timeOfDay.morning",
            12..=16 => "instructions.timeOfDay.afternoon",
            17..=21 => "instructions.timeOfDay.evening",
            _ => "instructions.timeOfDay.night",
        }
    }

    /// Practice recommendation key for a local hour (0-23).
    ///
    /// Unlike the greeting, early hours before 5 count as night.
    pub fn recommendation_key(hour: u32) -> &'static str {
        match hour {
            5..=11 => "instructions.timeOfDay.morningRecommendation",
            12..=16 => "instructions.timeOfDay.afternoonRecommendation",
            17..=21 => "instructions.timeOfDay.eveningRecommendation",
            _ => "instructions.timeOfDay.nightRecommendation",
        }
    }

    /// Hour of the local wall clock, for the two key lookups above.
    pub fn local_hour() -> u32 {
        Local::now().hour()
    }

    /// Whether an instruction tagged with `self` suits the given hour.
    pub fn suits_hour(self, hour: u32) -> bool {
        match self {
            TimeOfDay::Any => true,
            TimeOfDay::Morning => (5..12).contains(&hour),
            TimeOfDay::Afternoon => (12..17).contains(&hour),
            TimeOfDay::Evening => (17..22).contains(&hour),
        }
    }
}
