//! # SlowSpot Core Library
//!
//! Core logic for SlowSpot's guided pre-session preparation: the wizard that
//! walks a meditator through an overview, a physical-setup checklist, an
//! optional paced breathing exercise and an intention prompt before the
//! session itself begins. The CLI binary is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Flow**: A synchronous state machine over the four preparation steps,
//!   with skip handling and a session-start callback
//! - **Timers**: A virtual-clock timer queue; callers advance it explicitly
//!   and cancellation is tied to dropping the timer guard
//! - **Breathing**: Named breathing patterns and the phase scheduler that
//!   cycles through them
//! - **Storage**: TOML-based user preferences
//!
//! ## Key Components
//!
//! - [`FlowController`]: Preparation flow state machine
//! - [`TimerQueue`]: Single-threaded cancellable timers
//! - [`BreathingScheduler`]: Breathing phase sequencer
//! - [`InstructionCatalog`]: Built-in instruction records and lookup
//! - [`PreferenceStore`]: Persistence seam for the skip preference

pub mod breathing;
pub mod checklist;
pub mod error;
pub mod events;
pub mod flow;
pub mod instructions;
pub mod storage;
pub mod text;
pub mod timer;

pub use breathing::{BreathPhase, BreathingPatternKind, BreathingScheduler};
pub use checklist::{Checklist, ChecklistItem};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use flow::{FlowController, FlowSnapshot, StepKind, StopReason};
pub use instructions::{Instruction, InstructionCatalog, InstructionProvider, TimeOfDay};
pub use storage::{MemoryPreferenceStore, PreferenceStore, Preferences, TomlPreferenceStore};
pub use text::{BuiltinText, TextResolver};
pub use timer::{CountdownTimer, TimerQueue};
