//! Guided preparation flow controller.
//!
//! Owns the wizard state for one session: the live stage, the setup
//! checklist, the user's intention and the skip flags. It is a synchronous
//! state machine driven by the caller; timers only advance when the caller
//! invokes [`FlowController::advance_clock`].
//!
//! ## State Transitions
//!
//! ```text
//! Overview -> Setup -> (Breathing) -> Intention
//!    \__________\__________\______skip______/
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut flow = FlowController::new(instruction, store, |intention| begin(intention));
//! flow.advance();                      // overview -> setup
//! flow.toggle_checklist("1");
//! flow.advance();                      // setup -> breathing (if prep exists)
//! flow.start_breathing();
//! flow.advance_clock(now_ms);          // phases, ticks, auto-advance at zero
//! flow.complete("be present");
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::breathing_step::{BreathingStep, StopReason};
use super::step::{next_step, progress, StepKind, StepProgress};
use crate::checklist::{Checklist, ChecklistItem};
use crate::events::Event;
use crate::instructions::Instruction;
use crate::storage::PreferenceStore;
use crate::timer::TimerQueue;

/// Session-start callback. Receives the intention text.
pub type BeginSession = Box<dyn FnOnce(String)>;

/// The live step. Breathing carries its step instance so leaving the stage
/// drops the instance and its timers with it.
#[derive(Debug)]
enum Stage {
    Overview,
    Setup,
    Breathing(BreathingStep),
    Intention,
}

impl Stage {
    fn kind(&self) -> StepKind {
        match self {
            Stage::Overview => StepKind::Overview,
            Stage::Setup => StepKind::Setup,
            Stage::Breathing(_) => StepKind::Breathing,
            Stage::Intention => StepKind::Intention,
        }
    }
}

/// Pending "skip the preparation?" confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SkipPrompt {
    dont_ask_again: bool,
}

/// Serializable view of the flow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub session_id: Uuid,
    pub instruction_id: String,
    pub current_step: StepKind,
    pub checklist: Vec<ChecklistItem>,
    pub can_advance: bool,
    pub intention_text: String,
    pub always_skip: bool,
    pub skip_prompt_open: bool,
    pub breathing_completed: bool,
    /// Breathing countdown as `m:ss`, while in the breathing step.
    pub countdown: Option<String>,
    pub finished: bool,
    pub now_ms: u64,
}

pub struct FlowController<S: PreferenceStore> {
    session_id: Uuid,
    instruction: Instruction,
    stage: Stage,
    checklist: Checklist,
    intention_text: String,
    always_skip: bool,
    skip_prompt: Option<SkipPrompt>,
    breathing_completed: bool,
    finished: bool,
    store: S,
    on_begin: Option<BeginSession>,
    timers: TimerQueue,
}

impl<S: PreferenceStore> FlowController<S> {
    /// Start a flow for `instruction` on a fresh timer clock.
    pub fn new(instruction: Instruction, store: S, on_begin: impl FnOnce(String) + 'static) -> Self {
        Self::with_timers(instruction, store, on_begin, TimerQueue::new())
    }

    /// Start a flow on an existing timer clock.
    pub fn with_timers(
        instruction: Instruction,
        store: S,
        on_begin: impl FnOnce(String) + 'static,
        timers: TimerQueue,
    ) -> Self {
        let checklist = Checklist::from_setup(&instruction.physical_setup);
        let session_id = Uuid::new_v4();
        tracing::debug!(session = %session_id, instruction = %instruction.id, "preparation flow created");
        Self {
            session_id,
            instruction,
            stage: Stage::Overview,
            checklist,
            intention_text: String::new(),
            always_skip: false,
            skip_prompt: None,
            breathing_completed: false,
            finished: false,
            store,
            on_begin: Some(Box::new(on_begin)),
            timers,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    pub fn current_step(&self) -> StepKind {
        self.stage.kind()
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn intention_text(&self) -> &str {
        &self.intention_text
    }

    pub fn always_skip(&self) -> bool {
        self.always_skip
    }

    pub fn skip_prompt_open(&self) -> bool {
        self.skip_prompt.is_some()
    }

    pub fn dont_ask_again(&self) -> bool {
        self.skip_prompt.is_some_and(|p| p.dont_ask_again)
    }

    pub fn breathing_completed(&self) -> bool {
        self.breathing_completed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The active breathing step, if the flow is in it.
    pub fn breathing(&self) -> Option<&BreathingStep> {
        match &self.stage {
            Stage::Breathing(step) => Some(step),
            _ => None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline_ms()
    }

    /// Whether [`advance`](Self::advance) would move forward right now.
    pub fn can_advance(&self) -> bool {
        if self.finished {
            return false;
        }
        match self.stage.kind() {
            StepKind::Overview | StepKind::Breathing => true,
            StepKind::Setup => self.checklist.all_required_complete(),
            StepKind::Intention => false,
        }
    }

    pub fn progress(&self) -> [StepProgress; 4] {
        progress(self.stage.kind())
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            session_id: self.session_id,
            instruction_id: self.instruction.id.clone(),
            current_step: self.stage.kind(),
            checklist: self.checklist.items().to_vec(),
            can_advance: self.can_advance(),
            intention_text: self.intention_text.clone(),
            always_skip: self.always_skip,
            skip_prompt_open: self.skip_prompt.is_some(),
            breathing_completed: self.breathing_completed,
            countdown: self.breathing().map(|step| step.countdown().display()),
            finished: self.finished,
            now_ms: self.timers.now_ms(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Move to the next step. Refused (no events) when the setup checklist
    /// is incomplete or the flow is at its terminal step. Advancing out of
    /// breathing skips the rest of the exercise.
    pub fn advance(&mut self) -> Vec<Event> {
        let current = self.stage.kind();
        if !self.can_advance() {
            tracing::debug!(session = %self.session_id, step = %current, "advance refused");
            return Vec::new();
        }
        let Some(to) = next_step(current, self.instruction.has_breathing_prep()) else {
            return Vec::new();
        };

        let mut events = self.leave_breathing(StopReason::SkippedStep);
        events.extend(self.enter(to));
        events
    }

    pub fn toggle_checklist(&mut self, id: &str) -> Option<Event> {
        match self.checklist.toggle(id) {
            Some(completed) => Some(Event::ChecklistToggled {
                id: id.to_string(),
                completed,
                all_required_complete: self.checklist.all_required_complete(),
            }),
            None => {
                tracing::debug!(session = %self.session_id, id, "unknown checklist item");
                None
            }
        }
    }

    pub fn set_intention(&mut self, text: impl Into<String>) {
        self.intention_text = text.into();
    }

    pub fn start_breathing(&mut self) -> Vec<Event> {
        match &mut self.stage {
            Stage::Breathing(step) => step.start(),
            _ => Vec::new(),
        }
    }

    /// End a running breathing exercise now. Counts as completed.
    pub fn finish_breathing_early(&mut self) -> Vec<Event> {
        let running = self
            .breathing()
            .is_some_and(|step| step.countdown().is_running());
        if !running {
            return Vec::new();
        }
        let mut events = self.leave_breathing(StopReason::FinishedEarly);
        self.breathing_completed = true;
        events.extend(self.enter(StepKind::Intention));
        events
    }

    /// Skip only the breathing step.
    pub fn skip_breathing_step(&mut self) -> Vec<Event> {
        if self.stage.kind() != StepKind::Breathing {
            return Vec::new();
        }
        self.advance()
    }

    /// Open the skip confirmation. Not available once at the intention step.
    pub fn request_skip(&mut self) -> Option<Event> {
        let from = self.stage.kind();
        if self.finished || from.is_terminal() {
            return None;
        }
        self.skip_prompt = Some(SkipPrompt::default());
        Some(Event::SkipPromptOpened { from })
    }

    /// Flip "don't ask again" on the open prompt. Returns the new value.
    pub fn toggle_dont_ask_again(&mut self) -> Option<bool> {
        let prompt = self.skip_prompt.as_mut()?;
        prompt.dont_ask_again = !prompt.dont_ask_again;
        Some(prompt.dont_ask_again)
    }

    pub fn cancel_skip(&mut self) -> Option<Event> {
        self.skip_prompt.take().map(|_| Event::SkipPromptCancelled)
    }

    pub fn confirm_skip(&mut self) -> Vec<Event> {
        match self.skip_prompt.take() {
            Some(prompt) => self.skip_to_intention(prompt.dont_ask_again),
            None => Vec::new(),
        }
    }

    /// Jump straight to the intention step, keeping checklist and intention
    /// text. With `dont_ask_again`, the skip preference is written first.
    pub fn skip_to_intention(&mut self, dont_ask_again: bool) -> Vec<Event> {
        let from = self.stage.kind();
        self.skip_prompt = None;
        if self.finished || from.is_terminal() {
            return Vec::new();
        }

        let mut events = Vec::new();
        if dont_ask_again {
            events.push(self.persist_skip_preference());
        }
        events.extend(self.leave_breathing(StopReason::SkippedAll));
        events.push(Event::SkippedToIntention {
            from,
            at_ms: self.timers.now_ms(),
        });
        events.extend(self.enter(StepKind::Intention));
        events
    }

    pub fn toggle_always_skip(&mut self) -> Event {
        self.always_skip = !self.always_skip;
        Event::AlwaysSkipToggled {
            enabled: self.always_skip,
        }
    }

    /// Finish the flow and begin the session. Only from the intention step,
    /// and only once. The callback receives `intention` unchanged.
    pub fn complete(&mut self, intention: &str) -> Vec<Event> {
        if self.finished || self.stage.kind() != StepKind::Intention {
            tracing::debug!(session = %self.session_id, "complete refused");
            return Vec::new();
        }
        self.finished = true;

        let mut events = Vec::new();
        if self.always_skip {
            events.push(self.persist_skip_preference());
        }
        if let Some(begin) = self.on_begin.take() {
            begin(intention.to_string());
        }
        tracing::info!(session = %self.session_id, instruction = %self.instruction.id, "session begun");
        events.push(Event::SessionBegun {
            intention: intention.to_string(),
            at_ms: self.timers.now_ms(),
        });
        events
    }

    /// Advance the timer clock to `until_ms`, dispatching every timer due on
    /// the way. Countdown completion moves the flow to the intention step.
    pub fn advance_clock(&mut self, until_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(id) = self.timers.pop_due(until_ms) {
            let completed = match &mut self.stage {
                Stage::Breathing(step) => {
                    events.extend(step.on_timer(id));
                    step.stop_reason() == Some(StopReason::Completed)
                }
                _ => false,
            };
            if completed {
                self.breathing_completed = true;
                events.extend(self.enter(StepKind::Intention));
            }
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn leave_breathing(&mut self, reason: StopReason) -> Vec<Event> {
        match &mut self.stage {
            Stage::Breathing(step) => step.finish(reason),
            _ => Vec::new(),
        }
    }

    fn enter(&mut self, to: StepKind) -> Vec<Event> {
        let from = self.stage.kind();
        self.stage = match to {
            StepKind::Overview => Stage::Overview,
            StepKind::Setup => Stage::Setup,
            StepKind::Breathing => match self.instruction.breathing_prep {
                Some(prep) => Stage::Breathing(BreathingStep::new(prep, self.timers.clone())),
                None => Stage::Intention,
            },
            StepKind::Intention => Stage::Intention,
        };
        let to = self.stage.kind();
        tracing::info!(session = %self.session_id, %from, %to, "preparation step changed");
        vec![Event::StepChanged {
            from,
            to,
            at_ms: self.timers.now_ms(),
        }]
    }

    fn persist_skip_preference(&self) -> Event {
        match self.store.set_skip_pre_session_instructions(true) {
            Ok(()) => Event::PreferencePersisted {
                skip_instructions: true,
            },
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "failed to persist skip preference");
                Event::PreferencePersistFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}

impl<S: PreferenceStore> std::fmt::Debug for FlowController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowController")
            .field("session_id", &self.session_id)
            .field("instruction", &self.instruction.id)
            .field("stage", &self.stage)
            .field("checklist", &self.checklist)
            .field("always_skip", &self.always_skip)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::InstructionCatalog;
    use crate::storage::MemoryPreferenceStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<String>>>;

    fn flow(id: &str) -> (FlowController<MemoryPreferenceStore>, Calls) {
        let calls: Calls = Rc::default();
        let sink = Rc::clone(&calls);
        let instruction = InstructionCatalog::builtin().get(id).unwrap().clone();
        let controller = FlowController::new(instruction, MemoryPreferenceStore::new(), move |text| {
            sink.borrow_mut().push(text)
        });
        (controller, calls)
    }

    fn complete_setup(flow: &mut FlowController<MemoryPreferenceStore>) {
        let required: Vec<String> = flow
            .checklist()
            .items()
            .iter()
            .filter(|i| i.required)
            .map(|i| i.id.clone())
            .collect();
        for id in required {
            flow.toggle_checklist(&id);
        }
    }

    #[test]
    fn starts_at_overview() {
        let (flow, _) = flow("level1_breath");
        assert_eq!(flow.current_step(), StepKind::Overview);
        assert!(flow.can_advance());
        assert_eq!(flow.checklist().len(), 4);
    }

    #[test]
    fn setup_gate_refuses_until_required_items_done() {
        let (mut flow, _) = flow("level1_breath");
        flow.advance();
        assert_eq!(flow.current_step(), StepKind::Setup);

        assert!(!flow.can_advance());
        assert!(flow.advance().is_empty());
        assert_eq!(flow.current_step(), StepKind::Setup);

        flow.toggle_checklist("1");
        assert!(flow.advance().is_empty());
        match flow.toggle_checklist("2") {
            Some(Event::ChecklistToggled { all_required_complete, .. }) => {
                assert!(all_required_complete)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(flow.can_advance());
        flow.advance();
        assert_eq!(flow.current_step(), StepKind::Breathing);
    }

    #[test]
    fn no_breathing_prep_goes_straight_to_intention() {
        let (mut flow, _) = flow("zen_meditation");
        flow.advance();
        complete_setup(&mut flow);
        let events = flow.advance();
        assert_eq!(flow.current_step(), StepKind::Intention);
        assert!(matches!(
            events.as_slice(),
            [Event::StepChanged { from: StepKind::Setup, to: StepKind::Intention, .. }]
        ));
    }

    #[test]
    fn countdown_completion_auto_advances() {
        let (mut flow, _) = flow("level1_body_scan");
        flow.advance();
        complete_setup(&mut flow);
        flow.advance();
        flow.start_breathing();
        assert_eq!(flow.snapshot().countdown.as_deref(), Some("0:45"));

        flow.advance_clock(44_999);
        assert_eq!(flow.current_step(), StepKind::Breathing);
        let events = flow.advance_clock(45_000);
        assert_eq!(flow.current_step(), StepKind::Intention);
        assert!(flow.breathing_completed());
        assert!(events.iter().any(|e| matches!(e, Event::CountdownCompleted { .. })));
        assert_eq!(flow.timers().pending_count(), 0);
    }

    #[test]
    fn finish_early_requires_running_exercise() {
        let (mut flow, _) = flow("level1_breath");
        flow.advance();
        complete_setup(&mut flow);
        flow.advance();
        assert!(flow.finish_breathing_early().is_empty());

        flow.start_breathing();
        flow.advance_clock(10_000);
        flow.finish_breathing_early();
        assert_eq!(flow.current_step(), StepKind::Intention);
        assert!(flow.breathing_completed());
        assert_eq!(flow.timers().pending_count(), 0);
    }

    #[test]
    fn skip_step_does_not_mark_breathing_completed() {
        let (mut flow, _) = flow("level1_breath");
        flow.advance();
        complete_setup(&mut flow);
        flow.advance();
        flow.start_breathing();
        let events = flow.skip_breathing_step();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::BreathingStopped { reason: StopReason::SkippedStep, .. }
        )));
        assert_eq!(flow.current_step(), StepKind::Intention);
        assert!(!flow.breathing_completed());
        assert_eq!(flow.timers().pending_count(), 0);
    }

    #[test]
    fn skip_prompt_cancel_clears_dont_ask_again() {
        let (mut flow, _) = flow("level1_breath");
        assert!(flow.request_skip().is_some());
        assert_eq!(flow.toggle_dont_ask_again(), Some(true));
        assert_eq!(flow.cancel_skip(), Some(Event::SkipPromptCancelled));
        assert!(!flow.dont_ask_again());
        assert_eq!(flow.toggle_dont_ask_again(), None);

        flow.request_skip();
        flow.confirm_skip();
        assert_eq!(flow.current_step(), StepKind::Intention);
        assert_eq!(flow.store().writes(), 0);
    }

    #[test]
    fn confirm_with_dont_ask_again_persists_before_transition() {
        let (mut flow, _) = flow("level1_breath");
        flow.advance();
        flow.request_skip();
        flow.toggle_dont_ask_again();
        let events = flow.confirm_skip();

        assert!(matches!(
            events.first(),
            Some(Event::PreferencePersisted { skip_instructions: true })
        ));
        assert!(flow.store().preferences().skip_instructions);
        assert_eq!(flow.current_step(), StepKind::Intention);
        assert!(!flow.skip_prompt_open());
    }

    #[test]
    fn skip_prompt_unavailable_at_intention() {
        let (mut flow, _) = flow("level1_breath");
        flow.skip_to_intention(false);
        assert!(flow.request_skip().is_none());
        assert!(flow.skip_to_intention(false).is_empty());
    }

    #[test]
    fn complete_only_from_intention_and_only_once() {
        let (mut flow, calls) = flow("level1_breath");
        assert!(flow.complete("early").is_empty());
        assert!(calls.borrow().is_empty());

        flow.skip_to_intention(false);
        flow.complete("");
        flow.complete("again");
        assert_eq!(*calls.borrow(), vec![String::new()]);
        assert!(flow.is_finished());
        assert!(!flow.can_advance());
    }

    #[test]
    fn always_skip_persists_on_completion() {
        let (mut flow, calls) = flow("level1_breath");
        flow.skip_to_intention(false);
        assert_eq!(flow.toggle_always_skip(), Event::AlwaysSkipToggled { enabled: true });
        let events = flow.complete("breathe");
        assert!(matches!(events[0], Event::PreferencePersisted { .. }));
        assert!(flow.store().preferences().skip_instructions);
        assert_eq!(*calls.borrow(), vec!["breathe".to_string()]);
    }

    #[test]
    fn persistence_failure_does_not_block_completion() {
        let calls: Calls = Rc::default();
        let sink = Rc::clone(&calls);
        let instruction = InstructionCatalog::builtin().default_instruction().clone();
        let mut flow = FlowController::new(
            instruction,
            MemoryPreferenceStore::failing("read-only storage"),
            move |text| sink.borrow_mut().push(text),
        );
        flow.skip_to_intention(true);
        assert_eq!(flow.current_step(), StepKind::Intention);

        flow.toggle_always_skip();
        let events = flow.complete("focus");
        assert!(matches!(
            &events[0],
            Event::PreferencePersistFailed { message } if message == "read-only storage"
        ));
        assert_eq!(*calls.borrow(), vec!["focus".to_string()]);
        assert_eq!(flow.store().writes(), 2);
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut flow, _) = flow("level3_loving_kindness");
        flow.set_intention("kindness");
        flow.advance();
        let snap = flow.snapshot();
        assert_eq!(snap.instruction_id, "level3_loving_kindness");
        assert_eq!(snap.current_step, StepKind::Setup);
        assert_eq!(snap.intention_text, "kindness");
        assert!(!snap.can_advance);
        assert_eq!(snap.countdown, None);
        assert_eq!(snap.session_id, flow.session_id());
    }

    #[test]
    fn dropping_controller_mid_breathing_cancels_timers() {
        let (mut flow, _) = flow("level1_breath");
        let timers = flow.timers().clone();
        flow.advance();
        complete_setup(&mut flow);
        flow.advance();
        flow.start_breathing();
        assert_eq!(timers.pending_count(), 2);
        drop(flow);
        assert_eq!(timers.pending_count(), 0);
    }
}
