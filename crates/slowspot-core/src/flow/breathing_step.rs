//! The breathing preparation step.
//!
//! A `BreathingStep` exclusively owns one [`BreathingScheduler`] and one
//! [`CountdownTimer`]. Both hold their pending timers as guards, so every
//! way out of the step releases them: [`BreathingStep::finish`] for the
//! explicit exits, and plain drop when the controller replaces the stage.

use serde::{Deserialize, Serialize};

use crate::breathing::BreathingScheduler;
use crate::events::Event;
use crate::instructions::BreathingPrep;
use crate::timer::{CountdownState, CountdownTimer, TimerId, TimerQueue};

/// Why the breathing step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Countdown reached zero.
    Completed,
    FinishedEarly,
    /// Skipped only this step.
    SkippedStep,
    /// Skipped the whole preparation.
    SkippedAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingStepState {
    Ready,
    Running,
    Finished,
}

#[derive(Debug)]
pub struct BreathingStep {
    prep: BreathingPrep,
    timers: TimerQueue,
    scheduler: BreathingScheduler,
    countdown: CountdownTimer,
    state: BreathingStepState,
    stop_reason: Option<StopReason>,
}

impl BreathingStep {
    pub fn new(prep: BreathingPrep, timers: TimerQueue) -> Self {
        Self {
            prep,
            timers,
            scheduler: BreathingScheduler::new(prep.pattern),
            countdown: CountdownTimer::new(prep.duration_secs),
            state: BreathingStepState::Ready,
            stop_reason: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn prep(&self) -> BreathingPrep {
        self.prep
    }

    pub fn state(&self) -> BreathingStepState {
        self.state
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn scheduler(&self) -> &BreathingScheduler {
        &self.scheduler
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    /// Whether `id` belongs to this step's scheduler or countdown.
    pub fn owns(&self, id: TimerId) -> bool {
        self.scheduler.owns(id) || self.countdown.owns(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        if self.state != BreathingStepState::Ready {
            return Vec::new();
        }
        self.state = BreathingStepState::Running;

        let mut events = vec![Event::BreathingStarted {
            pattern: self.prep.pattern,
            duration_secs: self.prep.duration_secs,
            at_ms: self.timers.now_ms(),
        }];
        events.extend(self.countdown.start(&self.timers));
        events.extend(self.scheduler.start(&self.timers));
        events
    }

    /// Dispatch a fired timer. When the countdown reaches zero the step
    /// finishes with [`StopReason::Completed`] in the same call.
    pub fn on_timer(&mut self, id: TimerId) -> Vec<Event> {
        if self.state != BreathingStepState::Running {
            return Vec::new();
        }

        if self.countdown.owns(id) {
            let mut events = self.countdown.on_timer(id, &self.timers);
            if self.countdown.state() == CountdownState::Completed {
                events.extend(self.finish(StopReason::Completed));
            }
            return events;
        }

        self.scheduler
            .on_timer(id, &self.timers)
            .into_iter()
            .collect()
    }

    /// End the step, cancelling both timers. Idempotent.
    pub fn finish(&mut self, reason: StopReason) -> Vec<Event> {
        if self.state == BreathingStepState::Finished {
            return Vec::new();
        }
        self.state = BreathingStepState::Finished;
        self.stop_reason = Some(reason);

        let at_ms = self.timers.now_ms();
        self.countdown.cancel();
        let mut events: Vec<Event> = self.scheduler.stop(at_ms).into_iter().collect();
        events.push(Event::BreathingStopped { reason, at_ms });
        events
    }
}
