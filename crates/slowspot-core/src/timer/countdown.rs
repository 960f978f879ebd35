//! One-shot countdown for the breathing preparation step.
//!
//! Decrements once per second on the shared [`TimerQueue`]. When the
//! remaining time reaches zero the countdown completes and signals it exactly
//! once; the pending tick is released at that point, so nothing can fire
//! afterwards.

use serde::{Deserialize, Serialize};

use super::queue::{Timer, TimerId, TimerQueue};
use crate::events::Event;

/// Interval between countdown ticks.
pub const TICK_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug)]
pub struct CountdownTimer {
    total_secs: u32,
    remaining_secs: u32,
    state: CountdownState,
    pending: Option<Timer>,
}

impl CountdownTimer {
    pub fn new(total_secs: u32) -> Self {
        Self {
            total_secs,
            remaining_secs: total_secs,
            state: CountdownState::Idle,
            pending: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// Whether `id` is this countdown's pending tick.
    pub fn owns(&self, id: TimerId) -> bool {
        self.pending.as_ref().is_some_and(|t| t.id() == id)
    }

    /// Remaining time as `m:ss`.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, timers: &TimerQueue) -> Option<Event> {
        if self.state != CountdownState::Idle {
            return None;
        }
        self.state = CountdownState::Running;
        self.pending = Some(timers.schedule(TICK_INTERVAL_MS));
        Some(Event::CountdownStarted {
            total_secs: self.total_secs,
            at_ms: timers.now_ms(),
        })
    }

    /// Handle a fired timer. Ids that are not this countdown's tick are
    /// ignored.
    ///
    /// Returns the tick event, followed by `CountdownCompleted` on the tick
    /// that reaches zero.
    pub fn on_timer(&mut self, id: TimerId, timers: &TimerQueue) -> Vec<Event> {
        if self.state != CountdownState::Running || !self.owns(id) {
            return Vec::new();
        }
        self.pending = None;
        let at_ms = timers.now_ms();

        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.state = CountdownState::Completed;
            return vec![
                Event::CountdownTick {
                    remaining_secs: 0,
                    display: self.display(),
                    at_ms,
                },
                Event::CountdownCompleted { at_ms },
            ];
        }

        self.remaining_secs -= 1;
        self.pending = Some(timers.schedule(TICK_INTERVAL_MS));
        vec![Event::CountdownTick {
            remaining_secs: self.remaining_secs,
            display: self.display(),
            at_ms,
        }]
    }

    /// Stop without completing. Returns true if the countdown was running.
    pub fn cancel(&mut self) -> bool {
        self.pending = None;
        if self.state == CountdownState::Running {
            self.state = CountdownState::Cancelled;
            true
        } else {
            false
        }
    }
}

/// Format seconds as minutes and zero-padded seconds (90 -> `1:30`).
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
