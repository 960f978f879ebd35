//! Cooperative timer queue.
//!
//! The queue is a millisecond clock plus an ordered set of pending deadlines.
//! It never spawns threads or sleeps: the owner advances the clock with
//! [`TimerQueue::pop_due`] and dispatches each fired [`TimerId`] itself.
//!
//! Timers are acquired as [`Timer`] guards. Dropping a guard removes its
//! deadline from the queue, so a timer can never fire after its owner is gone.
//!
//! ```ignore
//! let queue = TimerQueue::new();
//! let timer = queue.schedule(1_000);
//! assert_eq!(queue.pop_due(999), None);
//! assert_eq!(queue.pop_due(1_000), Some(timer.id()));
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

/// Identifier of a scheduled timer, unique within its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Default)]
struct QueueState {
    now_ms: u64,
    next_seq: u64,
    /// Ordered by `(deadline_ms, seq)`.
    pending: BTreeSet<(u64, u64)>,
}

/// Single-threaded timer queue. Clones share the same clock and pending set.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    state: Rc<RefCell<QueueState>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds since the queue was created.
    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.state.borrow().pending.first().map(|&(deadline, _)| deadline)
    }

    /// Schedule a timer `delay_ms` after the current clock value.
    pub fn schedule(&self, delay_ms: u64) -> Timer {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        let deadline_ms = state.now_ms.saturating_add(delay_ms);
        state.pending.insert((deadline_ms, seq));
        Timer {
            id: TimerId(seq),
            deadline_ms,
            queue: Rc::downgrade(&self.state),
        }
    }

    /// Fire the earliest timer due at or before `until_ms`.
    ///
    /// On a hit the clock moves to that timer's deadline. When nothing is due
    /// the clock moves to `until_ms` and `None` is returned. The clock never
    /// goes backwards.
    pub fn pop_due(&self, until_ms: u64) -> Option<TimerId> {
        let mut state = self.state.borrow_mut();
        match state.pending.first().copied() {
            Some((deadline_ms, seq)) if deadline_ms <= until_ms => {
                state.pending.remove(&(deadline_ms, seq));
                state.now_ms = state.now_ms.max(deadline_ms);
                Some(TimerId(seq))
            }
            _ => {
                state.now_ms = state.now_ms.max(until_ms);
                None
            }
        }
    }
}

/// Guard for a scheduled timer. Dropping it cancels the timer.
#[derive(Debug)]
#[must_use = "dropping a Timer cancels it"]
pub struct Timer {
    id: TimerId,
    deadline_ms: u64,
    queue: Weak<RefCell<QueueState>>,
}

impl Timer {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Whether the timer is still waiting in its queue.
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .map(|state| state.borrow().pending.contains(&(self.deadline_ms, self.id.0)))
            .unwrap_or(false)
    }

    /// Cancel explicitly. Same as dropping the guard.
    pub fn cancel(self) {}
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(state) = self.queue.upgrade() {
            state
                .borrow_mut()
                .pending
                .remove(&(self.deadline_ms, self.id.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let queue = TimerQueue::new();
        let late = queue.schedule(300);
        let early = queue.schedule(100);
        let middle = queue.schedule(200);

        assert_eq!(queue.pop_due(1_000), Some(early.id()));
        assert_eq!(queue.now_ms(), 100);
        assert_eq!(queue.pop_due(1_000), Some(middle.id()));
        assert_eq!(queue.pop_due(1_000), Some(late.id()));
        assert_eq!(queue.pop_due(1_000), None);
        assert_eq!(queue.now_ms(), 1_000);
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let queue = TimerQueue::new();
        let first = queue.schedule(500);
        let second = queue.schedule(500);
        assert_eq!(queue.pop_due(500), Some(first.id()));
        assert_eq!(queue.pop_due(500), Some(second.id()));
    }

    #[test]
    fn dropping_guard_cancels_timer() {
        let queue = TimerQueue::new();
        let timer = queue.schedule(100);
        assert!(timer.is_pending());
        assert_eq!(queue.pending_count(), 1);

        drop(timer);
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(queue.pop_due(1_000), None);
    }

    #[test]
    fn explicit_cancel_removes_timer() {
        let queue = TimerQueue::new();
        let keep = queue.schedule(100);
        queue.schedule(50).cancel();
        assert_eq!(queue.next_deadline_ms(), Some(100));
        assert_eq!(queue.pop_due(1_000), Some(keep.id()));
    }

    #[test]
    fn not_due_advances_clock_only() {
        let queue = TimerQueue::new();
        let timer = queue.schedule(1_000);
        assert_eq!(queue.pop_due(400), None);
        assert_eq!(queue.now_ms(), 400);
        assert!(timer.is_pending());

        // Relative scheduling starts from the advanced clock.
        let next = queue.schedule(100);
        assert_eq!(next.deadline_ms(), 500);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let queue = TimerQueue::new();
        queue.pop_due(700);
        queue.pop_due(200);
        assert_eq!(queue.now_ms(), 700);
    }

    #[test]
    fn fired_timer_is_no_longer_pending() {
        let queue = TimerQueue::new();
        let timer = queue.schedule(10);
        queue.pop_due(10);
        assert!(!timer.is_pending());
        // Dropping an already-fired guard is harmless.
        drop(timer);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn guard_outliving_queue_is_harmless() {
        let timer = {
            let queue = TimerQueue::new();
            queue.schedule(10)
        };
        assert!(!timer.is_pending());
    }
}
