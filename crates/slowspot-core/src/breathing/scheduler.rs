//! Cyclic breathing phase sequencer.
//!
//! Emits one `PhaseChanged` event per phase and schedules the next phase on
//! the shared [`TimerQueue`] after the current phase's duration. The cycle
//! repeats until [`BreathingScheduler::stop`] is called; it has no notion of
//! the step's overall countdown.

use super::pattern::{BreathPhase, BreathingPatternKind, PhaseSpec, REST_SCALE};
use crate::events::Event;
use crate::timer::{Timer, TimerId, TimerQueue};

/// Duration of the return-to-rest animation after stopping.
pub const RESET_TRANSITION_MS: u64 = 500;

#[derive(Debug)]
pub struct BreathingScheduler {
    pattern: BreathingPatternKind,
    phase_index: usize,
    /// Completed full cycles since start.
    cycle: u32,
    running: bool,
    /// Scale the visual is animating toward.
    scale_target: f32,
    pending: Option<Timer>,
}

impl BreathingScheduler {
    pub fn new(pattern: BreathingPatternKind) -> Self {
        Self {
            pattern,
            phase_index: 0,
            cycle: 0,
            running: false,
            scale_target: REST_SCALE,
            pending: None,
        }
    }

    /// Build from a pattern name; unknown names use the equal pattern.
    pub fn from_name(name: &str) -> Self {
        Self::new(BreathingPatternKind::from_name(name))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn pattern(&self) -> BreathingPatternKind {
        self.pattern
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn current(&self) -> PhaseSpec {
        self.pattern.phases()[self.phase_index]
    }

    pub fn current_phase(&self) -> BreathPhase {
        self.current().phase
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scale_target(&self) -> f32 {
        self.scale_target
    }

    /// Whether `id` is this scheduler's pending phase transition.
    pub fn owns(&self, id: TimerId) -> bool {
        self.pending.as_ref().is_some_and(|t| t.id() == id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, timers: &TimerQueue) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.phase_index = 0;
        self.cycle = 0;
        Some(self.enter_phase(timers))
    }

    /// Handle a fired timer; advances to the next phase if `id` is ours.
    pub fn on_timer(&mut self, id: TimerId, timers: &TimerQueue) -> Option<Event> {
        if !self.running || !self.owns(id) {
            return None;
        }
        self.pending = None;
        self.phase_index = (self.phase_index + 1) % self.pattern.phases().len();
        if self.phase_index == 0 {
            self.cycle += 1;
        }
        Some(self.enter_phase(timers))
    }

    /// Cancel the pending transition and ease back to rest.
    pub fn stop(&mut self, now_ms: u64) -> Option<Event> {
        self.pending = None;
        if !self.running {
            return None;
        }
        self.running = false;
        self.phase_index = 0;
        self.scale_target = REST_SCALE;
        Some(Event::AnimationReset {
            scale: REST_SCALE,
            transition_ms: RESET_TRANSITION_MS,
            at_ms: now_ms,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_phase(&mut self, timers: &TimerQueue) -> Event {
        let spec = self.current();
        let animate_to = spec.phase.animation_target();
        if let Some(scale) = animate_to {
            self.scale_target = scale;
        }
        self.pending = Some(timers.schedule(spec.duration_ms));
        Event::PhaseChanged {
            phase: spec.phase,
            phase_index: self.phase_index,
            duration_ms: spec.duration_ms,
            cycle: self.cycle,
            animate_to,
            at_ms: timers.now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breathing::pattern::EXPANDED_SCALE;

    fn phases_until(
        scheduler: &mut BreathingScheduler,
        timers: &TimerQueue,
        until_ms: u64,
    ) -> Vec<(BreathPhase, u64, u64)> {
        let mut seen = Vec::new();
        if let Some(Event::PhaseChanged { phase, duration_ms, at_ms, .. }) = scheduler.start(timers) {
            seen.push((phase, duration_ms, at_ms));
        }
        while let Some(id) = timers.pop_due(until_ms) {
            if let Some(Event::PhaseChanged { phase, duration_ms, at_ms, .. }) =
                scheduler.on_timer(id, timers)
            {
                seen.push((phase, duration_ms, at_ms));
            }
        }
        seen
    }

    #[test]
    fn box_cycles_through_four_phases() {
        use BreathPhase::*;
        let timers = TimerQueue::new();
        let mut scheduler = BreathingScheduler::new(BreathingPatternKind::Box);
        let seen = phases_until(&mut scheduler, &timers, 36_000);

        let order: Vec<BreathPhase> = seen.iter().map(|s| s.0).collect();
        assert_eq!(
            order,
            vec![Inhale, Hold, Exhale, Rest, Inhale, Hold, Exhale, Rest, Inhale, Hold]
        );
        let starts: Vec<u64> = seen.iter().map(|s| s.2).collect();
        assert_eq!(starts, (0..10).map(|i| i * 4_000).collect::<Vec<_>>());
        assert_eq!(scheduler.cycle(), 2);
    }

    #[test]
    fn four_seven_eight_has_no_rest() {
        use BreathPhase::*;
        let timers = TimerQueue::new();
        let mut scheduler = BreathingScheduler::from_name("4-7-8");
        let seen = phases_until(&mut scheduler, &timers, 38_000);

        assert_eq!(
            seen,
            vec![
                (Inhale, 4_000, 0),
                (Hold, 7_000, 4_000),
                (Exhale, 8_000, 11_000),
                (Inhale, 4_000, 19_000),
                (Hold, 7_000, 23_000),
                (Exhale, 8_000, 30_000),
                (Inhale, 4_000, 38_000),
            ]
        );
    }

    #[test]
    fn unknown_name_uses_equal() {
        let scheduler = BreathingScheduler::from_name("ujjayi");
        assert_eq!(scheduler.pattern(), BreathingPatternKind::Equal);
    }

    #[test]
    fn scale_follows_inhale_and_exhale_only() {
        let timers = TimerQueue::new();
        let mut scheduler = BreathingScheduler::new(BreathingPatternKind::Box);
        scheduler.start(&timers);
        assert_eq!(scheduler.scale_target(), EXPANDED_SCALE);

        // Hold keeps the expanded target.
        let id = timers.pop_due(4_000).unwrap();
        scheduler.on_timer(id, &timers);
        assert_eq!(scheduler.current_phase(), BreathPhase::Hold);
        assert_eq!(scheduler.scale_target(), EXPANDED_SCALE);

        let id = timers.pop_due(8_000).unwrap();
        scheduler.on_timer(id, &timers);
        assert_eq!(scheduler.current_phase(), BreathPhase::Exhale);
        assert_eq!(scheduler.scale_target(), REST_SCALE);
    }

    #[test]
    fn stop_cancels_pending_and_resets() {
        let timers = TimerQueue::new();
        let mut scheduler = BreathingScheduler::new(BreathingPatternKind::Box);
        scheduler.start(&timers);
        let id = timers.pop_due(4_000).unwrap();
        scheduler.on_timer(id, &timers);
        assert_eq!(timers.pending_count(), 1);

        match scheduler.stop(timers.now_ms()) {
            Some(Event::AnimationReset { scale, transition_ms, .. }) => {
                assert_eq!(scale, REST_SCALE);
                assert_eq!(transition_ms, RESET_TRANSITION_MS);
            }
            other => panic!("expected AnimationReset, got {other:?}"),
        }
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(scheduler.current_phase(), BreathPhase::Inhale);
        assert!(!scheduler.is_running());
        assert!(scheduler.stop(timers.now_ms()).is_none());
        assert_eq!(timers.pop_due(u64::MAX), None);
    }

    #[test]
    fn foreign_timer_ids_are_ignored() {
        let timers = TimerQueue::new();
        let mut scheduler = BreathingScheduler::new(BreathingPatternKind::Equal);
        scheduler.start(&timers);
        let other = timers.schedule(1);
        let id = timers.pop_due(1).unwrap();
        assert_eq!(id, other.id());
        assert!(scheduler.on_timer(id, &timers).is_none());
        assert_eq!(scheduler.phase_index(), 0);
    }
}
