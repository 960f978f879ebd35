mod countdown;
mod queue;

pub use countdown::{format_clock, CountdownState, CountdownTimer, TICK_INTERVAL_MS};
pub use queue::{Timer, TimerId, TimerQueue};
