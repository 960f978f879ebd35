use clap::Args;
use slowspot_core::breathing::BreathingPatternKind;
use slowspot_core::flow::{BreathingStep, BreathingStepState};
use slowspot_core::instructions::BreathingPrep;
use slowspot_core::timer::format_clock;
use slowspot_core::{BuiltinText, Event, TextResolver, TimerQueue};
use tokio::time::{Duration, Instant};

use super::{emit_all, runtime, sleep_until};

#[derive(Args)]
pub struct BreatheArgs {
    /// Breathing pattern: box, 4-7-8, equal, calm
    #[arg(long, default_value = "equal")]
    pattern: String,
    /// Exercise length in seconds
    #[arg(long, default_value = "60")]
    seconds: u32,
    /// Human-readable output instead of JSON lines
    #[arg(long)]
    plain: bool,
}

pub fn run(args: BreatheArgs) -> Result<(), Box<dyn std::error::Error>> {
    let prep = BreathingPrep {
        duration_secs: args.seconds,
        pattern: BreathingPatternKind::from_name(&args.pattern),
    };
    runtime()?.block_on(exercise(prep, args.plain))
}

async fn exercise(prep: BreathingPrep, plain: bool) -> Result<(), Box<dyn std::error::Error>> {
    let timers = TimerQueue::new();
    let mut step = BreathingStep::new(prep, timers.clone());
    let text = BuiltinText::english();
    let origin = Instant::now();

    report(&step.start(), plain, &text)?;
    while step.state() == BreathingStepState::Running {
        let Some(deadline_ms) = timers.next_deadline_ms() else {
            break;
        };
        sleep_until(Some(origin + Duration::from_millis(deadline_ms))).await;

        let mut events = Vec::new();
        while let Some(id) = timers.pop_due(deadline_ms) {
            events.extend(step.on_timer(id));
        }
        report(&events, plain, &text)?;
    }
    Ok(())
}

fn report(events: &[Event], plain: bool, text: &dyn TextResolver) -> Result<(), Box<dyn std::error::Error>> {
    if !plain {
        emit_all(events)?;
        return Ok(());
    }
    for event in events {
        match event {
            Event::BreathingStarted { pattern, duration_secs, .. } => {
                println!("{pattern} breathing, {}", format_clock(*duration_secs));
            }
            Event::PhaseChanged { phase, duration_ms, .. } => {
                println!("{} ({}s)", phase.label(text), duration_ms / 1_000);
            }
            Event::CountdownCompleted { .. } => println!("done"),
            _ => {}
        }
    }
    Ok(())
}
