use std::str::FromStr;

use clap::Args;
use slowspot_core::{
    BuiltinText, Event, FlowController, InstructionCatalog, InstructionProvider, PreferenceStore,
    Preferences, TextResolver, TimeOfDay, TomlPreferenceStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Duration, Instant};

use super::{emit, emit_all, runtime, sleep_until};

#[derive(Args)]
pub struct PrepareArgs {
    /// Session level (1-5)
    #[arg(long, default_value = "1")]
    level: u8,
    /// Meditation technique (e.g. "body_scan", "vipassana")
    #[arg(long, default_value = "breath")]
    technique: String,
}

/// One line of input on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FlowCommand {
    Next,
    Toggle(String),
    Start,
    Finish,
    SkipStep,
    Skip,
    DontAsk,
    Confirm,
    Cancel,
    AlwaysSkip,
    Intention(String),
    Begin(Option<String>),
    Status,
}

impl FromStr for FlowCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word {
            "next" => FlowCommand::Next,
            "toggle" if !rest.is_empty() => FlowCommand::Toggle(rest.to_string()),
            "toggle" => return Err("usage: toggle <id>".to_string()),
            "start" => FlowCommand::Start,
            "finish" => FlowCommand::Finish,
            "skip-step" => FlowCommand::SkipStep,
            "skip" => FlowCommand::Skip,
            "dont-ask" => FlowCommand::DontAsk,
            "confirm" => FlowCommand::Confirm,
            "cancel" => FlowCommand::Cancel,
            "always-skip" => FlowCommand::AlwaysSkip,
            "intention" => FlowCommand::Intention(rest.to_string()),
            "begin" if rest.is_empty() => FlowCommand::Begin(None),
            "begin" => FlowCommand::Begin(Some(rest.to_string())),
            "status" => FlowCommand::Status,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(command)
    }
}

pub fn run(args: PrepareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlPreferenceStore::open_default()?;
    let prefs = store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load preferences, using defaults");
        Preferences::default()
    });

    if prefs.skip_instructions {
        tracing::info!("preparation skipped by preference");
        emit(&Event::SessionBegun {
            intention: String::new(),
            at_ms: 0,
        })?;
        return Ok(());
    }

    let instruction = InstructionCatalog::builtin().instruction(args.level, &args.technique);
    let flow = FlowController::new(instruction, store, |intention| {
        tracing::info!(%intention, "starting meditation session");
    });
    runtime()?.block_on(drive(flow))
}

async fn drive<S: PreferenceStore>(mut flow: FlowController<S>) -> Result<(), Box<dyn std::error::Error>> {
    let text = BuiltinText::english();
    let hour = TimeOfDay::local_hour();
    eprintln!("{}", text.text(TimeOfDay::greeting_key(hour), "Welcome"));
    eprintln!("{}", text.text(TimeOfDay::recommendation_key(hour), ""));
    println!("{}", serde_json::to_string(&flow.snapshot())?);

    let origin = Instant::now();
    let elapsed_ms = || u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !flow.is_finished() {
        let deadline = flow
            .next_deadline_ms()
            .map(|ms| origin + Duration::from_millis(ms));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                emit_all(&flow.advance_clock(elapsed_ms()))?;
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<FlowCommand>() {
                    Ok(command) => apply(&mut flow, command)?,
                    Err(message) => eprintln!("{message}"),
                }
            }
            _ = sleep_until(deadline) => {
                emit_all(&flow.advance_clock(elapsed_ms()))?;
            }
        }
    }
    Ok(())
}

fn apply<S: PreferenceStore>(
    flow: &mut FlowController<S>,
    command: FlowCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<Event> = match command {
        FlowCommand::Next => flow.advance(),
        FlowCommand::Toggle(id) => flow.toggle_checklist(&id).into_iter().collect(),
        FlowCommand::Start => flow.start_breathing(),
        FlowCommand::Finish => flow.finish_breathing_early(),
        FlowCommand::SkipStep => flow.skip_breathing_step(),
        FlowCommand::Skip => flow.request_skip().into_iter().collect(),
        FlowCommand::DontAsk => {
            match flow.toggle_dont_ask_again() {
                Some(enabled) => eprintln!("don't ask again: {enabled}"),
                None => eprintln!("no skip prompt open"),
            }
            Vec::new()
        }
        FlowCommand::Confirm => flow.confirm_skip(),
        FlowCommand::Cancel => flow.cancel_skip().into_iter().collect(),
        FlowCommand::AlwaysSkip => vec![flow.toggle_always_skip()],
        FlowCommand::Intention(text) => {
            flow.set_intention(text);
            Vec::new()
        }
        FlowCommand::Begin(text) => {
            let intention = text.unwrap_or_else(|| flow.intention_text().to_string());
            flow.complete(&intention)
        }
        FlowCommand::Status => {
            println!("{}", serde_json::to_string(&flow.snapshot())?);
            Vec::new()
        }
    };

    if events.is_empty() && !flow.is_finished() {
        tracing::debug!(step = %flow.current_step(), "command had no effect");
    }
    emit_all(&events)?;
    Ok(())
}
