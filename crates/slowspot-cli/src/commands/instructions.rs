use clap::Subcommand;
use slowspot_core::{InstructionCatalog, InstructionProvider, TimeOfDay};

#[derive(Subcommand)]
pub enum InstructionsAction {
    /// List built-in instructions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Only instructions suited to the current local hour
        #[arg(long)]
        now: bool,
    },
    /// Show one instruction as JSON
    Show {
        /// Instruction id (e.g. "level1_body_scan")
        id: String,
    },
    /// Resolve the instruction for a session level and technique
    Lookup {
        #[arg(long, default_value = "1")]
        level: u8,
        #[arg(long, default_value = "breath")]
        technique: String,
    },
}

pub fn run(action: InstructionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = InstructionCatalog::builtin();
    match action {
        InstructionsAction::List { json, now } => {
            let hour = TimeOfDay::local_hour();
            let entries: Vec<_> = catalog
                .all()
                .iter()
                .filter(|i| !now || i.time_of_day.suits_hour(hour))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            for instruction in entries {
                let breathing = match instruction.breathing_prep {
                    Some(prep) => format!("{} {}s", prep.pattern, prep.duration_secs),
                    None => "-".to_string(),
                };
                println!(
                    "{:<24} L{}  {:<18} {}",
                    instruction.id,
                    instruction.session_level,
                    instruction.technique.as_str(),
                    breathing
                );
            }
        }
        InstructionsAction::Show { id } => {
            let instruction = catalog
                .get(&id)
                .ok_or_else(|| format!("instruction not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(instruction)?);
        }
        InstructionsAction::Lookup { level, technique } => {
            let instruction = catalog.instruction(level, &technique);
            println!("{}", serde_json::to_string_pretty(&instruction)?);
        }
    }
    Ok(())
}
