use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "slowspot-cli", version, about = "SlowSpot CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse pre-session instructions
    Instructions {
        #[command(subcommand)]
        action: commands::instructions::InstructionsAction,
    },
    /// User preference management
    Prefs {
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
    /// Run a breathing exercise in real time
    Breathe(commands::breathe::BreatheArgs),
    /// Walk through the pre-session preparation interactively
    Prepare(commands::prepare::PrepareArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SLOWSPOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Instructions { action } => commands::instructions::run(action),
        Commands::Prefs { action } => commands::prefs::run(action),
        Commands::Breathe(args) => commands::breathe::run(args),
        Commands::Prepare(args) => commands::prepare::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
