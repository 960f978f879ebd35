use clap::Subcommand;
use slowspot_core::Preferences;

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Get a preference value
    Get {
        /// Preference key (e.g. "skip_instructions", "theme")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Preference key
        key: String,
        /// New value
        value: String,
    },
    /// List all preferences
    List,
    /// Reset preferences to defaults
    Reset,
}

pub fn run(action: PrefsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PrefsAction::Get { key } => {
            let prefs = Preferences::load_or_default();
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        PrefsAction::Set { key, value } => {
            let mut prefs = Preferences::load_or_default();
            prefs.set(&key, &value)?;
            prefs.save()?;
            println!("ok");
        }
        PrefsAction::List => {
            let prefs = Preferences::load_or_default();
            let json = serde_json::to_string_pretty(&prefs)?;
            println!("{json}");
        }
        PrefsAction::Reset => {
            Preferences::default().save()?;
            println!("preferences reset to defaults");
        }
    }
    Ok(())
}
