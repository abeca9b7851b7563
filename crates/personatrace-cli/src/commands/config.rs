use clap::Subcommand;
use personatrace_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Reset config to defaults
    Reset,
    /// Set a trigger threshold
    Set {
        /// Config key ("min_events_count" or "ai_trigger_threshold")
        key: String,
        /// New value
        value: i64,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "min_events_count" => {
                    config.trigger.min_events_count = u64::try_from(value)?;
                }
                "ai_trigger_threshold" => {
                    config.trigger.ai_trigger_threshold = value;
                }
                other => {
                    eprintln!("unknown key: {other}");
                    std::process::exit(1);
                }
            }
            config.validate()?;
            config.save()?;
            println!("ok");
        }
    }
    Ok(())
}
