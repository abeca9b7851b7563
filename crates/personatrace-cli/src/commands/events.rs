use clap::Subcommand;
use personatrace_core::Config;

#[derive(Subcommand)]
pub enum EventsAction {
    /// List the effective event catalog
    List,
}

pub fn run(action: EventsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        EventsAction::List => {
            let config = Config::load()?;
            let entries: Vec<serde_json::Value> = config
                .events
                .iter_sorted()
                .map(|(event_type, rule)| {
                    serde_json::json!({
                        "event_type": event_type,
                        "persona": rule.persona,
                        "weight": rule.weight,
                        "high_intent": rule.high_intent,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
