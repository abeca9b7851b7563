use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "personatrace-cli", version, about = "PersonaTrace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a behavioral event for a visitor
    Record(commands::record::RecordArgs),
    /// Per-category scores for a visitor
    Scores {
        /// Visitor id
        visitor: String,
    },
    /// Dominant persona for a visitor
    Persona {
        /// Visitor id
        visitor: String,
    },
    /// Behavior summary for a visitor
    Summary {
        /// Visitor id
        visitor: String,
    },
    /// Evaluate the AI-trigger rules for a visitor
    Trigger {
        /// Visitor id
        visitor: String,
    },
    /// Event catalog inspection
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Delete state for visitors inactive longer than the given number of days
    Purge {
        /// Staleness cutoff in days
        #[arg(long, default_value_t = 90)]
        days: i64,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Record(args) => commands::record::run(args),
        Commands::Scores { visitor } => commands::scores::run(&visitor),
        Commands::Persona { visitor } => commands::persona::run(&visitor),
        Commands::Summary { visitor } => commands::summary::run(&visitor),
        Commands::Trigger { visitor } => commands::trigger::run(&visitor),
        Commands::Events { action } => commands::events::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Purge { days } => commands::purge::run(days),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
