pub mod config;
pub mod events;
pub mod persona;
pub mod purge;
pub mod record;
pub mod scores;
pub mod summary;
pub mod trigger;

use std::sync::Arc;

use personatrace_core::{BehaviorTracker, Config, Database};

/// Open the database and build a tracker from the on-disk configuration.
pub fn open_tracker() -> Result<BehaviorTracker<Database>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Arc::new(Database::open()?);
    Ok(BehaviorTracker::new(db, config.trigger, config.events))
}
