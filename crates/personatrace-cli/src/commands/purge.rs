use personatrace_core::{Database, ScoreStore};

pub fn run(days: i64) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let cutoff = chrono::Utc::now() - chrono::Duration::days(days);
    let purged = db.purge_stale(cutoff)?;
    println!("purged {purged} stale visitor(s)");
    Ok(())
}
