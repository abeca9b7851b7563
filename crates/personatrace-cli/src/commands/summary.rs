pub fn run(visitor: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker()?;
    let summary = tracker.behavior_summary(visitor)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
