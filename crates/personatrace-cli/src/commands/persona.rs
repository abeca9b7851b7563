pub fn run(visitor: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker()?;
    let profile = tracker.profile(visitor)?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
