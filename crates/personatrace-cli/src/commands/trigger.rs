pub fn run(visitor: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker()?;
    let decision = tracker.should_trigger_ai(visitor)?;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
