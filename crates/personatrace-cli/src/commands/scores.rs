pub fn run(visitor: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker()?;
    let scores = tracker.scorer().scores(visitor)?;
    println!("{}", serde_json::to_string_pretty(&scores)?);
    Ok(())
}
