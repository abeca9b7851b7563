use clap::Args;
use personatrace_core::BehaviorEvent;
use uuid::Uuid;

#[derive(Args)]
pub struct RecordArgs {
    /// Event type (must exist in the catalog, see `events list`)
    pub event_type: String,
    /// Visitor id; a fresh anonymous id is minted when omitted
    #[arg(long)]
    pub visitor: Option<String>,
    /// Where the event originated (page, widget, campaign...)
    #[arg(long, default_value = "")]
    pub source: String,
    /// JSON metadata payload
    #[arg(long)]
    pub metadata: Option<String>,
}

pub fn run(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = super::open_tracker()?;

    let visitor = args
        .visitor
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut event = BehaviorEvent::new(visitor.clone(), args.event_type).with_source(args.source);
    if let Some(metadata) = args.metadata {
        event = event.with_metadata(serde_json::from_str(&metadata)?);
    }

    let outcome = tracker.record_event(&event)?;
    let decision = tracker.should_trigger_ai(&visitor)?;

    let json = serde_json::json!({
        "recorded": outcome,
        "decision": decision,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
