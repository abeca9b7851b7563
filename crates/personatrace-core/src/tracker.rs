//! Inbound facade wiring the catalog, scorer, and trigger together.
//!
//! Surrounding request-handling code talks to [`BehaviorTracker`]:
//! raw events go in, trigger decisions and persona context come out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::{BehaviorEvent, EventCatalog, EventRule};
use crate::persona::DominantPersona;
use crate::scoring::{PersonaScorer, VisitorProfile};
use crate::storage::{BehaviorSummary, ScoreStore};
use crate::trigger::{DecisionTrigger, TriggerConfig, TriggerDecision};

/// What `record_event` resolved an event to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub visitor_id: String,
    pub event_type: String,
    /// The catalog rule that was applied.
    pub rule: EventRule,
    /// Winner after this event was scored.
    pub dominant: DominantPersona,
}

/// One-stop entry point over a shared [`ScoreStore`].
pub struct BehaviorTracker<S: ScoreStore> {
    catalog: EventCatalog,
    scorer: PersonaScorer<S>,
    trigger: DecisionTrigger<S>,
}

impl<S: ScoreStore> BehaviorTracker<S> {
    pub fn new(store: Arc<S>, trigger_config: TriggerConfig, catalog: EventCatalog) -> Self {
        let scorer = PersonaScorer::new(Arc::clone(&store));
        let trigger = DecisionTrigger::new(store, trigger_config, catalog.clone());
        Self {
            catalog,
            scorer,
            trigger,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Score one behavioral event.
    ///
    /// Maps the event type to its `(persona, weight)` contribution via
    /// the catalog and applies it. Unknown event types are rejected, not
    /// silently dropped.
    pub fn record_event(&self, event: &BehaviorEvent) -> Result<RecordOutcome> {
        let rule = self.catalog.rule(&event.event_type)?;
        self.scorer.add_score(
            &event.visitor_id,
            rule.persona,
            rule.weight,
            &event.event_type,
            &event.event_source,
            event.metadata.clone(),
        )?;

        Ok(RecordOutcome {
            visitor_id: event.visitor_id.trim().to_string(),
            event_type: event.event_type.clone(),
            rule,
            dominant: self.scorer.dominant_persona(&event.visitor_id)?,
        })
    }

    /// Should the AI assistant be invoked for this visitor now?
    pub fn should_trigger_ai(&self, visitor_id: &str) -> Result<TriggerDecision> {
        self.trigger.should_trigger_ai(visitor_id)
    }

    /// Persona context for AI prompt construction.
    pub fn dominant_persona(&self, visitor_id: &str) -> Result<DominantPersona> {
        self.scorer.dominant_persona(visitor_id)
    }

    pub fn profile(&self, visitor_id: &str) -> Result<VisitorProfile> {
        self.scorer.profile(visitor_id)
    }

    pub fn behavior_summary(&self, visitor_id: &str) -> Result<BehaviorSummary> {
        self.scorer.behavior_summary(visitor_id)
    }

    pub fn scorer(&self) -> &PersonaScorer<S> {
        &self.scorer
    }
}
