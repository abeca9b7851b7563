//! AI-invocation gate.
//!
//! The trigger keeps the assistant from firing on every micro-event: it
//! reads a visitor's accumulated state and applies fixed threshold rules,
//! in order:
//!
//! 1. Fewer events than `min_events_count` -> no trigger, regardless of score
//! 2. Dominant score at or above `ai_trigger_threshold` -> trigger
//! 3. Any high-intent event on record -> trigger
//! 4. Otherwise -> no trigger
//!
//! "Already triggered, suppress repeat" bookkeeping is the caller's
//! concern; this core keeps no per-window flag.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::events::EventCatalog;
use crate::scoring::dominant_from_records;
use crate::storage::ScoreStore;

/// Tunable trigger thresholds.
///
/// These are configuration, not business logic: the defaults are
/// illustrative and callers are expected to adjust them per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Minimum scored events before the trigger considers a visitor at all.
    #[serde(default = "default_min_events_count")]
    pub min_events_count: u64,
    /// Dominant-persona score at which the trigger fires (inclusive).
    #[serde(default = "default_ai_trigger_threshold")]
    pub ai_trigger_threshold: i64,
}

fn default_min_events_count() -> u64 {
    3
}
fn default_ai_trigger_threshold() -> i64 {
    20
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            min_events_count: default_min_events_count(),
            ai_trigger_threshold: default_ai_trigger_threshold(),
        }
    }
}

/// Why a trigger decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerReason {
    InsufficientEvents,
    ScoreThresholdMet,
    HighIntentEvent,
    NoTriggerCondition,
}

/// Outcome of a trigger check. Derived on read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerDecision {
    pub trigger: bool,
    pub reason: TriggerReason,
}

/// Decides whether to invoke the AI assistant for a visitor now.
pub struct DecisionTrigger<S: ScoreStore> {
    store: Arc<S>,
    config: TriggerConfig,
    catalog: EventCatalog,
}

impl<S: ScoreStore> DecisionTrigger<S> {
    pub fn new(store: Arc<S>, config: TriggerConfig, catalog: EventCatalog) -> Self {
        Self {
            store,
            config,
            catalog,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Evaluate the trigger rules for a visitor.
    ///
    /// A low score is a normal `trigger: false` outcome, not an error.
    ///
    /// # Errors
    /// - `ValidationError::EmptyVisitorId` for a blank visitor id
    /// - `CoreError::UnknownVisitor` if the visitor has never been scored
    pub fn should_trigger_ai(&self, visitor_id: &str) -> Result<TriggerDecision> {
        let visitor_id = visitor_id.trim();
        if visitor_id.is_empty() {
            return Err(ValidationError::EmptyVisitorId.into());
        }

        let summary = self
            .store
            .summary(visitor_id)?
            .ok_or_else(|| CoreError::UnknownVisitor(visitor_id.to_string()))?;

        // Event-count gate first: one giant event must not trigger.
        if summary.event_count < self.config.min_events_count {
            return Ok(TriggerDecision {
                trigger: false,
                reason: TriggerReason::InsufficientEvents,
            });
        }

        let dominant = dominant_from_records(&self.store.scores(visitor_id)?);
        if dominant.score >= self.config.ai_trigger_threshold {
            return Ok(TriggerDecision {
                trigger: true,
                reason: TriggerReason::ScoreThresholdMet,
            });
        }

        if summary
            .event_types
            .iter()
            .any(|t| self.catalog.is_high_intent(t))
        {
            return Ok(TriggerDecision {
                trigger: true,
                reason: TriggerReason::HighIntentEvent,
            });
        }

        Ok(TriggerDecision {
            trigger: false,
            reason: TriggerReason::NoTriggerCondition,
        })
    }
}
