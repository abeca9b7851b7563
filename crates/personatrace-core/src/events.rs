//! Behavioral event model and the event-to-score catalog.
//!
//! Every qualifying visitor action enters the system as a [`BehaviorEvent`].
//! The [`EventCatalog`] is the single place that maps an event type to its
//! `(persona, weight)` contribution and marks high-intent signals, so the
//! mapping can be validated and extended without touching trigger logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::persona::Persona;

/// A single labeled visitor action, as handed in by the ingestion layer.
///
/// The core scores each event it is given exactly once; deduplication of
/// physical events is the ingestion layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub visitor_id: String,
    pub event_type: String,
    /// Where the event originated (page, widget, campaign...).
    #[serde(default)]
    pub event_source: String,
    /// Free-form payload carried along for audit purposes.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl BehaviorEvent {
    pub fn new(visitor_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            visitor_id: visitor_id.into(),
            event_type: event_type.into(),
            event_source: String::new(),
            metadata: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.event_source = source.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Scoring rule for one event type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRule {
    /// Category this event contributes to.
    pub persona: Persona,
    /// Points added per occurrence. Must be positive.
    pub weight: i64,
    /// High-intent events can fire the AI trigger regardless of score.
    #[serde(default)]
    pub high_intent: bool,
}

impl EventRule {
    pub fn new(persona: Persona, weight: i64) -> Self {
        Self {
            persona,
            weight,
            high_intent: false,
        }
    }

    pub fn high_intent(mut self) -> Self {
        self.high_intent = true;
        self
    }
}

/// Explicit event-type to contribution mapping.
///
/// Serialized as a plain table in the config file, e.g.
/// `viewed_pricing_page = { persona = "business", weight = 5 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCatalog {
    rules: HashMap<String, EventRule>,
}

impl EventCatalog {
    /// Empty catalog. Mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Built-in catalog covering the stock storefront signals.
    pub fn builtin() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            "read_blog_post".to_string(),
            EventRule::new(Persona::Author, 2),
        );
        rules.insert(
            "viewed_book_templates".to_string(),
            EventRule::new(Persona::Author, 3),
        );
        rules.insert(
            "viewed_pricing_page".to_string(),
            EventRule::new(Persona::Business, 5),
        );
        rules.insert(
            "pricing_page_dwell".to_string(),
            EventRule::new(Persona::Business, 8).high_intent(),
        );
        rules.insert(
            "downloaded_catalog".to_string(),
            EventRule::new(Persona::Business, 3),
        );
        rules.insert(
            "viewed_portfolio_item".to_string(),
            EventRule::new(Persona::Designer, 3),
        );
        rules.insert(
            "searched_fonts".to_string(),
            EventRule::new(Persona::Designer, 2),
        );
        rules.insert(
            "viewed_student_discount".to_string(),
            EventRule::new(Persona::Student, 4),
        );
        rules.insert(
            "visited_homepage".to_string(),
            EventRule::new(Persona::General, 1),
        );
        rules.insert(
            "add_to_cart".to_string(),
            EventRule::new(Persona::General, 10).high_intent(),
        );
        Self { rules }
    }

    /// Look up the rule for an event type.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownEventType` for unmapped types;
    /// the catalog never invents rules on the fly.
    pub fn rule(&self, event_type: &str) -> Result<EventRule, ValidationError> {
        self.rules
            .get(event_type)
            .copied()
            .ok_or_else(|| ValidationError::UnknownEventType(event_type.to_string()))
    }

    /// Whether this event type is a high-intent signal.
    /// Unmapped types are never high-intent.
    pub fn is_high_intent(&self, event_type: &str) -> bool {
        self.rules
            .get(event_type)
            .map(|r| r.high_intent)
            .unwrap_or(false)
    }

    /// Add or replace a rule.
    pub fn set_rule(&mut self, event_type: impl Into<String>, rule: EventRule) {
        self.rules.insert(event_type.into(), rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules sorted by event type for stable listings.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &EventRule)> {
        let mut entries: Vec<_> = self.rules.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validate every rule in the catalog.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for empty event types or
    /// non-positive weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (event_type, rule) in &self.rules {
            if event_type.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "events".to_string(),
                    message: "event type must not be empty".to_string(),
                });
            }
            if rule.weight <= 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("events.{event_type}.weight"),
                    message: format!("weight must be positive, got {}", rule.weight),
                });
            }
        }
        Ok(())
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = EventCatalog::builtin();
        assert!(!catalog.is_empty());
        catalog.validate().unwrap();
    }

    #[test]
    fn rule_lookup() {
        let catalog = EventCatalog::builtin();
        let rule = catalog.rule("viewed_pricing_page").unwrap();
        assert_eq!(rule.persona, Persona::Business);
        assert_eq!(rule.weight, 5);
        assert!(!rule.high_intent);
    }

    #[test]
    fn unknown_event_type_rejected() {
        let catalog = EventCatalog::builtin();
        let err = catalog.rule("rickrolled").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownEventType(t) if t == "rickrolled"));
    }

    #[test]
    fn high_intent_flags() {
        let catalog = EventCatalog::builtin();
        assert!(catalog.is_high_intent("add_to_cart"));
        assert!(catalog.is_high_intent("pricing_page_dwell"));
        assert!(!catalog.is_high_intent("visited_homepage"));
        assert!(!catalog.is_high_intent("not_in_catalog"));
    }

    #[test]
    fn zero_weight_rejected() {
        let mut catalog = EventCatalog::empty();
        catalog.set_rule("freebie", EventRule::new(Persona::General, 0));
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let catalog = EventCatalog::builtin();
        let text = toml::to_string(&catalog).unwrap();
        let back: EventCatalog = toml::from_str(&text).unwrap();
        assert_eq!(back, catalog);
    }
}
