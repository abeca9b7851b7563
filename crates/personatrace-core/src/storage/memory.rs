//! In-process score store.
//!
//! Backs unit tests and embedders that don't want a database file.
//! Mirrors the SQLite store's semantics: atomic increments under one
//! lock, insertion-ordered score rows, append-only event log.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{BehaviorSummary, ScoreStore, ScoredEvent};
use crate::error::{CoreError, Result};
use crate::persona::PersonaScore;

#[derive(Default)]
struct Inner {
    /// Insertion-ordered accumulator rows; at most one per
    /// (visitor, category).
    scores: Vec<PersonaScore>,
    events: Vec<ScoredEvent>,
}

/// Memory-backed [`ScoreStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Custom("memory store mutex poisoned".to_string()))
    }
}

impl ScoreStore for MemoryStore {
    fn apply(&self, event: &ScoredEvent) -> Result<()> {
        let mut inner = self.lock()?;

        match inner
            .scores
            .iter_mut()
            .find(|s| s.visitor_id == event.visitor_id && s.persona == event.persona)
        {
            Some(row) => {
                row.score += event.delta;
                row.last_updated = event.at;
                row.source_event = event.event_type.clone();
            }
            None => inner.scores.push(PersonaScore {
                visitor_id: event.visitor_id.clone(),
                persona: event.persona,
                score: event.delta,
                first_scored_at: event.at,
                last_updated: event.at,
                source_event: event.event_type.clone(),
            }),
        }

        inner.events.push(event.clone());
        Ok(())
    }

    fn scores(&self, visitor_id: &str) -> Result<Vec<PersonaScore>> {
        let inner = self.lock()?;
        Ok(inner
            .scores
            .iter()
            .filter(|s| s.visitor_id == visitor_id)
            .cloned()
            .collect())
    }

    fn summary(&self, visitor_id: &str) -> Result<Option<BehaviorSummary>> {
        let inner = self.lock()?;
        let events: Vec<&ScoredEvent> = inner
            .events
            .iter()
            .filter(|e| e.visitor_id == visitor_id)
            .collect();

        let (Some(first), Some(last)) = (
            events.iter().map(|e| e.at).min(),
            events.iter().map(|e| e.at).max(),
        ) else {
            return Ok(None);
        };

        let mut categories: Vec<_> = events.iter().map(|e| e.persona).collect();
        categories.sort();
        categories.dedup();

        let mut event_types: Vec<String> =
            events.iter().map(|e| e.event_type.clone()).collect();
        event_types.sort();
        event_types.dedup();

        Ok(Some(BehaviorSummary {
            visitor_id: visitor_id.to_string(),
            event_count: events.len() as u64,
            distinct_categories: categories.len() as u64,
            first_event_at: first,
            last_event_at: last,
            event_types,
        }))
    }

    fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.lock()?;

        let mut stale: Vec<String> = Vec::new();
        for event in &inner.events {
            if !stale.contains(&event.visitor_id) {
                let last = inner
                    .events
                    .iter()
                    .filter(|e| e.visitor_id == event.visitor_id)
                    .map(|e| e.at)
                    .max();
                if matches!(last, Some(at) if at < cutoff) {
                    stale.push(event.visitor_id.clone());
                }
            }
        }

        inner.events.retain(|e| !stale.contains(&e.visitor_id));
        inner.scores.retain(|s| !stale.contains(&s.visitor_id));
        Ok(stale.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;

    fn event(visitor: &str, persona: Persona, delta: i64, event_type: &str) -> ScoredEvent {
        ScoredEvent {
            visitor_id: visitor.to_string(),
            persona,
            delta,
            event_type: event_type.to_string(),
            event_source: String::new(),
            metadata: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn increments_accumulate() {
        let store = MemoryStore::new();
        store
            .apply(&event("v1", Persona::Author, 10, "read_blog_post"))
            .unwrap();
        store
            .apply(&event("v1", Persona::Author, 5, "read_blog_post"))
            .unwrap();

        let scores = store.scores("v1").unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 15);
    }

    #[test]
    fn preserves_first_contribution_order() {
        let store = MemoryStore::new();
        store
            .apply(&event("v1", Persona::Designer, 3, "viewed_portfolio_item"))
            .unwrap();
        store
            .apply(&event("v1", Persona::Author, 2, "read_blog_post"))
            .unwrap();
        store
            .apply(&event("v1", Persona::Designer, 1, "searched_fonts"))
            .unwrap();

        let scores = store.scores("v1").unwrap();
        assert_eq!(scores[0].persona, Persona::Designer);
        assert_eq!(scores[1].persona, Persona::Author);
    }

    #[test]
    fn summary_counts() {
        let store = MemoryStore::new();
        store
            .apply(&event("v1", Persona::Author, 2, "read_blog_post"))
            .unwrap();
        store
            .apply(&event("v1", Persona::Student, 4, "viewed_student_discount"))
            .unwrap();

        let summary = store.summary("v1").unwrap().unwrap();
        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.distinct_categories, 2);
        assert!(store.summary("nobody").unwrap().is_none());
    }

    #[test]
    fn purge_stale_visitors() {
        let store = MemoryStore::new();
        let mut old = event("stale", Persona::General, 1, "visited_homepage");
        old.at = Utc::now() - chrono::Duration::days(100);
        store.apply(&old).unwrap();
        store
            .apply(&event("fresh", Persona::General, 1, "visited_homepage"))
            .unwrap();

        let purged = store
            .purge_stale(Utc::now() - chrono::Duration::days(30))
            .unwrap();
        assert_eq!(purged, 1);
        assert!(store.scores("stale").unwrap().is_empty());
        assert_eq!(store.scores("fresh").unwrap().len(), 1);
    }
}
