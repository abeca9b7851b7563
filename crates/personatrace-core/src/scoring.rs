//! Persona scoring engine.
//!
//! Converts a stream of labeled behavioral events into cumulative
//! per-category belief about visitor intent. Scores only ever grow;
//! each call scores one event (deduplication of physical events is the
//! ingestion layer's concern).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::persona::{DominantPersona, Persona, PersonaScore};
use crate::storage::{BehaviorSummary, ScoreStore, ScoredEvent};

/// Accumulates per-visitor persona scores over an injected [`ScoreStore`].
pub struct PersonaScorer<S: ScoreStore> {
    store: Arc<S>,
}

impl<S: ScoreStore> PersonaScorer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Add `delta` points to a visitor's category accumulator.
    ///
    /// Not idempotent: scoring the same event twice double-counts.
    ///
    /// # Errors
    /// - `ValidationError::EmptyVisitorId` for a blank visitor id
    /// - `ValidationError::NonPositiveDelta` when `delta <= 0`
    pub fn add_score(
        &self,
        visitor_id: &str,
        persona: Persona,
        delta: i64,
        event_type: &str,
        event_source: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        let visitor_id = visitor_id.trim();
        if visitor_id.is_empty() {
            return Err(ValidationError::EmptyVisitorId.into());
        }
        if delta <= 0 {
            return Err(ValidationError::NonPositiveDelta(delta).into());
        }

        self.store.apply(&ScoredEvent {
            visitor_id: visitor_id.to_string(),
            persona,
            delta,
            event_type: event_type.to_string(),
            event_source: event_source.to_string(),
            metadata,
            at: Utc::now(),
        })
    }

    /// All known category scores for a visitor.
    ///
    /// Categories with no recorded events are absent, not zero, so "no
    /// data" stays distinguishable from "neutral".
    pub fn scores(&self, visitor_id: &str) -> Result<BTreeMap<Persona, i64>> {
        Ok(self
            .score_records(visitor_id)?
            .into_iter()
            .map(|s| (s.persona, s.score))
            .collect())
    }

    /// Full accumulator rows, ordered by first contribution time.
    pub fn score_records(&self, visitor_id: &str) -> Result<Vec<PersonaScore>> {
        let visitor_id = visitor_id.trim();
        if visitor_id.is_empty() {
            return Err(ValidationError::EmptyVisitorId.into());
        }
        self.store.scores(visitor_id)
    }

    /// The category with the maximum score, with a ratio-based confidence.
    ///
    /// Ties go to the category whose first contribution was recorded
    /// earliest, so repeated calls always agree. A visitor with no scores
    /// gets the zero-state general persona, never an error.
    pub fn dominant_persona(&self, visitor_id: &str) -> Result<DominantPersona> {
        let records = self.score_records(visitor_id)?;
        Ok(dominant_from_records(&records))
    }

    /// Aggregate behavior stats used to gate the decision trigger.
    ///
    /// # Errors
    /// Returns `CoreError::UnknownVisitor` if the visitor has literally
    /// never been scored.
    pub fn behavior_summary(&self, visitor_id: &str) -> Result<BehaviorSummary> {
        let visitor_id = visitor_id.trim();
        if visitor_id.is_empty() {
            return Err(ValidationError::EmptyVisitorId.into());
        }
        self.store
            .summary(visitor_id)?
            .ok_or_else(|| CoreError::UnknownVisitor(visitor_id.to_string()))
    }
}

/// Compute the dominant persona from accumulator rows.
///
/// `records` must be ordered by first contribution time; a strictly
/// greater score is required to displace the current winner, which
/// implements the earliest-first tie-break.
pub(crate) fn dominant_from_records(records: &[PersonaScore]) -> DominantPersona {
    let Some(top) = records.iter().reduce(|best, s| {
        if s.score > best.score {
            s
        } else {
            best
        }
    }) else {
        return DominantPersona::unknown();
    };

    let total: i64 = records.iter().map(|s| s.score).sum();
    let confidence = if total > 0 {
        (100.0 * top.score as f64 / total as f64).round() as u8
    } else {
        0
    };

    DominantPersona {
        persona: top.persona,
        score: top.score,
        confidence,
    }
}

/// Convenience view combining the winner with the raw per-category map,
/// handed to AI prompt construction as visitor context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorProfile {
    pub visitor_id: String,
    pub dominant: DominantPersona,
    pub scores: BTreeMap<Persona, i64>,
}

impl<S: ScoreStore> PersonaScorer<S> {
    pub fn profile(&self, visitor_id: &str) -> Result<VisitorProfile> {
        let records = self.score_records(visitor_id)?;
        Ok(VisitorProfile {
            visitor_id: visitor_id.trim().to_string(),
            dominant: dominant_from_records(&records),
            scores: records.into_iter().map(|s| (s.persona, s.score)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn scorer() -> PersonaScorer<MemoryStore> {
        PersonaScorer::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn deltas_sum_exactly() {
        let scorer = scorer();
        scorer
            .add_score("v", Persona::Author, 10, "read_blog_post", "", None)
            .unwrap();
        scorer
            .add_score("v", Persona::Author, 5, "read_blog_post", "", None)
            .unwrap();

        let scores = scorer.scores("v").unwrap();
        assert_eq!(scores[&Persona::Author], 15);
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn equal_scores_tie_break_is_deterministic() {
        let scorer = scorer();
        scorer
            .add_score("v", Persona::Author, 50, "read_blog_post", "", None)
            .unwrap();
        scorer
            .add_score("v", Persona::Business, 50, "viewed_pricing_page", "", None)
            .unwrap();

        // Author scored first; repeated calls must agree.
        for _ in 0..10 {
            let dominant = scorer.dominant_persona("v").unwrap();
            assert_eq!(dominant.persona, Persona::Author);
            assert_eq!(dominant.score, 50);
            assert_eq!(dominant.confidence, 50);
        }
    }

    #[test]
    fn no_scores_yields_general_zero_state() {
        let scorer = scorer();
        let dominant = scorer.dominant_persona("nobody").unwrap();
        assert_eq!(dominant, DominantPersona::unknown());
    }

    #[test]
    fn confidence_is_winner_share() {
        let scorer = scorer();
        scorer
            .add_score("v", Persona::Business, 30, "viewed_pricing_page", "", None)
            .unwrap();
        scorer
            .add_score("v", Persona::Author, 10, "read_blog_post", "", None)
            .unwrap();

        let dominant = scorer.dominant_persona("v").unwrap();
        assert_eq!(dominant.persona, Persona::Business);
        assert_eq!(dominant.confidence, 75);
    }

    #[test]
    fn zero_delta_rejected() {
        let scorer = scorer();
        let err = scorer
            .add_score("v", Persona::Author, 0, "read_blog_post", "", None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NonPositiveDelta(0))
        ));
    }

    #[test]
    fn empty_visitor_rejected() {
        let scorer = scorer();
        let err = scorer
            .add_score("", Persona::Author, 1, "read_blog_post", "", None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyVisitorId)
        ));
    }

    #[test]
    fn summary_unknown_visitor() {
        let scorer = scorer();
        let err = scorer.behavior_summary("ghost").unwrap_err();
        assert!(matches!(err, CoreError::UnknownVisitor(_)));
    }

    #[test]
    fn profile_combines_winner_and_map() {
        let scorer = scorer();
        scorer
            .add_score("v", Persona::Student, 4, "viewed_student_discount", "", None)
            .unwrap();
        let profile = scorer.profile("v").unwrap();
        assert_eq!(profile.dominant.persona, Persona::Student);
        assert_eq!(profile.scores[&Persona::Student], 4);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Confidence stays in [0, 100] and is 0 only for an empty
            /// record set; the winner's score never exceeds the total.
            #[test]
            fn confidence_bounds(deltas in proptest::collection::vec((0usize..5, 1i64..1000), 0..40)) {
                let scorer = scorer();
                for (idx, delta) in &deltas {
                    let persona = Persona::ALL[*idx];
                    scorer
                        .add_score("v", persona, *delta, "event", "", None)
                        .unwrap();
                }

                let dominant = scorer.dominant_persona("v").unwrap();
                prop_assert!(dominant.confidence <= 100);
                let total: i64 = deltas.iter().map(|(_, d)| d).sum();
                prop_assert!(dominant.score <= total);
                if deltas.is_empty() {
                    prop_assert_eq!(dominant.confidence, 0);
                    prop_assert_eq!(dominant.score, 0);
                } else {
                    prop_assert!(dominant.confidence > 0);
                }
            }

            /// Accumulated score per category equals the sum of its deltas.
            #[test]
            fn sums_are_exact(deltas in proptest::collection::vec(1i64..500, 1..30)) {
                let scorer = scorer();
                for delta in &deltas {
                    scorer
                        .add_score("v", Persona::Designer, *delta, "searched_fonts", "", None)
                        .unwrap();
                }
                let scores = scorer.scores("v").unwrap();
                prop_assert_eq!(scores[&Persona::Designer], deltas.iter().sum::<i64>());
            }
        }
    }
}
