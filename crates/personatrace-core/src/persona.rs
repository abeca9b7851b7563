//! Persona model: the fixed category enumeration, per-category score
//! accumulators, and the derived dominant-persona view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Coarse visitor-intent category used to tailor AI responses.
///
/// The set is closed: unknown category strings are rejected at the
/// boundary rather than silently creating new buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Author,
    Business,
    Designer,
    Student,
    General,
}

impl Persona {
    /// All known categories, in declaration order.
    pub const ALL: [Persona; 5] = [
        Persona::Author,
        Persona::Business,
        Persona::Designer,
        Persona::Student,
        Persona::General,
    ];

    /// Stable string form used for storage and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Author => "author",
            Persona::Business => "business",
            Persona::Designer => "designer",
            Persona::Student => "student",
            Persona::General => "general",
        }
    }

    /// Parse a category string.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownCategory` for anything outside
    /// the known enumeration.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "author" => Ok(Persona::Author),
            "business" => Ok(Persona::Business),
            "designer" => Ok(Persona::Designer),
            "student" => Ok(Persona::Student),
            "general" => Ok(Persona::General),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Persona {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::parse(s)
    }
}

/// One `(visitor, category)` score accumulator row.
///
/// Scores are non-negative and only ever grow within a scoring window;
/// retention/cleanup of stale visitors happens out of band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaScore {
    pub visitor_id: String,
    pub persona: Persona,
    pub score: i64,
    /// When the first contribution for this pair was recorded.
    /// Drives the deterministic earliest-first tie-break.
    pub first_scored_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Event type that most recently contributed (audit/explainability).
    pub source_event: String,
}

/// Derived winner view, computed on read and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantPersona {
    #[serde(rename = "type")]
    pub persona: Persona,
    pub score: i64,
    /// Share of the total signal held by the winner, in [0, 100].
    pub confidence: u8,
}

impl DominantPersona {
    /// Zero-state value returned for visitors with no recorded scores.
    ///
    /// Downstream rendering never branches on "missing" separately from
    /// "low-confidence general".
    pub fn unknown() -> Self {
        Self {
            persona: Persona::General,
            score: 0,
            confidence: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trip() {
        for p in Persona::ALL {
            assert_eq!(Persona::parse(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn unknown_category_rejected() {
        let err = Persona::parse("influencer").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownCategory(name) if name == "influencer"));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Persona::Business).unwrap();
        assert_eq!(json, "\"business\"");
    }

    #[test]
    fn unknown_persona_is_general_zero() {
        let d = DominantPersona::unknown();
        assert_eq!(d.persona, Persona::General);
        assert_eq!(d.score, 0);
        assert_eq!(d.confidence, 0);
    }
}
