//! # PersonaTrace Core Library
//!
//! Core business logic for PersonaTrace: visitor behavior scoring and the
//! AI-trigger decision engine. All operations are available via the
//! standalone CLI binary, with any surrounding web layer expected to be a
//! thin adapter over this same library.
//!
//! ## Architecture
//!
//! - **Persona Scorer**: turns labeled behavioral events into cumulative
//!   per-category scores for each visitor
//! - **Decision Trigger**: threshold rules deciding when a visitor has
//!   shown enough signal to invoke the AI assistant
//! - **Storage**: SQLite-backed score store and TOML-based configuration,
//!   behind an injectable [`ScoreStore`] interface
//! - **Event Catalog**: explicit, configurable event-to-score mapping
//!
//! ## Key Components
//!
//! - [`BehaviorTracker`]: inbound facade (record events, ask for decisions)
//! - [`PersonaScorer`]: score accumulation and dominant-persona reads
//! - [`DecisionTrigger`]: the AI-invocation gate
//! - [`Database`]: persistent score store

pub mod error;
pub mod events;
pub mod persona;
pub mod scoring;
pub mod storage;
pub mod tracker;
pub mod trigger;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{BehaviorEvent, EventCatalog, EventRule};
pub use persona::{DominantPersona, Persona, PersonaScore};
pub use scoring::{PersonaScorer, VisitorProfile};
pub use storage::{BehaviorSummary, Config, Database, MemoryStore, ScoreStore, ScoredEvent};
pub use tracker::{BehaviorTracker, RecordOutcome};
pub use trigger::{DecisionTrigger, TriggerConfig, TriggerDecision, TriggerReason};
