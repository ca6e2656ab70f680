//! Deliberation domain
//!
//! This module contains the concepts of one panel deliberation:
//!
//! - [`Stage`](stage::Stage): the four steps of the fixed session sequence
//! - [`Panelist`](stage::Panelist): the specialist personas backing each stage
//! - The structured records panelists produce, ending in a
//!   [`FinalDecision`](value_objects::FinalDecision)
//!
//! # Session Flow
//!
//! ```text
//! PatientInfo
//!     │
//!     ▼
//! Hypothesize ──(top probability >= CERTAINTY_THRESHOLD)──▶ FinalDecision
//!     │
//!     ▼
//! TestSelection
//!     │
//!     ▼
//! Debate (Challenger | Stewardship | Checklist, concurrent)
//!     │
//!     ▼
//! Consensus ──▶ FinalDecision
//! ```

pub mod stage;
pub mod value_objects;

/// Probability cutoff for committing to a diagnosis without further workup.
///
/// At or above this value the panel acts on the leading hypothesis
/// immediately; below it, the session always seeks disconfirming evidence
/// through the test and debate stages. The comparison is inclusive
/// (`>=`), and the cutoff is fixed rather than configurable.
pub const CERTAINTY_THRESHOLD: f64 = 0.95;

// Re-export main types
pub use stage::{Panelist, Stage};
pub use value_objects::{
    Action, ChallengerCritique, DebateResults, Diagnosis, FinalDecision, QualityCheck,
    StewardshipAdvice, TestRequest,
};
