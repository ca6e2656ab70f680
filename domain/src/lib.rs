//! Domain layer for dx-panel
//!
//! This crate contains the core entities and value objects of the
//! diagnostic deliberation: patient input, the panelist roster, the
//! deliberation stages, and the structured records the panelists
//! exchange. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Panel Deliberation
//!
//! A deliberation is one pass of a virtual medical panel over a patient
//! case. Specialist panelists each contribute a structured artifact
//! (hypotheses, test requests, critiques), and the session ends in a
//! single committed [`Action`]: a diagnosis or a test request.
//!
//! ## Certainty Short-Circuit
//!
//! When the leading hypothesis is already near-certain, the panel commits
//! to it immediately instead of spending further workup. The cutoff is
//! [`CERTAINTY_THRESHOLD`](deliberation::CERTAINTY_THRESHOLD).

pub mod core;
pub mod deliberation;

// Re-export commonly used types
pub use core::{model::Model, patient::PatientInfo};
pub use deliberation::{
    stage::{Panelist, Stage},
    value_objects::{
        Action, ChallengerCritique, DebateResults, Diagnosis, FinalDecision, QualityCheck,
        StewardshipAdvice, TestRequest,
    },
    CERTAINTY_THRESHOLD,
};
