//! Deliberation value objects - immutable structured records exchanged
//! between stages.
//!
//! Each record is produced by exactly one sub-agent call and read-only
//! thereafter:
//! - [`Diagnosis`] - ranked hypothesis from the hypothesis stage
//! - [`TestRequest`] - proposed workup from the test-selection stage
//! - [`ChallengerCritique`], [`StewardshipAdvice`], [`QualityCheck`] -
//!   outputs of the three debate panelists
//! - [`DebateResults`] - the joined debate output, constructed only once
//!   all three panelists have succeeded
//! - [`Action`] / [`FinalDecision`] - the session's terminal output

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single diagnosis candidate with its estimated probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnosis {
    /// The medical condition being diagnosed
    pub condition: String,
    /// Estimated probability of this diagnosis
    #[schemars(range(min = 0.0, max = 1.0))]
    pub probability: f64,
    /// Justification for this diagnosis based on the patient data
    pub reasoning: String,
}

impl Diagnosis {
    pub fn new(condition: impl Into<String>, probability: f64, reasoning: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            probability,
            reasoning: reasoning.into(),
        }
    }
}

/// A proposed diagnostic test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestRequest {
    /// The specific name of the medical test
    pub test_name: String,
    /// Why this test maximally discriminates between the leading hypotheses
    pub reasoning: String,
}

impl TestRequest {
    pub fn new(test_name: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            reasoning: reasoning.into(),
        }
    }
}

/// Cost/appropriateness verdict on one proposed test
///
/// Keyed to a [`TestRequest`] by `test_name`; the pairing is conventional,
/// not structurally enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StewardshipAdvice {
    /// The test being evaluated
    pub test_name: String,
    /// Whether the test is approved from a cost perspective
    pub is_approved: bool,
    /// Reasoning for the approval or veto
    pub justification: String,
}

impl StewardshipAdvice {
    pub fn approve(test_name: impl Into<String>, justification: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            is_approved: true,
            justification: justification.into(),
        }
    }

    pub fn veto(test_name: impl Into<String>, justification: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            is_approved: false,
            justification: justification.into(),
        }
    }
}

/// The challenger panelist's critique of the current plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChallengerCritique {
    /// The primary cognitive bias identified (e.g. anchoring)
    pub identified_bias: String,
    /// Evidence from the case that contradicts the leading hypothesis
    pub contradictory_evidence: String,
    /// A test designed to falsify the leading diagnosis
    pub falsification_test_suggestion: TestRequest,
}

impl ChallengerCritique {
    pub fn new(
        identified_bias: impl Into<String>,
        contradictory_evidence: impl Into<String>,
        falsification_test_suggestion: TestRequest,
    ) -> Self {
        Self {
            identified_bias: identified_bias.into(),
            contradictory_evidence: contradictory_evidence.into(),
            falsification_test_suggestion,
        }
    }
}

/// One internal-consistency check from the checklist panelist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityCheck {
    /// The name of the quality check performed
    pub check_name: String,
    /// Whether the panel's reasoning is internally consistent
    pub is_consistent: bool,
    /// Comments on any identified inconsistencies
    pub comment: String,
}

impl QualityCheck {
    pub fn new(
        check_name: impl Into<String>,
        is_consistent: bool,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            is_consistent,
            comment: comment.into(),
        }
    }
}

/// Joined output of the debate stage
///
/// Constructed only after all three debate sub-calls succeed; the three
/// sections always sit in challenger, stewardship, checklist order no
/// matter which sub-call finished first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DebateResults {
    /// The critique from the challenger
    pub challenger_critique: ChallengerCritique,
    /// The advice from the stewardship panelist, one entry per test
    pub stewardship_advice: Vec<StewardshipAdvice>,
    /// The quality checks from the checklist panelist
    pub quality_checks: Vec<QualityCheck>,
}

impl DebateResults {
    pub fn new(
        challenger_critique: ChallengerCritique,
        stewardship_advice: Vec<StewardshipAdvice>,
        quality_checks: Vec<QualityCheck>,
    ) -> Self {
        Self {
            challenger_critique,
            stewardship_advice,
            quality_checks,
        }
    }

    /// Number of tests the stewardship panelist approved
    pub fn approved_tests(&self) -> usize {
        self.stewardship_advice
            .iter()
            .filter(|a| a.is_approved)
            .count()
    }

    /// Number of checks that passed
    pub fn consistent_checks(&self) -> usize {
        self.quality_checks.iter().filter(|c| c.is_consistent).count()
    }
}

/// The single action a session commits to
///
/// Tagged union of the two possible outcomes. Consumers discriminate by
/// the `action_type` tag, never by shape-guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum Action {
    /// Commit to a diagnosis
    Diagnosis(Diagnosis),
    /// Order one more test before committing
    TestRequest(TestRequest),
}

impl Action {
    /// The tag value for this variant
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Diagnosis(_) => "diagnosis",
            Action::TestRequest(_) => "test_request",
        }
    }

    pub fn as_diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Action::Diagnosis(d) => Some(d),
            Action::TestRequest(_) => None,
        }
    }

    pub fn as_test_request(&self) -> Option<&TestRequest> {
        match self {
            Action::Diagnosis(_) => None,
            Action::TestRequest(t) => Some(t),
        }
    }
}

/// Terminal output of a deliberation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinalDecision {
    /// The final chosen action after consensus
    pub action: Action,
    /// Summary of the deliberation and justification for the action
    pub consensus_summary: String,
}

impl FinalDecision {
    pub fn new(action: Action, consensus_summary: impl Into<String>) -> Self {
        Self {
            action,
            consensus_summary: consensus_summary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tag_discrimination() {
        let action = Action::Diagnosis(Diagnosis::new("Pneumonia", 0.97, "classic presentation"));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action_type"], "diagnosis");
        assert_eq!(json["condition"], "Pneumonia");

        let action = Action::TestRequest(TestRequest::new("Chest X-ray", "rule out consolidation"));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action_type"], "test_request");
        assert_eq!(json["test_name"], "Chest X-ray");
    }

    #[test]
    fn test_action_roundtrip() {
        let original = Action::TestRequest(TestRequest::new("D-dimer", "exclude PE"));
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
        assert!(parsed.as_test_request().is_some());
        assert!(parsed.as_diagnosis().is_none());
    }

    #[test]
    fn test_action_rejects_untagged_payload() {
        // Shape alone is not enough, the tag is required
        let result: Result<Action, _> = serde_json::from_str(
            r#"{"test_name": "CBC", "reasoning": "baseline"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debate_results_counters() {
        let results = DebateResults::new(
            ChallengerCritique::new(
                "anchoring",
                "afebrile on exam",
                TestRequest::new("Procalcitonin", "falsify bacterial etiology"),
            ),
            vec![
                StewardshipAdvice::approve("Chest X-ray", "cheap, high yield"),
                StewardshipAdvice::veto("Whole-body MRI", "cost without discrimination"),
            ],
            vec![
                QualityCheck::new("probabilities sum", true, "within tolerance"),
                QualityCheck::new("test-hypothesis linkage", false, "second test unlinked"),
            ],
        );
        assert_eq!(results.approved_tests(), 1);
        assert_eq!(results.consistent_checks(), 1);
    }
}
