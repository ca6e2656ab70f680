//! Deliberation stages and panelist roster

use serde::{Deserialize, Serialize};

/// Stage of a deliberation session
///
/// Stages execute in declaration order; a session either runs them all or
/// short-circuits out of `Hypothesize` when certainty is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Generate ranked diagnosis candidates from the patient case
    Hypothesize,
    /// Propose discriminating diagnostic tests
    TestSelection,
    /// Concurrent critique of the current plan by three panelists
    Debate,
    /// Synthesize everything into a single committed action
    Consensus,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Hypothesize => "hypothesize",
            Stage::TestSelection => "test_selection",
            Stage::Debate => "debate",
            Stage::Consensus => "consensus",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Hypothesize => "Hypothesis",
            Stage::TestSelection => "Test Selection",
            Stage::Debate => "Debate",
            Stage::Consensus => "Consensus",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The specialist personas of the virtual panel (Value Object)
///
/// Each panelist is one sub-agent call with its own prompt template.
/// `Challenger`, `Stewardship`, and `Checklist` together form the debate
/// stage; the others each back one stage alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Panelist {
    Hypothesis,
    TestChooser,
    Challenger,
    Stewardship,
    Checklist,
    DecisionMaker,
}

impl Panelist {
    /// Name of the prompt template backing this panelist
    pub fn template_name(&self) -> &'static str {
        match self {
            Panelist::Hypothesis => "dr_hypothesis",
            Panelist::TestChooser => "dr_test_chooser",
            Panelist::Challenger => "dr_challenger",
            Panelist::Stewardship => "dr_stewardship",
            Panelist::Checklist => "dr_checklist",
            Panelist::DecisionMaker => "dr_decision_maker",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Panelist::Hypothesis => "Dr. Hypothesis",
            Panelist::TestChooser => "Dr. Test Chooser",
            Panelist::Challenger => "Dr. Challenger",
            Panelist::Stewardship => "Dr. Stewardship",
            Panelist::Checklist => "Dr. Checklist",
            Panelist::DecisionMaker => "Consensus Panel",
        }
    }

    /// The debate-stage trio, in the order their results are assembled
    pub fn debate_panel() -> [Panelist; 3] {
        [
            Panelist::Challenger,
            Panelist::Stewardship,
            Panelist::Checklist,
        ]
    }
}

impl std::fmt::Display for Panelist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_names_are_unique() {
        let names = [
            Panelist::Hypothesis,
            Panelist::TestChooser,
            Panelist::Challenger,
            Panelist::Stewardship,
            Panelist::Checklist,
            Panelist::DecisionMaker,
        ]
        .map(|p| p.template_name());
        let mut deduped = names.to_vec();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn test_debate_panel_order() {
        assert_eq!(
            Panelist::debate_panel(),
            [
                Panelist::Challenger,
                Panelist::Stewardship,
                Panelist::Checklist
            ]
        );
    }
}
