//! Console output formatter for the final decision

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use panel_domain::{Action, FinalDecision};

/// Formats the final decision for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete decision with header, action card, and summary
    pub fn format(decision: &FinalDecision) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Panel Decision"));
        output.push('\n');

        output.push_str(&Self::action_card(&decision.action));

        output.push_str(&format!("\n{}\n", "Consensus Summary:".cyan().bold()));
        output.push_str(&format!("{}\n", decision.consensus_summary));

        output.push_str(&Self::footer());
        output
    }

    /// Format only the chosen action (concise output)
    pub fn format_action_only(decision: &FinalDecision) -> String {
        match &decision.action {
            Action::Diagnosis(d) => format!(
                "{} {} ({:.0}%)",
                "Diagnosis:".bold(),
                d.condition,
                d.probability * 100.0
            ),
            Action::TestRequest(t) => format!("{} {}", "Order test:".bold(), t.test_name),
        }
    }

    /// Format as JSON
    pub fn format_json(decision: &FinalDecision) -> String {
        serde_json::to_string_pretty(decision).unwrap_or_else(|_| "{}".to_string())
    }

    fn action_card(action: &Action) -> String {
        match action {
            Action::Diagnosis(d) => format!(
                "{}\n  {} {}\n  {} {:.0}%\n  {} {}\n",
                "Action: Commit to diagnosis".green().bold(),
                "Condition:".bold(),
                d.condition,
                "Probability:".bold(),
                d.probability * 100.0,
                "Reasoning:".bold(),
                d.reasoning
            ),
            Action::TestRequest(t) => format!(
                "{}\n  {} {}\n  {} {}\n",
                "Action: Order a test".yellow().bold(),
                "Test:".bold(),
                t.test_name,
                "Reasoning:".bold(),
                t.reasoning
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, decision: &FinalDecision) -> String {
        Self::format(decision)
    }

    fn format_action_only(&self, decision: &FinalDecision) -> String {
        Self::format_action_only(decision)
    }

    fn format_json(&self, decision: &FinalDecision) -> String {
        Self::format_json(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::{Diagnosis, TestRequest};

    fn diagnosis_decision() -> FinalDecision {
        FinalDecision::new(
            Action::Diagnosis(Diagnosis::new("Pneumonia", 0.97, "classic presentation")),
            "Certainty reached without further workup.",
        )
    }

    #[test]
    fn test_full_format_contains_all_sections() {
        let output = ConsoleFormatter::format(&diagnosis_decision());
        assert!(output.contains("Panel Decision"));
        assert!(output.contains("Pneumonia"));
        assert!(output.contains("97%"));
        assert!(output.contains("Certainty reached"));
    }

    #[test]
    fn test_action_only_for_test_request() {
        let decision = FinalDecision::new(
            Action::TestRequest(TestRequest::new("Chest X-ray", "confirm consolidation")),
            "summary",
        );
        let output = ConsoleFormatter::format_action_only(&decision);
        assert!(output.contains("Chest X-ray"));
        assert!(!output.contains("summary"));
    }

    #[test]
    fn test_json_format_roundtrips() {
        let output = ConsoleFormatter::format_json(&diagnosis_decision());
        let parsed: FinalDecision = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, diagnosis_decision());
    }
}
