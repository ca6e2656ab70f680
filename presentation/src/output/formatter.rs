//! Output formatter abstraction

use panel_domain::FinalDecision;

/// Formats a final decision for display
pub trait OutputFormatter {
    /// Full formatted output with all sections
    fn format(&self, decision: &FinalDecision) -> String;

    /// Only the chosen action
    fn format_action_only(&self, decision: &FinalDecision) -> String;

    /// JSON output
    fn format_json(&self, decision: &FinalDecision) -> String;
}
