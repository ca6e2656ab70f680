//! Built-in prompt templates for the six panelists.
//!
//! Implements the `TemplateRenderer` port with templates kept as code.
//! Structured records from earlier stages are embedded as pretty-printed
//! JSON blocks; output shape is enforced separately by each stage's
//! schema, so the prompts focus on role and reasoning instructions.

use panel_application::{TemplateContext, TemplateError, TemplateRenderer};
use serde_json::Value;

/// The built-in template library
#[derive(Debug, Default)]
pub struct PromptLibrary;

impl PromptLibrary {
    pub fn new() -> Self {
        Self
    }

    fn string_var<'a>(
        context: &'a TemplateContext,
        template: &str,
        key: &str,
    ) -> Result<&'a str, TemplateError> {
        context.require(template, key)?.as_str().ok_or_else(|| {
            TemplateError::Render(format!(
                "variable `{}` for template `{}` is not a string",
                key, template
            ))
        })
    }

    fn json_var(
        context: &TemplateContext,
        template: &str,
        key: &str,
    ) -> Result<String, TemplateError> {
        let value = context.require(template, key)?;
        Ok(Self::pretty(value))
    }

    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl TemplateRenderer for PromptLibrary {
    fn render(&self, name: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        match name {
            "dr_hypothesis" => {
                let patient_info = Self::string_var(context, name, "patient_info")?;
                Ok(format!(
                    r#"You are Dr. Hypothesis, an expert diagnostician generating a differential diagnosis.

Patient information:
{}

Generate a ranked list of the top 3 most likely diagnoses for this patient.
For each, estimate its probability (between 0 and 1) and justify it from the
patient data. You may search the web for epidemiology and presentation
patterns before committing to probabilities. Rank from most to least likely."#,
                    patient_info
                ))
            }
            "dr_test_chooser" => {
                let patient_info = Self::string_var(context, name, "patient_info")?;
                let hypotheses = Self::json_var(context, name, "hypotheses")?;
                Ok(format!(
                    r#"You are Dr. Test Chooser, selecting the diagnostic workup for a medical panel.

Patient information:
{}

Current differential diagnosis:
{}

Propose up to 3 diagnostic tests. Choose tests that maximally discriminate
between the leading hypotheses: prefer one test that separates two
hypotheses over two tests that each confirm one. Explain, for each test,
which hypotheses it separates and how."#,
                    patient_info, hypotheses
                ))
            }
            "dr_challenger" => {
                let hypotheses = Self::json_var(context, name, "hypotheses")?;
                let test_requests = Self::json_var(context, name, "test_requests")?;
                Ok(format!(
                    r#"You are Dr. Challenger, the devil's advocate of a medical panel.

Current differential diagnosis:
{}

Proposed tests:
{}

Attack this plan. Identify the primary cognitive bias in the panel's
reasoning (e.g. anchoring, availability, premature closure), cite the
evidence from the case that contradicts the leading hypothesis, and
suggest one test specifically designed to falsify it."#,
                    hypotheses, test_requests
                ))
            }
            "dr_stewardship" => {
                let test_requests = Self::json_var(context, name, "test_requests")?;
                Ok(format!(
                    r#"You are Dr. Stewardship, guarding cost-effectiveness and appropriateness of care.

Proposed tests:
{}

For each proposed test, decide whether to approve or veto it from a
cost/benefit perspective. You may search the web for typical costs,
invasiveness, and guideline recommendations. Veto tests whose expected
information gain does not justify their burden, and justify every verdict."#,
                    test_requests
                ))
            }
            "dr_checklist" => {
                let hypotheses = Self::json_var(context, name, "hypotheses")?;
                let test_requests = Self::json_var(context, name, "test_requests")?;
                Ok(format!(
                    r#"You are Dr. Checklist, the quality-control reviewer of a medical panel.

Current differential diagnosis:
{}

Proposed tests:
{}

Run internal-consistency checks over this plan: do the probabilities make
sense together, does every proposed test link to a stated hypothesis, and
is any leading hypothesis left untested? Report each check with a pass or
fail verdict and a short comment."#,
                    hypotheses, test_requests
                ))
            }
            "dr_decision_maker" => {
                let patient_info = Self::string_var(context, name, "patient_info")?;
                let hypotheses = Self::json_var(context, name, "hypotheses")?;
                let test_requests = Self::json_var(context, name, "test_requests")?;
                let challenger_critique = Self::json_var(context, name, "challenger_critique")?;
                let stewardship_advice = Self::json_var(context, name, "stewardship_advice")?;
                let quality_checks = Self::json_var(context, name, "quality_checks")?;
                Ok(format!(
                    r#"You are the consensus panel synthesizing a medical deliberation into one action.

Patient information:
{}

Differential diagnosis:
{}

Proposed tests:
{}

Challenger critique:
{}

Stewardship advice:
{}

Quality checks:
{}

Weigh everything above and choose exactly one next action: either commit
to a diagnosis now, or order the single most informative approved test.
Do not hedge between the two. Justify the choice against the critique and
the stewardship verdicts."#,
                    patient_info,
                    hypotheses,
                    test_requests,
                    challenger_critique,
                    stewardship_advice,
                    quality_checks
                ))
            }
            other => Err(TemplateError::NotFound(other.to_string())),
        }
    }
}
