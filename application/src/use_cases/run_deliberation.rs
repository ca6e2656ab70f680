//! Run Deliberation use case
//!
//! Drives one end-to-end diagnostic session: hypothesize, then either
//! short-circuit on certainty or continue through test selection, debate,
//! and consensus. The stage sequence is fixed; any stage failure aborts
//! the session immediately with no partial output.

use crate::ports::agent_invoker::{
    invoke_as, AgentInvoker, AgentRequest, InvokeError, ToolCapability, TypeDescriptor,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::session_logger::{NoSessionLogger, SessionEvent, SessionLogger};
use crate::ports::template_renderer::{TemplateContext, TemplateError, TemplateRenderer};
use crate::use_cases::debate::DebateCoordinator;
use panel_domain::{
    Action, DebateResults, Diagnosis, FinalDecision, Model, Panelist, PatientInfo, Stage,
    TestRequest, CERTAINTY_THRESHOLD,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during a deliberation session
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("hypothesis stage returned no candidates")]
    EmptyHypotheses,

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("model invocation error: {0}")]
    Invocation(#[from] InvokeError),
}

/// Input for the RunDeliberation use case
#[derive(Debug, Clone)]
pub struct RunDeliberationInput {
    /// The patient case to deliberate over
    pub patient: PatientInfo,
    /// Model every panelist runs on
    pub model: Model,
}

impl RunDeliberationInput {
    pub fn new(patient: impl Into<PatientInfo>, model: Model) -> Self {
        Self {
            patient: patient.into(),
            model,
        }
    }
}

/// Use case for running one deliberation session
pub struct RunDeliberationUseCase<A: AgentInvoker + 'static, R: TemplateRenderer + 'static> {
    invoker: Arc<A>,
    templates: Arc<R>,
    logger: Arc<dyn SessionLogger>,
}

impl<A: AgentInvoker + 'static, R: TemplateRenderer + 'static> RunDeliberationUseCase<A, R> {
    pub fn new(invoker: Arc<A>, templates: Arc<R>) -> Self {
        Self {
            invoker,
            templates,
            logger: Arc::new(NoSessionLogger),
        }
    }

    /// Attach a session transcript logger
    pub fn with_session_logger(mut self, logger: Arc<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunDeliberationInput,
    ) -> Result<FinalDecision, OrchestrationError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunDeliberationInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<FinalDecision, OrchestrationError> {
        let patient = &input.patient;
        let model = &input.model;

        info!("Starting deliberation on model {}", model);

        // Stage 1: Hypothesize
        let hypotheses = self.stage_hypothesize(patient, model, progress).await?;

        let top = hypotheses
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
            .ok_or(OrchestrationError::EmptyHypotheses)?;

        // Certainty short-circuit: commit to the leading hypothesis and
        // skip the entire workup. The comparison is inclusive.
        if top.probability >= CERTAINTY_THRESHOLD {
            info!(
                "Certainty threshold met by {} (p={:.2}); skipping workup",
                top.condition, top.probability
            );
            let summary = format!(
                "Certainty reached without further workup: committed to {} at {:.0}% estimated probability.",
                top.condition,
                top.probability * 100.0
            );
            let decision = FinalDecision::new(Action::Diagnosis(top.clone()), summary);
            self.logger.log(SessionEvent::new(
                "certainty_short_circuit",
                json!({
                    "condition": top.condition,
                    "probability": top.probability,
                }),
            ));
            self.log_decision(&decision);
            return Ok(decision);
        }

        // Stage 2: Request Tests
        let test_requests = self
            .stage_request_tests(patient, &hypotheses, model, progress)
            .await?;

        // Stage 3: Debate (concurrent fan-out, joined atomically)
        let debate = DebateCoordinator::new(
            self.invoker.as_ref(),
            self.templates.as_ref(),
            model,
            &hypotheses,
            &test_requests,
            progress,
        )
        .run()
        .await?;
        self.logger.log(SessionEvent::new(
            "debate_completed",
            json!({
                "identified_bias": debate.challenger_critique.identified_bias,
                "approved_tests": debate.approved_tests(),
                "total_advice": debate.stewardship_advice.len(),
                "consistent_checks": debate.consistent_checks(),
                "total_checks": debate.quality_checks.len(),
            }),
        ));

        // Stage 4: Reach Consensus. The action is the consensus stage's
        // output verbatim, never assembled here.
        let action = self
            .stage_reach_consensus(patient, &hypotheses, &test_requests, &debate, model, progress)
            .await?;

        let decision = FinalDecision::new(action, Self::summarize(&debate));
        self.log_decision(&decision);
        Ok(decision)
    }

    async fn stage_hypothesize(
        &self,
        patient: &PatientInfo,
        model: &Model,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<Diagnosis>, OrchestrationError> {
        progress.on_stage_start(&Stage::Hypothesize, 1);

        let context = TemplateContext::new().with("patient_info", patient.content());
        let prompt = self
            .templates
            .render(Panelist::Hypothesis.template_name(), &context)?;
        info!("Running {}...", Panelist::Hypothesis);

        let request = AgentRequest::new(
            model.clone(),
            prompt,
            TypeDescriptor::of::<Vec<Diagnosis>>("diagnosis_list"),
        )
        .with_tools(vec![ToolCapability::WebSearch]);

        match invoke_as::<Vec<Diagnosis>>(self.invoker.as_ref(), request).await {
            Ok(hypotheses) => {
                progress.on_task_complete(&Stage::Hypothesize, &Panelist::Hypothesis, true);
                progress.on_stage_complete(&Stage::Hypothesize);
                info!(
                    "{} differential: {:?}",
                    Panelist::Hypothesis,
                    hypotheses
                        .iter()
                        .map(|d| d.condition.as_str())
                        .collect::<Vec<_>>()
                );
                self.logger.log(SessionEvent::new(
                    "hypotheses_generated",
                    json!({
                        "count": hypotheses.len(),
                        "conditions": hypotheses
                            .iter()
                            .map(|d| d.condition.clone())
                            .collect::<Vec<_>>(),
                    }),
                ));
                Ok(hypotheses)
            }
            Err(e) => {
                warn!("{} failed: {}", Panelist::Hypothesis, e);
                progress.on_task_complete(&Stage::Hypothesize, &Panelist::Hypothesis, false);
                Err(e.into())
            }
        }
    }

    async fn stage_request_tests(
        &self,
        patient: &PatientInfo,
        hypotheses: &[Diagnosis],
        model: &Model,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<TestRequest>, OrchestrationError> {
        progress.on_stage_start(&Stage::TestSelection, 1);

        let context = TemplateContext::new()
            .with("patient_info", patient.content())
            .with("hypotheses", hypotheses);
        let prompt = self
            .templates
            .render(Panelist::TestChooser.template_name(), &context)?;
        info!("Running {}...", Panelist::TestChooser);

        let request = AgentRequest::new(
            model.clone(),
            prompt,
            TypeDescriptor::of::<Vec<TestRequest>>("test_request_list"),
        );

        match invoke_as::<Vec<TestRequest>>(self.invoker.as_ref(), request).await {
            Ok(test_requests) => {
                progress.on_task_complete(&Stage::TestSelection, &Panelist::TestChooser, true);
                progress.on_stage_complete(&Stage::TestSelection);
                info!(
                    "{} recommends: {:?}",
                    Panelist::TestChooser,
                    test_requests
                        .iter()
                        .map(|t| t.test_name.as_str())
                        .collect::<Vec<_>>()
                );
                self.logger.log(SessionEvent::new(
                    "tests_requested",
                    json!({
                        "count": test_requests.len(),
                        "tests": test_requests
                            .iter()
                            .map(|t| t.test_name.clone())
                            .collect::<Vec<_>>(),
                    }),
                ));
                Ok(test_requests)
            }
            Err(e) => {
                warn!("{} failed: {}", Panelist::TestChooser, e);
                progress.on_task_complete(&Stage::TestSelection, &Panelist::TestChooser, false);
                Err(e.into())
            }
        }
    }

    async fn stage_reach_consensus(
        &self,
        patient: &PatientInfo,
        hypotheses: &[Diagnosis],
        test_requests: &[TestRequest],
        debate: &DebateResults,
        model: &Model,
        progress: &dyn ProgressNotifier,
    ) -> Result<Action, OrchestrationError> {
        progress.on_stage_start(&Stage::Consensus, 1);

        let context = TemplateContext::new()
            .with("patient_info", patient.content())
            .with("hypotheses", hypotheses)
            .with("test_requests", test_requests)
            .with("challenger_critique", &debate.challenger_critique)
            .with("stewardship_advice", &debate.stewardship_advice)
            .with("quality_checks", &debate.quality_checks);
        let prompt = self
            .templates
            .render(Panelist::DecisionMaker.template_name(), &context)?;
        info!("Running {} to make the final decision...", Panelist::DecisionMaker);

        let request = AgentRequest::new(
            model.clone(),
            prompt,
            TypeDescriptor::of::<Action>("consensus_action"),
        );

        match invoke_as::<Action>(self.invoker.as_ref(), request).await {
            Ok(action) => {
                progress.on_task_complete(&Stage::Consensus, &Panelist::DecisionMaker, true);
                progress.on_stage_complete(&Stage::Consensus);
                info!("{} decided on action: {}", Panelist::DecisionMaker, action.kind());
                self.logger.log(SessionEvent::new(
                    "consensus_reached",
                    json!({ "action_type": action.kind() }),
                ));
                Ok(action)
            }
            Err(e) => {
                warn!("{} failed: {}", Panelist::DecisionMaker, e);
                progress.on_task_complete(&Stage::Consensus, &Panelist::DecisionMaker, false);
                Err(e.into())
            }
        }
    }

    /// Narrative summary of a fully deliberated session
    fn summarize(debate: &DebateResults) -> String {
        format!(
            "Panel deliberation complete. {} flagged {} as the dominant bias; \
             {} approved {}/{} proposed tests; {}/{} consistency checks passed.",
            Panelist::Challenger,
            debate.challenger_critique.identified_bias,
            Panelist::Stewardship,
            debate.approved_tests(),
            debate.stewardship_advice.len(),
            debate.consistent_checks(),
            debate.quality_checks.len(),
        )
    }

    fn log_decision(&self, decision: &FinalDecision) {
        self.logger.log(SessionEvent::new(
            "decision",
            serde_json::to_value(decision).unwrap_or_default(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::support::{
        challenger_json, checklist_json, consensus_diagnosis_json, consensus_test_request_json,
        hypotheses_json, stewardship_json, tests_json, FailingTemplates, MockInvoker,
        StubTemplates,
    };
    use std::time::Duration;

    fn use_case(invoker: Arc<MockInvoker>) -> RunDeliberationUseCase<MockInvoker, StubTemplates> {
        RunDeliberationUseCase::new(invoker, Arc::new(StubTemplates))
    }

    fn input() -> RunDeliberationInput {
        RunDeliberationInput::new("fever, cough", Model::default())
    }

    #[tokio::test]
    async fn test_certainty_short_circuit_skips_workup() {
        let invoker = Arc::new(
            MockInvoker::new()
                .respond("diagnosis_list", hypotheses_json(&[("Pneumonia", 0.97)])),
        );
        let decision = use_case(Arc::clone(&invoker)).execute(input()).await.unwrap();

        // No downstream stage was ever invoked
        assert_eq!(invoker.calls(), vec!["diagnosis_list"]);

        let diagnosis = decision.action.as_diagnosis().unwrap();
        assert_eq!(diagnosis.condition, "Pneumonia");
        assert_eq!(diagnosis.probability, 0.97);
        assert!(decision.consensus_summary.contains("without further workup"));
    }

    #[tokio::test]
    async fn test_certainty_threshold_is_inclusive() {
        let invoker = Arc::new(
            MockInvoker::new()
                .respond("diagnosis_list", hypotheses_json(&[("Influenza", 0.95)])),
        );
        let decision = use_case(Arc::clone(&invoker)).execute(input()).await.unwrap();

        assert_eq!(invoker.calls(), vec!["diagnosis_list"]);
        assert_eq!(decision.action.as_diagnosis().unwrap().condition, "Influenza");
    }

    #[tokio::test]
    async fn test_below_threshold_runs_all_stages_in_order() {
        let invoker = Arc::new(
            MockInvoker::new()
                .respond(
                    "diagnosis_list",
                    hypotheses_json(&[("Pneumonia", 0.6), ("Bronchitis", 0.3)]),
                )
                .respond("test_request_list", tests_json(&["Chest X-ray"]))
                .respond("challenger_critique", challenger_json("anchoring"))
                .respond("stewardship_advice_list", stewardship_json(&[("Chest X-ray", true)]))
                .respond("quality_check_list", checklist_json(&[("linkage", true)]))
                .respond("consensus_action", consensus_test_request_json("Chest X-ray")),
        );
        let decision = use_case(Arc::clone(&invoker)).execute(input()).await.unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], "diagnosis_list");
        assert_eq!(calls[1], "test_request_list");
        // The debate trio completes in arbitrary order, always before consensus
        let mut debate_calls = calls[2..5].to_vec();
        debate_calls.sort_unstable();
        assert_eq!(
            debate_calls,
            vec!["challenger_critique", "quality_check_list", "stewardship_advice_list"]
        );
        assert_eq!(calls[5], "consensus_action");

        assert_eq!(
            decision.action.as_test_request().unwrap().test_name,
            "Chest X-ray"
        );
        assert!(decision.consensus_summary.contains("anchoring"));
    }

    #[tokio::test]
    async fn test_consensus_action_passed_through_verbatim() {
        let invoker = Arc::new(
            MockInvoker::new()
                .respond("diagnosis_list", hypotheses_json(&[("Pneumonia", 0.6)]))
                .respond("test_request_list", tests_json(&["Sputum culture"]))
                .respond("challenger_critique", challenger_json("availability"))
                .respond("stewardship_advice_list", stewardship_json(&[("Sputum culture", false)]))
                .respond("quality_check_list", checklist_json(&[("coverage", true)]))
                .respond(
                    "consensus_action",
                    consensus_diagnosis_json("Atypical pneumonia", 0.7),
                ),
        );
        let decision = use_case(invoker).execute(input()).await.unwrap();

        let diagnosis = decision.action.as_diagnosis().unwrap();
        assert_eq!(diagnosis.condition, "Atypical pneumonia");
        assert_eq!(diagnosis.probability, 0.7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debate_sub_call_failure_aborts_session() {
        // Stewardship hits a rate limit while its siblings succeed
        let invoker = Arc::new(
            MockInvoker::new()
                .respond("diagnosis_list", hypotheses_json(&[("Pneumonia", 0.6)]))
                .respond("test_request_list", tests_json(&["Chest X-ray"]))
                .respond("challenger_critique", challenger_json("anchoring"))
                .rate_limited("stewardship_advice_list")
                .respond("quality_check_list", checklist_json(&[("linkage", true)]))
                .delay("challenger_critique", Duration::from_millis(5))
                .delay("quality_check_list", Duration::from_millis(5)),
        );
        let result = use_case(Arc::clone(&invoker)).execute(input()).await;

        assert!(matches!(
            result,
            Err(OrchestrationError::Invocation(InvokeError::RateLimited(_)))
        ));
        // The session never reached consensus
        assert!(!invoker.calls().contains(&"consensus_action"));
    }

    #[tokio::test]
    async fn test_empty_hypothesis_list_is_explicit_error() {
        let invoker = Arc::new(MockInvoker::new().respond("diagnosis_list", serde_json::json!([])));
        let result = use_case(Arc::clone(&invoker)).execute(input()).await;

        assert!(matches!(result, Err(OrchestrationError::EmptyHypotheses)));
        assert_eq!(invoker.calls(), vec!["diagnosis_list"]);
    }

    #[tokio::test]
    async fn test_malformed_stage_output_is_validation_error() {
        let invoker = Arc::new(
            MockInvoker::new().respond("diagnosis_list", serde_json::json!({"not": "a list"})),
        );
        let result = use_case(invoker).execute(input()).await;

        assert!(matches!(
            result,
            Err(OrchestrationError::Invocation(InvokeError::OutputValidation(_)))
        ));
    }

    #[tokio::test]
    async fn test_template_failure_aborts_before_invocation() {
        let invoker = Arc::new(
            MockInvoker::new().respond("diagnosis_list", hypotheses_json(&[("Pneumonia", 0.6)])),
        );
        let use_case = RunDeliberationUseCase::new(
            Arc::clone(&invoker),
            Arc::new(FailingTemplates::not_found("dr_test_chooser")),
        );
        let result = use_case.execute(input()).await;

        assert!(matches!(
            result,
            Err(OrchestrationError::Template(TemplateError::NotFound(_)))
        ));
        // Only the hypothesis stage ever reached the model
        assert_eq!(invoker.calls(), vec!["diagnosis_list"]);
    }
}
