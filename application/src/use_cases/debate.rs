//! Debate fan-out coordinator
//!
//! Runs the three debate panelists concurrently over the same
//! hypotheses/test-requests context and joins their outputs into one
//! [`DebateResults`]. The join is atomic: the first sub-call failure
//! fails the stage as a unit, and successful sibling results are
//! discarded rather than assembled into a partial result.

use crate::ports::agent_invoker::{
    invoke_as, AgentInvoker, AgentRequest, InvokeError, ToolCapability, TypeDescriptor,
};
use crate::ports::progress::ProgressNotifier;
use crate::ports::template_renderer::{TemplateContext, TemplateRenderer};
use crate::use_cases::run_deliberation::OrchestrationError;
use panel_domain::{
    ChallengerCritique, DebateResults, Diagnosis, Panelist, QualityCheck, Stage,
    StewardshipAdvice, TestRequest,
};
use tracing::{info, warn};

/// Coordinates the concurrent debate stage for one session
pub(crate) struct DebateCoordinator<'a, A, R> {
    invoker: &'a A,
    templates: &'a R,
    model: &'a panel_domain::Model,
    hypotheses: &'a [Diagnosis],
    test_requests: &'a [TestRequest],
    progress: &'a dyn ProgressNotifier,
}

impl<'a, A: AgentInvoker, R: TemplateRenderer> DebateCoordinator<'a, A, R> {
    pub(crate) fn new(
        invoker: &'a A,
        templates: &'a R,
        model: &'a panel_domain::Model,
        hypotheses: &'a [Diagnosis],
        test_requests: &'a [TestRequest],
        progress: &'a dyn ProgressNotifier,
    ) -> Self {
        Self {
            invoker,
            templates,
            model,
            hypotheses,
            test_requests,
            progress,
        }
    }

    /// Launch all three sub-calls together and wait for all of them.
    ///
    /// `try_join!` drops the remaining sub-futures as soon as one fails,
    /// so no partial [`DebateResults`] can ever be observed. The result
    /// sections are positional (challenger, stewardship, checklist) no
    /// matter which sub-call completed first.
    pub(crate) async fn run(&self) -> Result<DebateResults, OrchestrationError> {
        info!("Convening the debate panel...");
        self.progress
            .on_stage_start(&Stage::Debate, Panelist::debate_panel().len());

        let (critique, advice, checks) = tokio::try_join!(
            self.run_challenger(),
            self.run_stewardship(),
            self.run_checklist(),
        )?;

        info!(
            "{} found bias: {}",
            Panelist::Challenger,
            critique.identified_bias
        );
        info!(
            "{} approved {}/{} tests",
            Panelist::Stewardship,
            advice.iter().filter(|a| a.is_approved).count(),
            advice.len()
        );
        info!(
            "{} passed {}/{} checks",
            Panelist::Checklist,
            checks.iter().filter(|c| c.is_consistent).count(),
            checks.len()
        );

        self.progress.on_stage_complete(&Stage::Debate);
        Ok(DebateResults::new(critique, advice, checks))
    }

    async fn run_challenger(&self) -> Result<ChallengerCritique, OrchestrationError> {
        let context = TemplateContext::new()
            .with("hypotheses", self.hypotheses)
            .with("test_requests", self.test_requests);
        let prompt = self
            .templates
            .render(Panelist::Challenger.template_name(), &context)?;

        let request = AgentRequest::new(
            self.model.clone(),
            prompt,
            TypeDescriptor::of::<ChallengerCritique>("challenger_critique"),
        );
        self.finish(Panelist::Challenger, invoke_as(self.invoker, request).await)
    }

    async fn run_stewardship(&self) -> Result<Vec<StewardshipAdvice>, OrchestrationError> {
        let context = TemplateContext::new().with("test_requests", self.test_requests);
        let prompt = self
            .templates
            .render(Panelist::Stewardship.template_name(), &context)?;

        // Stewardship grounds cost/appropriateness judgments in the web
        let request = AgentRequest::new(
            self.model.clone(),
            prompt,
            TypeDescriptor::of::<Vec<StewardshipAdvice>>("stewardship_advice_list"),
        )
        .with_tools(vec![ToolCapability::WebSearch]);
        self.finish(Panelist::Stewardship, invoke_as(self.invoker, request).await)
    }

    async fn run_checklist(&self) -> Result<Vec<QualityCheck>, OrchestrationError> {
        let context = TemplateContext::new()
            .with("hypotheses", self.hypotheses)
            .with("test_requests", self.test_requests);
        let prompt = self
            .templates
            .render(Panelist::Checklist.template_name(), &context)?;

        let request = AgentRequest::new(
            self.model.clone(),
            prompt,
            TypeDescriptor::of::<Vec<QualityCheck>>("quality_check_list"),
        );
        self.finish(Panelist::Checklist, invoke_as(self.invoker, request).await)
    }

    fn finish<T>(
        &self,
        panelist: Panelist,
        result: Result<T, InvokeError>,
    ) -> Result<T, OrchestrationError> {
        match result {
            Ok(value) => {
                self.progress
                    .on_task_complete(&Stage::Debate, &panelist, true);
                Ok(value)
            }
            Err(e) => {
                warn!("{} failed: {}", panelist, e);
                self.progress
                    .on_task_complete(&Stage::Debate, &panelist, false);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::support::{
        challenger_json, checklist_json, stewardship_json, MockInvoker, StubTemplates,
    };
    use panel_domain::Model;
    use std::time::Duration;

    fn hypotheses() -> Vec<Diagnosis> {
        vec![
            Diagnosis::new("Pneumonia", 0.6, "fever and productive cough"),
            Diagnosis::new("Bronchitis", 0.3, "cough without consolidation signs"),
        ]
    }

    fn test_requests() -> Vec<TestRequest> {
        vec![TestRequest::new("Chest X-ray", "confirm consolidation")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_order_is_positional_regardless_of_completion_order() {
        // Reverse the completion order: checklist first, challenger last
        let invoker = MockInvoker::new()
            .respond("challenger_critique", challenger_json("anchoring"))
            .respond("stewardship_advice_list", stewardship_json(&[("Chest X-ray", true)]))
            .respond("quality_check_list", checklist_json(&[("linkage", true)]))
            .delay("challenger_critique", Duration::from_millis(30))
            .delay("stewardship_advice_list", Duration::from_millis(20))
            .delay("quality_check_list", Duration::from_millis(10));

        let templates = StubTemplates;
        let model = Model::default();
        let hypotheses = hypotheses();
        let test_requests = test_requests();
        let coordinator = DebateCoordinator::new(
            &invoker,
            &templates,
            &model,
            &hypotheses,
            &test_requests,
            &NoProgress,
        );
        let results = coordinator.run().await.unwrap();

        // Sub-calls really completed in reversed order
        assert_eq!(
            invoker.calls(),
            vec![
                "quality_check_list",
                "stewardship_advice_list",
                "challenger_critique"
            ]
        );

        // The joined result still sits in challenger, stewardship, checklist order
        assert_eq!(results.challenger_critique.identified_bias, "anchoring");
        assert_eq!(results.stewardship_advice[0].test_name, "Chest X-ray");
        assert_eq!(results.quality_checks[0].check_name, "linkage");
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failure_discards_sibling_results() {
        // Challenger fails fast; the slower siblings would have succeeded
        let invoker = MockInvoker::new()
            .respond("stewardship_advice_list", stewardship_json(&[("Chest X-ray", true)]))
            .respond("quality_check_list", checklist_json(&[("linkage", true)]))
            .delay("stewardship_advice_list", Duration::from_millis(50))
            .delay("quality_check_list", Duration::from_millis(50));

        let templates = StubTemplates;
        let model = Model::default();
        let hypotheses = hypotheses();
        let test_requests = test_requests();
        let coordinator = DebateCoordinator::new(
            &invoker,
            &templates,
            &model,
            &hypotheses,
            &test_requests,
            &NoProgress,
        );
        let result = coordinator.run().await;

        assert!(matches!(
            result,
            Err(OrchestrationError::Invocation(InvokeError::ModelCall(_)))
        ));
    }
}
