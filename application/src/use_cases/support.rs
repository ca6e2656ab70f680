//! Shared test doubles for use-case tests: a scriptable agent invoker and
//! stub template renderers.

use crate::ports::agent_invoker::{AgentInvoker, AgentRequest, InvokeError};
use crate::ports::template_renderer::{TemplateContext, TemplateError, TemplateRenderer};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

enum Scripted {
    Value(Value),
    RateLimited,
}

/// Agent invoker scripted per output contract name.
///
/// Records contract names in completion order (after any configured
/// delay), so tests can assert both invocation sets and relative timing.
pub(crate) struct MockInvoker {
    script: HashMap<&'static str, Scripted>,
    delays: HashMap<&'static str, Duration>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockInvoker {
    pub(crate) fn new() -> Self {
        Self {
            script: HashMap::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond(mut self, contract: &'static str, value: Value) -> Self {
        self.script.insert(contract, Scripted::Value(value));
        self
    }

    pub(crate) fn rate_limited(mut self, contract: &'static str) -> Self {
        self.script.insert(contract, Scripted::RateLimited);
        self
    }

    pub(crate) fn delay(mut self, contract: &'static str, delay: Duration) -> Self {
        self.delays.insert(contract, delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentInvoker for MockInvoker {
    async fn invoke(&self, request: AgentRequest) -> Result<Value, InvokeError> {
        let contract = request.output.name;
        if let Some(delay) = self.delays.get(contract) {
            tokio::time::sleep(*delay).await;
        }
        self.calls.lock().unwrap().push(contract);
        match self.script.get(contract) {
            Some(Scripted::Value(v)) => Ok(v.clone()),
            Some(Scripted::RateLimited) => Err(InvokeError::RateLimited("429".to_string())),
            None => Err(InvokeError::ModelCall(format!(
                "unscripted contract: {}",
                contract
            ))),
        }
    }
}

/// Template renderer that always succeeds with a synthetic prompt
pub(crate) struct StubTemplates;

impl TemplateRenderer for StubTemplates {
    fn render(&self, name: &str, _context: &TemplateContext) -> Result<String, TemplateError> {
        Ok(format!("prompt for {}", name))
    }
}

/// Template renderer that fails for one configured template name
pub(crate) struct FailingTemplates {
    fail_on: &'static str,
}

impl FailingTemplates {
    pub(crate) fn not_found(fail_on: &'static str) -> Self {
        Self { fail_on }
    }
}

impl TemplateRenderer for FailingTemplates {
    fn render(&self, name: &str, _context: &TemplateContext) -> Result<String, TemplateError> {
        if name == self.fail_on {
            Err(TemplateError::NotFound(name.to_string()))
        } else {
            Ok(format!("prompt for {}", name))
        }
    }
}

pub(crate) fn hypotheses_json(candidates: &[(&str, f64)]) -> Value {
    Value::Array(
        candidates
            .iter()
            .map(|(condition, probability)| {
                json!({
                    "condition": condition,
                    "probability": probability,
                    "reasoning": format!("suggested by presentation: {}", condition),
                })
            })
            .collect(),
    )
}

pub(crate) fn tests_json(names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .map(|name| {
                json!({
                    "test_name": name,
                    "reasoning": format!("{} discriminates the leading hypotheses", name),
                })
            })
            .collect(),
    )
}

pub(crate) fn challenger_json(bias: &str) -> Value {
    json!({
        "identified_bias": bias,
        "contradictory_evidence": "normal oxygen saturation at rest",
        "falsification_test_suggestion": {
            "test_name": "Procalcitonin",
            "reasoning": "low value would falsify a bacterial etiology",
        },
    })
}

pub(crate) fn stewardship_json(verdicts: &[(&str, bool)]) -> Value {
    Value::Array(
        verdicts
            .iter()
            .map(|(test_name, approved)| {
                json!({
                    "test_name": test_name,
                    "is_approved": approved,
                    "justification": if *approved { "high yield for cost" } else { "cost without discrimination" },
                })
            })
            .collect(),
    )
}

pub(crate) fn checklist_json(checks: &[(&str, bool)]) -> Value {
    Value::Array(
        checks
            .iter()
            .map(|(check_name, consistent)| {
                json!({
                    "check_name": check_name,
                    "is_consistent": consistent,
                    "comment": if *consistent { "no issues" } else { "inconsistency found" },
                })
            })
            .collect(),
    )
}

pub(crate) fn consensus_test_request_json(test_name: &str) -> Value {
    json!({
        "action_type": "test_request",
        "test_name": test_name,
        "reasoning": "highest information gain before committing",
    })
}

pub(crate) fn consensus_diagnosis_json(condition: &str, probability: f64) -> Value {
    json!({
        "action_type": "diagnosis",
        "condition": condition,
        "probability": probability,
        "reasoning": "debate resolved in favor of the leading hypothesis",
    })
}
