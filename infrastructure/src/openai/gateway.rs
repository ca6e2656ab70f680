//! OpenAI-compatible gateway implementing the `AgentInvoker` port.
//!
//! One `invoke` is one schema-constrained chat completion, with a bounded
//! function-tool loop for `web_search`. Timeouts and transport policy
//! live here; the application layer only sees `InvokeError`.

use crate::openai::protocol::{
    ChatMessage, ChatRequest, ChatResponse, ResponseFormat, ToolCall, ToolDef,
};
use crate::tools::web_search;
use async_trait::async_trait;
use panel_application::{AgentInvoker, AgentRequest, InvokeError, ToolCapability};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default API endpoint, overridable via `OPENAI_BASE_URL`.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Tool calls allowed within a single invocation.
const DEFAULT_TOOL_BUDGET: usize = 8;

/// Errors constructing the gateway
#[derive(Error, Debug)]
pub enum GatewayConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Agent gateway over an OpenAI-compatible chat-completions backend
pub struct OpenAiAgentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    tool_budget: usize,
}

impl OpenAiAgentGateway {
    /// Build from `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, GatewayConfigError> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| GatewayConfigError::MissingApiKey)?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, base_url)
    }

    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GatewayConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayConfigError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            tool_budget: DEFAULT_TOOL_BUDGET,
        })
    }

    async fn execute_tool(&self, call: &ToolCall) -> String {
        if call.function.name != web_search::WEB_SEARCH {
            return format!("unknown tool: {}", call.function.name);
        }
        let query = serde_json::from_str::<Value>(&call.function.arguments)
            .ok()
            .and_then(|v| v["query"].as_str().map(str::to_string));
        let Some(query) = query else {
            return "web_search error: missing `query` argument".to_string();
        };
        debug!("web_search: {}", query);
        match web_search::search(&self.client, &query).await {
            Ok(hits) => web_search::render_hits(&query, &hits),
            Err(e) => format!("web_search error: {}", e),
        }
    }
}

#[async_trait]
impl AgentInvoker for OpenAiAgentGateway {
    async fn invoke(&self, request: AgentRequest) -> Result<Value, InvokeError> {
        let (schema, wrapped) = wrap_root_schema(request.output.schema.clone());
        let response_format = ResponseFormat::json_schema(request.output.name, schema);
        let tools = build_tools(&request.tools);
        let reasoning_effort = request.model.supports_reasoning_effort().then_some("low");

        let mut messages = vec![ChatMessage::user(&request.prompt)];
        let mut tool_calls_used = 0usize;

        loop {
            let body = ChatRequest {
                model: request.model.to_string(),
                messages: messages.clone(),
                tools: tools.clone(),
                response_format: response_format.clone(),
                reasoning_effort,
            };

            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| InvokeError::ModelCall(format!("request failed: {}", e)))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let detail = response.text().await.unwrap_or_default();
                return Err(InvokeError::RateLimited(detail));
            }
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(InvokeError::ModelCall(format!(
                    "API error ({}): {}",
                    status, detail
                )));
            }

            let chat: ChatResponse = response
                .json()
                .await
                .map_err(|e| InvokeError::OutputValidation(format!("malformed response: {}", e)))?;
            let Some(choice) = chat.choices.into_iter().next() else {
                return Err(InvokeError::OutputValidation(
                    "response contained no choices".to_string(),
                ));
            };
            let message = choice.message;

            // Tool round: execute every requested call and loop
            if let Some(calls) = message.tool_calls.clone().filter(|c| !c.is_empty()) {
                tool_calls_used += calls.len();
                if tool_calls_used > self.tool_budget {
                    return Err(InvokeError::ToolBudgetExhausted(self.tool_budget));
                }
                messages.push(message);
                for call in &calls {
                    let result = self.execute_tool(call).await;
                    messages.push(ChatMessage::tool(call.id.clone(), result));
                }
                continue;
            }

            let content = message.content.unwrap_or_default();
            let mut value: Value = serde_json::from_str(&content).map_err(|e| {
                InvokeError::OutputValidation(format!("model output is not valid JSON: {}", e))
            })?;

            if wrapped {
                return value
                    .get_mut("result")
                    .map(Value::take)
                    .ok_or_else(|| {
                        InvokeError::OutputValidation(
                            "wrapped output missing `result` field".to_string(),
                        )
                    });
            }
            return Ok(value);
        }
    }
}

/// Structured-output backends require an object at the schema root; wrap
/// non-object contracts (arrays, tagged unions) under a `result` property,
/// hoisting `definitions` so internal `$ref`s keep resolving.
fn wrap_root_schema(mut schema: Value) -> (Value, bool) {
    if schema.get("type").and_then(Value::as_str) == Some("object") {
        return (schema, false);
    }

    let mut definitions = None;
    if let Some(map) = schema.as_object_mut() {
        map.remove("$schema");
        definitions = map.remove("definitions");
    }

    let mut wrapped = json!({
        "type": "object",
        "properties": { "result": schema },
        "required": ["result"],
    });
    if let Some(defs) = definitions
        && let Some(map) = wrapped.as_object_mut()
    {
        map.insert("definitions".to_string(), defs);
    }
    (wrapped, true)
}

fn build_tools(capabilities: &[ToolCapability]) -> Option<Vec<ToolDef>> {
    let tools: Vec<ToolDef> = capabilities
        .iter()
        .map(|capability| match capability {
            ToolCapability::WebSearch => ToolDef::function(
                web_search::WEB_SEARCH,
                "Search the web for medical evidence. Returns titles, snippets, and URLs.",
                web_search::web_search_parameters(),
            ),
        })
        .collect();
    if tools.is_empty() { None } else { Some(tools) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_schema_is_not_wrapped() {
        let schema = json!({"type": "object", "properties": {"x": {"type": "string"}}});
        let (out, wrapped) = wrap_root_schema(schema.clone());
        assert!(!wrapped);
        assert_eq!(out, schema);
    }

    #[test]
    fn test_array_schema_is_wrapped_with_hoisted_definitions() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "array",
            "items": {"$ref": "#/definitions/Diagnosis"},
            "definitions": {
                "Diagnosis": {"type": "object"}
            }
        });
        let (out, wrapped) = wrap_root_schema(schema);
        assert!(wrapped);
        assert_eq!(out["type"], "object");
        assert_eq!(out["properties"]["result"]["type"], "array");
        assert!(out["definitions"]["Diagnosis"].is_object());
        assert!(out["properties"]["result"].get("definitions").is_none());
    }

    #[test]
    fn test_tagged_union_schema_is_wrapped() {
        let schema = json!({"anyOf": [{"type": "object"}, {"type": "object"}]});
        let (_, wrapped) = wrap_root_schema(schema);
        assert!(wrapped);
    }

    #[test]
    fn test_build_tools() {
        assert!(build_tools(&[]).is_none());
        let tools = build_tools(&[ToolCapability::WebSearch]).unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, web_search::WEB_SEARCH);
    }
}
