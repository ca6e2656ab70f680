//! Agent invocation port
//!
//! Defines the interface for delegating one sub-agent call to a language
//! model: a rendered prompt, a required output type, and the tool
//! capabilities the model may use while answering. The adapter owns
//! transport, timeouts, and its own output-repair attempts; callers only
//! see a value that conforms to the requested type, or an error.

use async_trait::async_trait;
use panel_domain::Model;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during an agent invocation
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("model call failed: {0}")]
    ModelCall(String),

    #[error("model output failed validation: {0}")]
    OutputValidation(String),

    #[error("rate limited by model backend: {0}")]
    RateLimited(String),

    #[error("tool budget exhausted after {0} tool calls")]
    ToolBudgetExhausted(usize),
}

/// Capabilities a sub-agent may use while producing its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCapability {
    /// Web search for evidence gathering
    WebSearch,
}

/// The output type an invocation must produce
///
/// `schema` is a JSON Schema document; adapters hand it to the model
/// backend so the response is generated (and server-side validated)
/// against it.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Short identifier for the contract (also used as the schema name)
    pub name: &'static str,
    /// JSON Schema for the expected output
    pub schema: Value,
}

impl TypeDescriptor {
    /// Build a descriptor from a schemars-deriving type
    pub fn of<T: JsonSchema>(name: &'static str) -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name,
            schema: serde_json::to_value(schema).unwrap_or_default(),
        }
    }
}

/// One sub-agent invocation request
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Model to run the sub-agent on
    pub model: Model,
    /// Fully rendered prompt text
    pub prompt: String,
    /// Required output type
    pub output: TypeDescriptor,
    /// Tool capabilities available to the model during this call
    pub tools: Vec<ToolCapability>,
}

impl AgentRequest {
    pub fn new(model: Model, prompt: impl Into<String>, output: TypeDescriptor) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            output,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolCapability>) -> Self {
        self.tools = tools;
        self
    }
}

/// Port for delegating a sub-agent call to a language model
///
/// Implementations (adapters) live in the infrastructure layer. Each call
/// is independent: no memory is carried between invocations, and
/// identical requests may legitimately produce different outputs.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Run one sub-agent call and return its output as JSON conforming to
    /// `request.output.schema`.
    async fn invoke(&self, request: AgentRequest) -> Result<Value, InvokeError>;
}

/// Invoke and deserialize into the stage's contract type.
///
/// A response the adapter accepted but that still cannot be coerced into
/// `T` is an [`InvokeError::OutputValidation`].
pub async fn invoke_as<T: DeserializeOwned>(
    invoker: &dyn AgentInvoker,
    request: AgentRequest,
) -> Result<T, InvokeError> {
    let contract = request.output.name;
    let raw = invoker.invoke(request).await?;
    serde_json::from_value(raw)
        .map_err(|e| InvokeError::OutputValidation(format!("{}: {}", contract, e)))
}
