//! OpenAI-compatible chat-completions adapter
//!
//! Implements the application's `AgentInvoker` port against any backend
//! speaking the OpenAI chat-completions protocol with structured outputs
//! and function tools.

pub mod gateway;
pub mod protocol;

pub use gateway::{GatewayConfigError, OpenAiAgentGateway};
