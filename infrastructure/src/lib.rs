//! Infrastructure layer for dx-panel
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the OpenAI-compatible model gateway, the built-in
//! prompt library, the web search tool, and the JSONL session logger.

pub mod logging;
pub mod openai;
pub mod prompts;
pub mod tools;

// Re-export commonly used types
pub use logging::JsonlSessionLogger;
pub use openai::{gateway::OpenAiAgentGateway, GatewayConfigError};
pub use prompts::PromptLibrary;
