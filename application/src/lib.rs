//! Application layer for dx-panel
//!
//! This crate contains the deliberation use case and the port definitions
//! for its external collaborators (agent invocation, template rendering,
//! progress reporting, session logging). It depends only on the domain
//! layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_invoker::{invoke_as, AgentInvoker, AgentRequest, InvokeError, ToolCapability, TypeDescriptor},
    progress::{NoProgress, ProgressNotifier},
    session_logger::{NoSessionLogger, SessionEvent, SessionLogger},
    template_renderer::{TemplateContext, TemplateError, TemplateRenderer},
};
pub use use_cases::run_deliberation::{
    OrchestrationError, RunDeliberationInput, RunDeliberationUseCase,
};
