//! Presentation layer for dx-panel
//!
//! CLI argument definitions, console output formatting, and progress
//! reporting implementations of the application's progress port.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat, DEFAULT_PATIENT_INFO};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
