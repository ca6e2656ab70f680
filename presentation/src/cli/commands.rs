//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Default patient case used when none is provided.
pub const DEFAULT_PATIENT_INFO: &str = "A 65-year-old male presents with a 3-day history of \
high fever, a productive cough, and shortness of breath.";

/// Output format for the final decision
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with the action card and summary
    Full,
    /// Only the chosen action
    Action,
    /// JSON output
    Json,
}

/// CLI arguments for dx-panel
#[derive(Parser, Debug)]
#[command(name = "dx-panel")]
#[command(version, about = "Virtual medical panel - multi-agent diagnostic deliberation")]
#[command(long_about = r#"
dx-panel runs one pass of a virtual medical panel over a patient case.

The session has up to four stages:
1. Hypothesis: rank the most likely diagnoses (web search available)
2. Test Selection: propose tests that discriminate between them
3. Debate: challenger, stewardship, and checklist panelists critique the plan in parallel
4. Consensus: synthesize everything into one action

If the leading hypothesis reaches 95% probability, the panel commits to it
immediately and skips the remaining stages.

Environment:
  OPENAI_API_KEY     API key for the model backend (required)
  OPENAI_BASE_URL    Override the chat-completions endpoint

Example:
  dx-panel --patient-info "34-year-old female, pleuritic chest pain, recent long-haul flight"
  dx-panel -m gpt-4o -o json --log-file session.jsonl
"#)]
pub struct Cli {
    /// The patient case information
    #[arg(short, long, default_value = DEFAULT_PATIENT_INFO)]
    pub patient_info: String,

    /// Model every panelist runs on
    #[arg(short, long, default_value = "gpt-4.1-mini", value_name = "MODEL")]
    pub model: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a JSONL session transcript to this path
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
