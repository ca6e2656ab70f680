//! CLI entrypoint for dx-panel
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Context, Result};
use clap::Parser;
use panel_application::{RunDeliberationInput, RunDeliberationUseCase};
use panel_domain::{Model, PatientInfo};
use panel_infrastructure::{JsonlSessionLogger, OpenAiAgentGateway, PromptLibrary};
use panel_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting dx-panel");

    let Some(patient) = PatientInfo::try_new(cli.patient_info.clone()) else {
        bail!("Patient info cannot be empty");
    };
    let model: Model = cli.model.parse().unwrap();

    // === Dependency Injection ===
    // Create infrastructure adapters (model gateway + prompt library)
    let gateway = Arc::new(
        OpenAiAgentGateway::from_env().context("failed to initialize the model gateway")?,
    );
    let templates = Arc::new(PromptLibrary::new());

    let mut use_case = RunDeliberationUseCase::new(gateway, templates);
    if let Some(path) = &cli.log_file {
        let logger = JsonlSessionLogger::create(path)
            .with_context(|| format!("failed to create session log at {}", path.display()))?;
        info!("Writing session transcript to {}", logger.path().display());
        use_case = use_case.with_session_logger(Arc::new(logger));
    }

    // Print header
    if !cli.quiet {
        println!();
        println!("+============================================================+");
        println!("|              dx-panel - Virtual Medical Panel              |");
        println!("+============================================================+");
        println!();
        println!("Patient: {}", patient);
        println!("Model: {}", model);
        println!();
    }

    let input = RunDeliberationInput::new(patient, model);

    // Execute with or without progress reporting
    let start = Instant::now();
    let result = if cli.quiet {
        use_case.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    };

    let decision = match result {
        Ok(decision) => {
            info!(
                "Deliberation finished in {:.2}s",
                start.elapsed().as_secs_f64()
            );
            decision
        }
        Err(e) => {
            error!(
                "Deliberation failed after {:.2}s: {}",
                start.elapsed().as_secs_f64(),
                e
            );
            return Err(e.into());
        }
    };

    // Output the decision
    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&decision),
        OutputFormat::Action => ConsoleFormatter::format_action_only(&decision),
        OutputFormat::Json => ConsoleFormatter::format_json(&decision),
    };

    println!("{}", output);

    Ok(())
}
