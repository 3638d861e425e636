//! Runs the business-intelligence agent on a single prompt.
//!
//! Usage:
//!
//! ```text
//! prospector [--prompt <TEXT>] [--config <PATH>] [--flow]
//! ```
//!
//! Without `--prompt` the task is read from standard input. By default every
//! registered business system is connected before the prompt is read;
//! `--flow` defers connection to the first step and stops the run after
//! thirty minutes.

use camino::Utf8PathBuf;
use clap::Parser;
use mockable::DefaultClock;
use prospector::business::services::{BusinessAgentError, BusinessIntelligenceAgent};
use prospector::config::{AgentSettings, ConfigError};
use prospector::driver::{DriverError, FLOW_TIMEOUT, PromptOutcome, read_prompt, run_prompt};
use prospector::logging::init_tracing;
use prospector::tool_registry::adapters::RmcpConnector;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::util::TryInitError;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "prospector",
    about = "Run the business intelligence agent with a prompt"
)]
struct Cli {
    /// Input prompt for the agent.
    #[arg(long)]
    prompt: Option<String>,

    /// JSON settings file.
    #[arg(long, env = "PROSPECTOR_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Connect systems lazily and stop the run after thirty minutes.
    #[arg(long)]
    flow: bool,
}

/// Errors that end the process.
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] TryInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Agent(#[from] BusinessAgentError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing()?;
    let cli = Cli::parse();

    let settings = AgentSettings::load(cli.config.as_deref())?;
    let registry = settings.registry()?;
    let model = Arc::new(settings.llm.build_model()?);
    let connector = Arc::new(RmcpConnector::new());
    let clock = Arc::new(DefaultClock);
    let options = settings.agent_options();

    let mut agent = if cli.flow {
        BusinessIntelligenceAgent::new(connector, model, clock, registry, options)?
    } else {
        BusinessIntelligenceAgent::create(connector, model, clock, registry, options).await?
    };

    let prompt = match cli.prompt {
        Some(prompt) => prompt,
        None => {
            let mut input = BufReader::new(tokio::io::stdin());
            let mut output = tokio::io::stdout();
            match read_prompt(&mut input, &mut output).await {
                Ok(line) => line,
                Err(err) => {
                    agent.cleanup().await?;
                    return Err(DriverError::from(err).into());
                }
            }
        }
    };

    let limit = cli.flow.then_some(FLOW_TIMEOUT);
    if let PromptOutcome::Completed(summary) = run_prompt(&mut agent, &prompt, limit).await? {
        if cli.flow {
            info!("{summary}");
        } else {
            info!("Business intelligence task completed.");
        }
    }
    Ok(())
}
