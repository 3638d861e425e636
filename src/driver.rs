//! Runs one prompt through a business-intelligence agent.
//!
//! The driver owns the outer edge of a session: it rejects blank prompts,
//! races the run against an interrupt and an optional time limit, and always
//! cleans the agent up before returning.

use crate::agent::ports::ChatModel;
use crate::agent::services::{AgentError, ReActAgent};
use crate::business::services::{BusinessAgentError, BusinessIntelligenceAgent};
use crate::tool_registry::ports::McpConnector;
use mockable::Clock;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Time limit applied to flow runs.
pub const FLOW_TIMEOUT: Duration = Duration::from_secs(1800);

/// Question shown when the prompt is read interactively.
pub const PROMPT_QUESTION: &str = "Enter your business intelligence task: ";

/// How a prompt run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The agent ran to completion and produced this summary.
    Completed(String),
    /// The prompt was blank; the agent never ran.
    EmptyPrompt,
    /// The run was interrupted.
    Interrupted,
    /// The run exceeded its time limit.
    TimedOut,
}

/// Errors raised by the driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The agent run failed.
    #[error(transparent)]
    Agent(#[from] AgentError),
    /// Cleanup failed.
    #[error(transparent)]
    Cleanup(#[from] BusinessAgentError),
    /// Reading the prompt failed.
    #[error("failed to read prompt: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Runs `prompt`, stopping early on Ctrl-C or once `limit` elapses.
///
/// # Errors
///
/// Returns [`DriverError`] when the run or the final cleanup fails.
pub async fn run_prompt<C, M, K>(
    agent: &mut BusinessIntelligenceAgent<C, M, K>,
    prompt: &str,
    limit: Option<Duration>,
) -> DriverResult<PromptOutcome>
where
    C: McpConnector + 'static,
    M: ChatModel + 'static,
    K: Clock + Send + Sync + 'static,
{
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "unable to listen for interrupts");
            std::future::pending::<()>().await;
        }
    };
    run_prompt_until(agent, prompt, limit, interrupt).await
}

/// Runs `prompt`, stopping early when `interrupt` resolves or once `limit`
/// elapses.
///
/// A blank prompt is reported without running the agent. Cleanup runs on
/// every path.
///
/// # Errors
///
/// Returns [`DriverError::Agent`] when the run fails, or
/// [`DriverError::Cleanup`] when only the final cleanup fails.
pub async fn run_prompt_until<C, M, K, I>(
    agent: &mut BusinessIntelligenceAgent<C, M, K>,
    prompt: &str,
    limit: Option<Duration>,
    interrupt: I,
) -> DriverResult<PromptOutcome>
where
    C: McpConnector + 'static,
    M: ChatModel + 'static,
    K: Clock + Send + Sync + 'static,
    I: Future<Output = ()> + Send,
{
    if prompt.trim().is_empty() {
        warn!("Empty prompt provided.");
        agent.cleanup().await?;
        return Ok(PromptOutcome::EmptyPrompt);
    }

    warn!("Processing your business intelligence request...");
    let started = Instant::now();
    let result = {
        let run = agent.run(Some(prompt.to_owned()));
        let bounded = async {
            match limit {
                Some(duration) => tokio::time::timeout(duration, run).await.ok(),
                None => Some(run.await),
            }
        };
        tokio::select! {
            biased;
            () = interrupt => {
                warn!("Operation interrupted.");
                Ok(PromptOutcome::Interrupted)
            }
            finished = bounded => match finished {
                Some(Ok(summary)) => {
                    let elapsed = started.elapsed().as_secs_f64();
                    info!("Business intelligence task processed in {elapsed:.2} seconds");
                    Ok(PromptOutcome::Completed(summary))
                }
                Some(Err(err)) => Err(err),
                None => {
                    let seconds = limit.map_or(0, |duration| duration.as_secs());
                    error!("Business intelligence task timed out after {seconds} seconds");
                    info!("Operation terminated due to timeout. Please try a simpler request.");
                    Ok(PromptOutcome::TimedOut)
                }
            }
        }
    };

    if matches!(result, Ok(PromptOutcome::Interrupted | PromptOutcome::TimedOut)) {
        agent.core_mut().reset();
    }
    let cleanup = agent.cleanup().await;
    match (result, cleanup) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), Ok(())) => Err(err.into()),
        (Err(err), Err(cleanup_err)) => {
            error!(error = %cleanup_err, "cleanup after failed run also failed");
            Err(err.into())
        }
    }
}

/// Asks for a prompt on `output` and reads one line from `input`.
///
/// The trailing line ending is stripped; an empty string is returned at end
/// of input.
///
/// # Errors
///
/// Returns [`std::io::Error`] when writing the question or reading fails.
pub async fn read_prompt<R, W>(input: &mut R, output: &mut W) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(PROMPT_QUESTION.as_bytes()).await?;
    output.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
