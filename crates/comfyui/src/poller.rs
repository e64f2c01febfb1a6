//! Submit-and-wait polling loop.
//!
//! Submits a prompt, then polls the history endpoint until the job
//! reaches terminal success or the wall-clock deadline passes. The
//! deadline is checked *before* each wait/poll attempt, so a job that
//! never progresses is bounded by the timeout plus at most one poll
//! interval. Cancellation is observed at every sleep boundary.
//!
//! A failed poll attempt is not retried: transport errors surface
//! immediately and unchanged, never masked as a timeout or a success.

use std::time::Duration;

use async_trait::async_trait;
use renderbridge_core::{JobOutputs, WorkflowTemplate};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{ComfyUIApi, ComfyUIApiError};
use crate::record::JobRecord;

/// Submission/polling surface the loop runs against.
///
/// [`ComfyUIApi`] is the production implementation; tests drive the loop
/// with a scripted in-memory backend.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Queue a prompt, returning its job handle.
    async fn submit_prompt(&self, prompt: &WorkflowTemplate)
        -> Result<String, ComfyUIApiError>;

    /// Fetch the current record for a job, `None` when the server has no
    /// entry for it yet.
    async fn get_record(&self, prompt_id: &str)
        -> Result<Option<JobRecord>, ComfyUIApiError>;
}

#[async_trait]
impl JobBackend for ComfyUIApi {
    async fn submit_prompt(
        &self,
        prompt: &WorkflowTemplate,
    ) -> Result<String, ComfyUIApiError> {
        ComfyUIApi::submit_prompt(self, prompt).await
    }

    async fn get_record(
        &self,
        prompt_id: &str,
    ) -> Result<Option<JobRecord>, ComfyUIApiError> {
        ComfyUIApi::get_record(self, prompt_id).await
    }
}

/// Tunable parameters for the polling cadence.
///
/// The default is a fixed 1-second interval. Setting `multiplier` above
/// 1.0 turns on exponential backoff, clamped at `max_interval`.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the first poll and the base of the backoff curve.
    pub interval: Duration,
    /// Upper bound on the delay between polls.
    pub max_interval: Duration,
    /// Factor by which the delay grows after each poll.
    pub multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(1),
            multiplier: 1.0,
        }
    }
}

/// Calculate the next poll delay from the current delay and config.
///
/// The result is clamped to [`PollConfig::max_interval`].
pub fn next_interval(current: Duration, config: &PollConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_interval)
}

/// Errors from the polling loop.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// Submission or a poll attempt failed at the HTTP layer. Carries the
    /// underlying API error unchanged.
    #[error(transparent)]
    Api(#[from] ComfyUIApiError),

    /// The wall-clock deadline passed before terminal success.
    #[error("Job {prompt_id} did not complete within {waited_secs}s (last observed status: {last_status:?})")]
    Timeout {
        /// Handle of the job that was being polled.
        prompt_id: String,
        /// Seconds elapsed since submission.
        waited_secs: u64,
        /// Status string from the most recent record, if any was seen.
        last_status: Option<String>,
    },

    /// The caller's cancellation signal fired during polling.
    #[error("Job {prompt_id} polling cancelled after {waited_secs}s")]
    Cancelled {
        /// Handle of the job that was being polled.
        prompt_id: String,
        /// Seconds elapsed since submission.
        waited_secs: u64,
    },
}

/// Submit a prompt and poll until it completes, with default cadence.
///
/// See [`submit_and_wait_with`] for the loop contract.
pub async fn submit_and_wait<B: JobBackend>(
    backend: &B,
    prompt: &WorkflowTemplate,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<JobOutputs, PollError> {
    submit_and_wait_with(backend, prompt, timeout, cancel, &PollConfig::default()).await
}

/// Submit a prompt and poll until it completes.
///
/// Each iteration first compares elapsed time against `timeout` (so the
/// total wait is bounded by `timeout` plus one interval), then sleeps,
/// then fetches the job record. The loop ends when a record is both
/// status-success and non-empty-outputs; either condition alone keeps it
/// polling. Outputs are returned exactly as received.
///
/// Cancelling `cancel` aborts at the next sleep boundary with
/// [`PollError::Cancelled`], which is distinct from [`PollError::Timeout`].
pub async fn submit_and_wait_with<B: JobBackend>(
    backend: &B,
    prompt: &WorkflowTemplate,
    timeout: Duration,
    cancel: &CancellationToken,
    config: &PollConfig,
) -> Result<JobOutputs, PollError> {
    let prompt_id = backend.submit_prompt(prompt).await?;
    let started = Instant::now();

    tracing::info!(
        prompt_id = %prompt_id,
        timeout_secs = timeout.as_secs(),
        "Prompt submitted, polling for completion",
    );

    let mut interval = config.interval;
    let mut last_status: Option<String> = None;

    loop {
        let elapsed = started.elapsed();
        if elapsed > timeout {
            tracing::warn!(
                prompt_id = %prompt_id,
                elapsed_secs = elapsed.as_secs(),
                last_status = ?last_status,
                "Polling deadline exceeded",
            );
            return Err(PollError::Timeout {
                prompt_id,
                waited_secs: elapsed.as_secs(),
                last_status,
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(prompt_id = %prompt_id, "Polling cancelled");
                return Err(PollError::Cancelled {
                    prompt_id,
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if let Some(record) = backend.get_record(&prompt_id).await? {
            last_status = record.status_str().map(str::to_owned);
            tracing::debug!(
                prompt_id = %prompt_id,
                status = ?last_status,
                output_nodes = record.outputs.len(),
                "Polled job record",
            );

            if record.is_complete() {
                tracing::info!(
                    prompt_id = %prompt_id,
                    elapsed_secs = started.elapsed().as_secs(),
                    output_nodes = record.outputs.len(),
                    "Job completed",
                );
                return Ok(record.outputs);
            }
        }

        interval = next_interval(interval, config);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
