//! Job record types returned by the history endpoint.
//!
//! ComfyUI reports job state as `{"<prompt_id>": {"status": {...},
//! "outputs": {...}}}`. This module deserializes one record into a typed
//! [`JobRecord`] and defines the terminal-success predicate used by the
//! poller. Absent or partial records are normal while a job is queued.

use renderbridge_core::JobOutputs;
use serde::Deserialize;

/// Status string a finished job reports.
pub const STATUS_SUCCESS: &str = "success";

/// One job's status/outputs snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRecord {
    /// Execution status block. Missing while the job is queued.
    #[serde(default)]
    pub status: Option<JobStatus>,
    /// Per-node results. Filled in as nodes finish.
    #[serde(default)]
    pub outputs: JobOutputs,
}

/// The `status` block of a job record.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    /// Coarse status string, e.g. `"success"` or `"error"`.
    #[serde(default)]
    pub status_str: Option<String>,
}

impl JobRecord {
    /// The reported status string, if any.
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref()?.status_str.as_deref()
    }

    /// Whether this snapshot is terminal: the status string is
    /// [`STATUS_SUCCESS`] AND at least one node has produced output.
    ///
    /// Both conditions must hold simultaneously -- a success status with
    /// empty outputs means results have not landed yet.
    pub fn is_complete(&self) -> bool {
        self.status_str() == Some(STATUS_SUCCESS) && !self.outputs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
