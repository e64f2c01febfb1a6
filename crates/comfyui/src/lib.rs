//! REST client and completion poller for ComfyUI rendering servers.
//!
//! Wraps the ComfyUI HTTP API (prompt submission, history retrieval,
//! uploads, cancellation) using [`reqwest`], and provides the
//! submit-and-wait polling loop that drives a job to completion.

pub mod api;
pub mod config;
pub mod poller;
pub mod record;

pub use api::{ComfyUIApi, ComfyUIApiError, UploadedImage};
pub use config::ComfyUIConfig;
pub use poller::{submit_and_wait, JobBackend, PollConfig, PollError};
pub use record::{JobRecord, JobStatus};
