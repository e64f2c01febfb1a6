//! Client for a hosted workflow-invocation API.
//!
//! Runs a named remote workflow with a set of inputs and returns its
//! string output. The request body shape differs between API generations,
//! so the encoding is a configuration-selected variant rather than
//! separate client implementations.

pub mod client;
pub mod config;
pub mod encoding;

pub use client::{WorkflowClient, WorkflowApiError};
pub use config::WorkflowConfig;
pub use encoding::PayloadEncoding;
