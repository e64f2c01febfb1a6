//! HTTP client for the workflow-invocation API.

use serde_json::Value;

use crate::config::WorkflowConfig;

/// Client for running hosted workflows.
pub struct WorkflowClient {
    client: reqwest::Client,
    config: WorkflowConfig,
}

/// Errors from the workflow API layer.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Workflow API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The run response carried no recognizable output field.
    #[error("Workflow {workflow_id} returned no output")]
    MissingOutput {
        /// Workflow that was invoked.
        workflow_id: String,
    },
}

impl WorkflowClient {
    /// Create a new client from a connection configuration.
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: WorkflowConfig) -> Self {
        Self { client, config }
    }

    /// Run a workflow and return its string output.
    ///
    /// The request shape follows the configured
    /// [`PayloadEncoding`](crate::PayloadEncoding). The result is the
    /// response's `output` field, with `data` accepted as a fallback
    /// field name; missing both fails with
    /// [`WorkflowApiError::MissingOutput`].
    pub async fn run(
        &self,
        workflow_id: &str,
        inputs: &Value,
    ) -> Result<String, WorkflowApiError> {
        let url = self.config.encoding.run_url(&self.config.api_base, workflow_id);
        let body = self.config.encoding.run_body(workflow_id, inputs);

        tracing::debug!(workflow_id, url = %url, "Running workflow");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(WorkflowApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        extract_output(&payload).ok_or_else(|| WorkflowApiError::MissingOutput {
            workflow_id: workflow_id.to_string(),
        })
    }
}

/// Pull the output string out of a run response.
fn extract_output(payload: &Value) -> Option<String> {
    payload
        .get("output")
        .or_else(|| payload.get("data"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_primary_output_field() {
        let payload = json!({"output": "a red dress"});
        assert_eq!(extract_output(&payload).as_deref(), Some("a red dress"));
    }

    #[test]
    fn extracts_fallback_data_field() {
        let payload = json!({"data": "translated"});
        assert_eq!(extract_output(&payload).as_deref(), Some("translated"));
    }

    #[test]
    fn primary_field_wins_over_fallback() {
        let payload = json!({"output": "first", "data": "second"});
        assert_eq!(extract_output(&payload).as_deref(), Some("first"));
    }

    #[test]
    fn missing_output_yields_none() {
        assert_eq!(extract_output(&json!({"code": 0})), None);
    }

    #[test]
    fn non_string_output_yields_none() {
        assert_eq!(extract_output(&json!({"output": {"nested": true}})), None);
    }
}
