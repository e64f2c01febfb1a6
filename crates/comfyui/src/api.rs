//! REST API client for the ComfyUI HTTP endpoints.
//!
//! Wraps the ComfyUI HTTP API (prompt submission, history retrieval,
//! image upload, cancellation, interruption, system stats) using
//! [`reqwest`].

use std::collections::HashMap;

use renderbridge_core::WorkflowTemplate;
use serde::Deserialize;

use crate::config::ComfyUIConfig;
use crate::record::JobRecord;

/// HTTP client for a single ComfyUI server.
pub struct ComfyUIApi {
    client: reqwest::Client,
    config: ComfyUIConfig,
}

/// Response returned by the `/prompt` endpoint after queuing a job.
///
/// Servers differ on the identifier field name, so both are accepted.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    prompt_id: Option<String>,
    task_id: Option<String>,
}

/// Response returned by the `/upload/image` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// Server-side filename to reference in prompt overrides.
    pub name: String,
    /// Subfolder the file landed in, when the server reports one.
    #[serde(default)]
    pub subfolder: Option<String>,
}

/// Errors from the ComfyUI REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ComfyUI returned a non-2xx status code.
    #[error("ComfyUI API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The submission response carried neither identifier field.
    #[error("Submission returned no usable job handle")]
    SubmissionFailed,
}

impl ComfyUIApi {
    /// Create a new API client from a connection configuration.
    pub fn new(config: ComfyUIConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across multiple servers).
    pub fn with_client(client: reqwest::Client, config: ComfyUIConfig) -> Self {
        Self { client, config }
    }

    /// Base HTTP URL of the server, without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    /// Submit a prompt for execution.
    ///
    /// Sends a `POST /prompt` request with the prompt document and a fresh
    /// `client_id`. Returns the server-assigned job handle, accepting
    /// either identifier field the server may use. Fails with
    /// [`ComfyUIApiError::SubmissionFailed`] when neither is present.
    pub async fn submit_prompt(
        &self,
        prompt: &WorkflowTemplate,
    ) -> Result<String, ComfyUIApiError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let body = serde_json::json!({
            "prompt": prompt,
            "client_id": client_id,
        });

        let response = self
            .authorize(self.client.post(format!("{}/prompt", self.config.api_base)))
            .json(&body)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::parse_response(response).await?;
        submitted
            .prompt_id
            .or(submitted.task_id)
            .ok_or(ComfyUIApiError::SubmissionFailed)
    }

    /// Fetch the current status/outputs snapshot for a job.
    ///
    /// Sends a `GET /history/{prompt_id}` request. The response is keyed
    /// by prompt ID; a job the server does not know about yet yields
    /// `None`, which is a normal pre-completion state, not an error.
    pub async fn get_record(
        &self,
        prompt_id: &str,
    ) -> Result<Option<JobRecord>, ComfyUIApiError> {
        let response = self
            .authorize(self.client.get(format!(
                "{}/history/{}",
                self.config.api_base, prompt_id
            )))
            .send()
            .await?;

        let mut history: HashMap<String, JobRecord> = Self::parse_response(response).await?;
        Ok(history.remove(prompt_id))
    }

    /// Upload an image, returning the server-side filename handle.
    ///
    /// Sends a multipart `POST /upload/image` request. The returned name
    /// is what prompt overrides should reference.
    pub async fn upload_image(
        &self,
        data: Vec<u8>,
        filename: Option<&str>,
    ) -> Result<UploadedImage, ComfyUIApiError> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.unwrap_or("image.jpg").to_string())
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .authorize(
                self.client
                    .post(format!("{}/upload/image", self.config.api_base)),
            )
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download a rendered file by its server-side filename.
    ///
    /// Sends a `GET /view/{filename}` request and returns the raw bytes.
    pub async fn fetch_view(&self, filename: &str) -> Result<Vec<u8>, ComfyUIApiError> {
        let response = self
            .authorize(self.client.get(format!(
                "{}/view/{}",
                self.config.api_base, filename
            )))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Remove a queued job from the execution queue.
    ///
    /// Sends a `POST /queue` request asking the server to delete the
    /// specified prompt.
    pub async fn cancel_queued(&self, prompt_id: &str) -> Result<(), ComfyUIApiError> {
        let body = serde_json::json!({
            "delete": [prompt_id],
        });

        let response = self
            .authorize(self.client.post(format!("{}/queue", self.config.api_base)))
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Interrupt the currently running execution immediately.
    ///
    /// Sends a `POST /interrupt` request. This does not target a specific
    /// prompt -- it interrupts whatever is executing right now.
    pub async fn interrupt(&self) -> Result<(), ComfyUIApiError> {
        let response = self
            .authorize(
                self.client
                    .post(format!("{}/interrupt", self.config.api_base)),
            )
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Fetch server statistics (device, memory, queue state).
    ///
    /// Sends a `GET /system/stats` request. The payload shape is
    /// server-defined, so it is returned as raw JSON.
    pub async fn system_stats(&self) -> Result<serde_json::Value, ComfyUIApiError> {
        let response = self
            .authorize(self.client.get(format!(
                "{}/system/stats",
                self.config.api_base
            )))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Attach the bearer token when the configuration carries one.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ComfyUIApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ComfyUIApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ComfyUIApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ComfyUIApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ComfyUIApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_response_primary_field() {
        let parsed: SubmitResponse =
            serde_json::from_str(r#"{"prompt_id":"abc-123","number":4}"#).unwrap();
        assert_eq!(parsed.prompt_id.or(parsed.task_id).as_deref(), Some("abc-123"));
    }

    #[test]
    fn submit_response_fallback_field() {
        let parsed: SubmitResponse =
            serde_json::from_str(r#"{"task_id":"t-9"}"#).unwrap();
        assert_eq!(parsed.prompt_id.or(parsed.task_id).as_deref(), Some("t-9"));
    }

    #[test]
    fn submit_response_prefers_primary_over_fallback() {
        let parsed: SubmitResponse =
            serde_json::from_str(r#"{"prompt_id":"p-1","task_id":"t-1"}"#).unwrap();
        assert_eq!(parsed.prompt_id.or(parsed.task_id).as_deref(), Some("p-1"));
    }

    #[test]
    fn submit_response_without_handle() {
        let parsed: SubmitResponse = serde_json::from_str(r#"{"number":2}"#).unwrap();
        assert!(parsed.prompt_id.or(parsed.task_id).is_none());
    }

    #[test]
    fn uploaded_image_parses_name_and_subfolder() {
        let parsed: UploadedImage =
            serde_json::from_str(r#"{"name":"input.jpg","subfolder":"","type":"input"}"#)
                .unwrap();
        assert_eq!(parsed.name, "input.jpg");
        assert_eq!(parsed.subfolder.as_deref(), Some(""));
    }
}
