use crate::encoding::PayloadEncoding;

/// Workflow API connection configuration.
///
/// Passed explicitly into [`crate::WorkflowClient::new`]; there is no
/// ambient global.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Base HTTP URL of the workflow API. Stored without a trailing slash.
    pub api_base: String,
    /// Bearer token sent as `Authorization` on every request.
    pub api_key: String,
    /// Request body shape for run calls.
    pub encoding: PayloadEncoding,
}

impl WorkflowConfig {
    /// Create a configuration for a specific API endpoint.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        encoding: PayloadEncoding,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api_base,
            api_key: api_key.into(),
            encoding,
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default               |
    /// |--------------------------|-----------------------|
    /// | `WORKFLOW_API_BASE`      | `https://api.coze.cn` |
    /// | `WORKFLOW_API_KEY`       | empty string          |
    /// | `WORKFLOW_PAYLOAD_STYLE` | `inputs`              |
    pub fn from_env() -> Self {
        let api_base = std::env::var("WORKFLOW_API_BASE")
            .unwrap_or_else(|_| "https://api.coze.cn".into());
        let api_key = std::env::var("WORKFLOW_API_KEY").unwrap_or_default();
        let encoding = std::env::var("WORKFLOW_PAYLOAD_STYLE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(PayloadEncoding::Inputs);
        Self::new(api_base, api_key, encoding)
    }
}
