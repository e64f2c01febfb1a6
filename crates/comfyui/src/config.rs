/// ComfyUI connection configuration.
///
/// Passed explicitly into [`crate::ComfyUIApi::new`]; there is no ambient
/// global. All fields have defaults suitable for a local server.
#[derive(Debug, Clone)]
pub struct ComfyUIConfig {
    /// Base HTTP URL of the server (default: `http://localhost:8188`).
    /// Stored without a trailing slash.
    pub api_base: String,
    /// Optional bearer token sent as `Authorization` on every request.
    pub api_key: Option<String>,
}

impl ComfyUIConfig {
    /// Create a configuration for a specific server.
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { api_base, api_key }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                 |
    /// |--------------------|-------------------------|
    /// | `COMFYUI_API_BASE` | `http://localhost:8188` |
    /// | `COMFYUI_API_KEY`  | unset (no auth header)  |
    pub fn from_env() -> Self {
        let api_base = std::env::var("COMFYUI_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8188".into());
        let api_key = std::env::var("COMFYUI_API_KEY").ok();
        Self::new(api_base, api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ComfyUIConfig::new("http://host:8188/", None);
        assert_eq!(config.api_base, "http://host:8188");
    }

    #[test]
    fn base_without_slash_is_unchanged() {
        let config = ComfyUIConfig::new("http://host:8188", None);
        assert_eq!(config.api_base, "http://host:8188");
    }
}
