use std::path::PathBuf;

/// Errors from the pure document layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A prompt override or parameter patch referenced a node ID that does
    /// not exist in the template. Configuration defect, never retried.
    #[error("Unknown node '{node_id}' referenced by a prompt override")]
    UnknownNode { node_id: String },

    /// The template file does not exist.
    #[error("Template file not found: {path}")]
    TemplateNotFound { path: PathBuf },

    /// The template file exists but could not be read.
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The template file is not a valid workflow document.
    #[error("Failed to parse template {path}: {source}")]
    TemplateParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
