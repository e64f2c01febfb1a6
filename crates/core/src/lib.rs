//! Pure document logic for the rendering-service client.
//!
//! Workflow template loading, prompt construction (override and patch
//! application), and output artifact extraction. Everything here is a
//! function of its inputs; the HTTP layer lives in `renderbridge-comfyui`.

pub mod error;
pub mod outputs;
pub mod prompt;
pub mod template;

pub use error::CoreError;
pub use outputs::{collect_image_urls, collect_video_refs, JobOutputs, VideoRef};
pub use prompt::{build_prompt, ExtraParams, NodeOverride};
pub use template::{WorkflowNode, WorkflowTemplate};
