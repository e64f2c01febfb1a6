//! Workflow template documents.
//!
//! A template is the API-format ComfyUI workflow JSON: an object keyed by
//! node ID, each node carrying a `class_type` and an `inputs` map. Templates
//! are loaded once and treated as immutable; prompt construction always
//! works on an independent copy (see [`crate::prompt`]).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single node in a workflow document.
///
/// Fields other than `class_type` and `inputs` (titles, metadata added by
/// the UI, future server fields) are preserved verbatim through `extra` so
/// the built request round-trips exactly what the template contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// ComfyUI class type (e.g. "KSampler", "CLIPTextEncode").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_type: Option<String>,

    /// Input values for this node, keyed by input field name.
    #[serde(default)]
    pub inputs: serde_json::Map<String, serde_json::Value>,

    /// Any remaining node fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An immutable workflow template: node ID -> node descriptor.
///
/// Iteration order is deterministic (sorted by node ID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowTemplate {
    nodes: BTreeMap<String, WorkflowNode>,
}

impl WorkflowTemplate {
    /// Load a template from a JSON file on disk.
    ///
    /// Fails with [`CoreError::TemplateNotFound`] if the file is missing and
    /// [`CoreError::TemplateParse`] if it is not a valid workflow document.
    /// Errors are propagated, not recovered.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::TemplateNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::TemplateRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|e| CoreError::TemplateParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Look up a node by ID.
    pub fn get(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.get(node_id)
    }

    /// Whether a node with the given ID exists.
    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Number of nodes in the template.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the template has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in deterministic (ID-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &WorkflowNode)> + '_ {
        self.nodes.iter()
    }

    pub(crate) fn get_mut(&mut self, node_id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.get_mut(node_id)
    }
}

impl FromIterator<(String, WorkflowNode)> for WorkflowTemplate {
    fn from_iter<I: IntoIterator<Item = (String, WorkflowNode)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
