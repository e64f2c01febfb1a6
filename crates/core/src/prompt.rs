//! Prompt construction: applying per-job values to a workflow template.
//!
//! [`build_prompt`] clones the template and writes the caller's overrides
//! and parameter patches into the copy. The template itself is never
//! mutated, so one loaded template can serve any number of jobs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::template::WorkflowTemplate;

/// Input field targeted by an override when the caller does not name one.
///
/// Covers the common case of substituting an image URL into a loader node.
pub const DEFAULT_OVERRIDE_FIELD: &str = "url";

/// A single-field override for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOverride {
    /// Input field to set. Defaults to [`DEFAULT_OVERRIDE_FIELD`].
    #[serde(default = "default_override_field")]
    pub field: String,
    /// Value written into the field.
    pub value: serde_json::Value,
}

fn default_override_field() -> String {
    DEFAULT_OVERRIDE_FIELD.to_string()
}

impl NodeOverride {
    /// Override a named input field.
    pub fn new(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Override the default `url` field.
    pub fn url(value: impl Into<serde_json::Value>) -> Self {
        Self::new(DEFAULT_OVERRIDE_FIELD, value)
    }
}

/// Per-node parameter patches merged into node inputs after overrides.
pub type ExtraParams = BTreeMap<String, serde_json::Map<String, serde_json::Value>>;

/// Build a submission-ready prompt from a template.
///
/// Clones `template`, then for each `(node_id, override)` sets
/// `inputs[field] = value` on the copy, then merges each `extra_params`
/// patch into the named node's inputs key-by-key. Patches are applied
/// last, so a patch targeting the same field as an override wins.
///
/// Fails with [`CoreError::UnknownNode`] when an override or patch names a
/// node absent from the template.
pub fn build_prompt(
    template: &WorkflowTemplate,
    overrides: &BTreeMap<String, NodeOverride>,
    extra_params: Option<&ExtraParams>,
) -> Result<WorkflowTemplate, CoreError> {
    let mut prompt = template.clone();

    for (node_id, patch) in overrides {
        let node = prompt
            .get_mut(node_id)
            .ok_or_else(|| CoreError::UnknownNode {
                node_id: node_id.clone(),
            })?;
        node.inputs
            .insert(patch.field.clone(), patch.value.clone());
    }

    if let Some(extra_params) = extra_params {
        for (node_id, params) in extra_params {
            let node = prompt
                .get_mut(node_id)
                .ok_or_else(|| CoreError::UnknownNode {
                    node_id: node_id.clone(),
                })?;
            for (field, value) in params {
                node.inputs.insert(field.clone(), value.clone());
            }
        }
    }

    Ok(prompt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
