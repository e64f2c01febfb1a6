//! End-to-end flow: build a prompt from a template, submit it, poll to
//! completion, and collect the resulting image URLs.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use renderbridge_comfyui::{
    submit_and_wait, ComfyUIApiError, JobBackend, JobRecord,
};
use renderbridge_core::{build_prompt, collect_image_urls, NodeOverride, WorkflowTemplate};
use tokio_util::sync::CancellationToken;

/// Backend that captures the submitted prompt and replays a fixed record
/// sequence, reporting an absent record once the sequence is exhausted.
struct ReplayBackend {
    submitted: Mutex<Option<serde_json::Value>>,
    records: Mutex<VecDeque<Option<JobRecord>>>,
}

impl ReplayBackend {
    fn new(records: Vec<Option<JobRecord>>) -> Self {
        Self {
            submitted: Mutex::new(None),
            records: Mutex::new(records.into()),
        }
    }
}

#[async_trait]
impl JobBackend for ReplayBackend {
    async fn submit_prompt(
        &self,
        prompt: &WorkflowTemplate,
    ) -> Result<String, ComfyUIApiError> {
        *self.submitted.lock().unwrap() = Some(serde_json::to_value(prompt).unwrap());
        Ok("prompt-1".into())
    }

    async fn get_record(
        &self,
        _prompt_id: &str,
    ) -> Result<Option<JobRecord>, ComfyUIApiError> {
        Ok(self.records.lock().unwrap().pop_front().flatten())
    }
}

fn record(json: &str) -> Option<JobRecord> {
    Some(serde_json::from_str(json).unwrap())
}

#[tokio::test(start_paused = true)]
async fn image_edit_round_trip() {
    let template: WorkflowTemplate =
        serde_json::from_str(r#"{"2":{"inputs":{}},"74":{"inputs":{}}}"#).unwrap();

    let mut overrides = BTreeMap::new();
    overrides.insert("2".to_string(), NodeOverride::new("image", "cat.jpg"));
    overrides.insert("74".to_string(), NodeOverride::new("text", "red dress"));

    let prompt = build_prompt(&template, &overrides, None).unwrap();

    let backend = ReplayBackend::new(vec![
        None,
        record(r#"{"status":{"status_str":"running"},"outputs":{}}"#),
        record(
            r#"{"status":{"status_str":"success"},"outputs":{"9":{"images":[{"filename":"out.png"}]}}}"#,
        ),
    ]);

    let outputs = submit_and_wait(
        &backend,
        &prompt,
        Duration::from_secs(300),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // The submitted document is the template copy with both overrides applied.
    let submitted = backend.submitted.lock().unwrap().take().unwrap();
    assert_eq!(
        submitted,
        serde_json::json!({
            "2": {"inputs": {"image": "cat.jpg"}},
            "74": {"inputs": {"text": "red dress"}}
        })
    );

    // And the template itself is untouched.
    assert!(template.get("2").unwrap().inputs.is_empty());

    let urls = collect_image_urls(&outputs, "http://host");
    assert_eq!(urls, vec!["http://host/view?filename=out.png"]);
}
