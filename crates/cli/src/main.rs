//! Image-edit demo: upload an input image, translate the edit text,
//! build a prompt from a workflow template, submit it, and print the
//! resulting artifact URLs.
//!
//! All inputs come from environment variables (see `job_settings`).

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use renderbridge_comfyui::{submit_and_wait, ComfyUIApi, ComfyUIConfig};
use renderbridge_core::{
    build_prompt, collect_image_urls, collect_video_refs, NodeOverride, WorkflowTemplate,
};
use renderbridge_workflow::{WorkflowClient, WorkflowConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Per-run inputs loaded from environment variables.
///
/// | Env Var                 | Default | Meaning                              |
/// |-------------------------|---------|--------------------------------------|
/// | `TEMPLATE_PATH`         | --      | workflow template JSON file          |
/// | `INPUT_IMAGE`           | --      | image file to upload and edit        |
/// | `EDIT_TEXT`             | --      | edit instruction                     |
/// | `IMAGE_NODE_ID`         | `2`     | template node receiving the image    |
/// | `TEXT_NODE_ID`          | `74`    | template node receiving the text     |
/// | `TRANSLATE_WORKFLOW_ID` | unset   | workflow used to translate the text  |
/// | `POLL_TIMEOUT_SECS`     | `300`   | wall-clock polling deadline          |
struct JobSettings {
    template_path: String,
    input_image: String,
    edit_text: String,
    image_node_id: String,
    text_node_id: String,
    translate_workflow_id: Option<String>,
    poll_timeout: Duration,
}

impl JobSettings {
    fn from_env() -> anyhow::Result<Self> {
        let template_path =
            std::env::var("TEMPLATE_PATH").context("TEMPLATE_PATH must be set")?;
        let input_image = std::env::var("INPUT_IMAGE").context("INPUT_IMAGE must be set")?;
        let edit_text = std::env::var("EDIT_TEXT").context("EDIT_TEXT must be set")?;
        let image_node_id =
            std::env::var("IMAGE_NODE_ID").unwrap_or_else(|_| "2".into());
        let text_node_id = std::env::var("TEXT_NODE_ID").unwrap_or_else(|_| "74".into());
        let translate_workflow_id = std::env::var("TRANSLATE_WORKFLOW_ID").ok();
        let poll_timeout = Duration::from_secs(
            std::env::var("POLL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .context("POLL_TIMEOUT_SECS must be a valid u64")?,
        );

        Ok(Self {
            template_path,
            input_image,
            edit_text,
            image_node_id,
            text_node_id,
            translate_workflow_id,
            poll_timeout,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "renderbridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = JobSettings::from_env()?;
    let comfyui = ComfyUIApi::new(ComfyUIConfig::from_env());

    // Cancel polling on Ctrl-C instead of leaving the loop running.
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            canceller.cancel();
        }
    });

    let template = WorkflowTemplate::load(&settings.template_path)?;
    tracing::info!(
        path = %settings.template_path,
        nodes = template.len(),
        "Template loaded",
    );

    let image_bytes = tokio::fs::read(&settings.input_image)
        .await
        .with_context(|| format!("Failed to read {}", settings.input_image))?;
    let file_name = std::path::Path::new(&settings.input_image)
        .file_name()
        .and_then(|n| n.to_str());
    let uploaded = comfyui.upload_image(image_bytes, file_name).await?;
    tracing::info!(name = %uploaded.name, "Input image uploaded");

    let edit_text = match &settings.translate_workflow_id {
        Some(workflow_id) => {
            let translator = WorkflowClient::new(WorkflowConfig::from_env());
            let translated = translator
                .run(workflow_id, &serde_json::json!({"text": settings.edit_text}))
                .await?;
            tracing::info!(text = %translated, "Edit text translated");
            translated
        }
        None => settings.edit_text.clone(),
    };

    let mut overrides = BTreeMap::new();
    overrides.insert(
        settings.image_node_id.clone(),
        NodeOverride::new("image", uploaded.name),
    );
    overrides.insert(
        settings.text_node_id.clone(),
        NodeOverride::new("text", edit_text),
    );

    let prompt = build_prompt(&template, &overrides, None)?;
    let outputs = submit_and_wait(&comfyui, &prompt, settings.poll_timeout, &cancel).await?;

    for url in collect_image_urls(&outputs, comfyui.api_base()) {
        println!("{url}");
    }
    for video in collect_video_refs(&outputs, comfyui.api_base()) {
        println!("{} ({}, {} fps)", video.url, video.format, video.frame_rate);
    }

    Ok(())
}
