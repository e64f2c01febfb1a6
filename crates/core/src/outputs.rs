//! Artifact extraction from job outputs.
//!
//! A finished job reports its outputs as a map of node ID -> node result,
//! where each result may carry an `images` and/or `gifs` list. The remote
//! schema is not under our control, so the walk is lenient: entries missing
//! a `filename` are skipped, unknown keys are ignored, nothing raises.

use serde::{Deserialize, Serialize};

/// Job outputs as returned by the rendering service: node ID -> result.
pub type JobOutputs = serde_json::Map<String, serde_json::Value>;

/// Video container format reported when the payload omits one.
pub const DEFAULT_VIDEO_FORMAT: &str = "video/h264-mp4";

/// Frame rate reported when the payload omits one.
pub const DEFAULT_VIDEO_FRAME_RATE: f64 = 16.0;

/// A video artifact with its resolved download URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Resolved download URL.
    pub url: String,
    /// Container format, e.g. `video/h264-mp4`.
    pub format: String,
    /// Frames per second.
    pub frame_rate: f64,
    /// Raw server-side filename.
    pub filename: String,
}

/// Resolve a server-side filename to its download URL.
pub fn view_url(base_url: &str, filename: &str) -> String {
    format!("{base_url}/view?filename={filename}")
}

/// Collect download URLs for every image in `outputs`.
///
/// Walks node results in deterministic order and emits one URL per
/// `images` entry that carries a `filename`.
pub fn collect_image_urls(outputs: &JobOutputs, base_url: &str) -> Vec<String> {
    artifact_entries(outputs, "images")
        .filter_map(|entry| entry.get("filename").and_then(|f| f.as_str()))
        .map(|filename| view_url(base_url, filename))
        .collect()
}

/// Collect typed references for every video in `outputs`.
///
/// Walks `gifs` lists the same way as [`collect_image_urls`] walks
/// `images`, applying [`DEFAULT_VIDEO_FORMAT`] and
/// [`DEFAULT_VIDEO_FRAME_RATE`] where the payload omits those fields.
pub fn collect_video_refs(outputs: &JobOutputs, base_url: &str) -> Vec<VideoRef> {
    artifact_entries(outputs, "gifs")
        .filter_map(|entry| {
            let filename = entry.get("filename")?.as_str()?;
            let format = entry
                .get("format")
                .and_then(|f| f.as_str())
                .unwrap_or(DEFAULT_VIDEO_FORMAT);
            let frame_rate = entry
                .get("frame_rate")
                .and_then(|r| r.as_f64())
                .unwrap_or(DEFAULT_VIDEO_FRAME_RATE);

            Some(VideoRef {
                url: view_url(base_url, filename),
                format: format.to_string(),
                frame_rate,
                filename: filename.to_string(),
            })
        })
        .collect()
}

/// Iterate the entries of every `key` list across all node results.
fn artifact_entries<'a>(
    outputs: &'a JobOutputs,
    key: &'a str,
) -> impl Iterator<Item = &'a serde_json::Value> {
    outputs
        .values()
        .filter_map(move |node| node.get(key).and_then(|v| v.as_array()))
        .flatten()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(json: &str) -> JobOutputs {
        serde_json::from_str(json).unwrap()
    }

    // -- Images --

    #[test]
    fn collects_image_urls_across_nodes() {
        let outputs = outputs(
            r#"{
                "9": {"images": [{"filename": "a.png"}, {"filename": "b.png"}]},
                "12": {"images": [{"filename": "c.png"}]}
            }"#,
        );

        let urls = collect_image_urls(&outputs, "http://host");
        assert_eq!(
            urls,
            vec![
                "http://host/view?filename=c.png",
                "http://host/view?filename=a.png",
                "http://host/view?filename=b.png",
            ]
        );
    }

    #[test]
    fn image_entry_without_filename_is_skipped() {
        let outputs = outputs(
            r#"{"9": {"images": [{"subfolder": "x"}, {"filename": "kept.png"}]}}"#,
        );

        let urls = collect_image_urls(&outputs, "http://host");
        assert_eq!(urls, vec!["http://host/view?filename=kept.png"]);
    }

    #[test]
    fn nodes_without_images_contribute_nothing() {
        let outputs = outputs(r#"{"9": {"text": ["done"]}, "10": {}}"#);
        assert!(collect_image_urls(&outputs, "http://host").is_empty());
    }

    #[test]
    fn non_list_images_value_is_ignored() {
        let outputs = outputs(r#"{"9": {"images": "not-a-list"}}"#);
        assert!(collect_image_urls(&outputs, "http://host").is_empty());
    }

    // -- Videos --

    #[test]
    fn collects_video_refs_with_explicit_fields() {
        let outputs = outputs(
            r#"{"5": {"gifs": [{"filename": "clip.webm", "format": "video/webm", "frame_rate": 24.0}]}}"#,
        );

        let videos = collect_video_refs(&outputs, "http://host");
        assert_eq!(
            videos,
            vec![VideoRef {
                url: "http://host/view?filename=clip.webm".into(),
                format: "video/webm".into(),
                frame_rate: 24.0,
                filename: "clip.webm".into(),
            }]
        );
    }

    #[test]
    fn video_defaults_applied_when_fields_absent() {
        let outputs = outputs(r#"{"5": {"gifs": [{"filename": "a.mp4"}]}}"#);

        let videos = collect_video_refs(&outputs, "http://host");
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].format, DEFAULT_VIDEO_FORMAT);
        assert_eq!(videos[0].frame_rate, DEFAULT_VIDEO_FRAME_RATE);
        assert_eq!(videos[0].filename, "a.mp4");
    }

    #[test]
    fn video_entry_without_filename_is_skipped() {
        let outputs = outputs(r#"{"5": {"gifs": [{"format": "video/webm"}]}}"#);
        assert!(collect_video_refs(&outputs, "http://host").is_empty());
    }

    #[test]
    fn mixed_node_results_extract_both_kinds() {
        let outputs = outputs(
            r#"{
                "5": {"gifs": [{"filename": "clip.mp4"}]},
                "9": {"images": [{"filename": "out.png"}]}
            }"#,
        );

        assert_eq!(
            collect_image_urls(&outputs, "http://host"),
            vec!["http://host/view?filename=out.png"]
        );
        assert_eq!(
            collect_video_refs(&outputs, "http://host")[0].url,
            "http://host/view?filename=clip.mp4"
        );
    }

    #[test]
    fn empty_outputs_yield_empty_lists() {
        let outputs = JobOutputs::new();
        assert!(collect_image_urls(&outputs, "http://host").is_empty());
        assert!(collect_video_refs(&outputs, "http://host").is_empty());
    }
}
