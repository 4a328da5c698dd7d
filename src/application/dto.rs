use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::{
    detection::Detection,
    media::{MediaKind, VideoInfo},
    model::{DetectorParams, InferenceConfig, ModelId},
    summary::Summary,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    Input,
    Annotated,
}

impl ArtifactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Annotated => "annotated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredArtifact {
    pub file_name: String,
    pub role: ArtifactRole,
    pub kind: MediaKind,
    #[serde(skip)]
    pub path: PathBuf,
}

impl StoredArtifact {
    pub fn url(&self) -> String {
        format!("/api/artifacts/{}", self.file_name)
    }
}

/// Result of one processed upload.
#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    Image {
        detections: Vec<Detection>,
        summary: Summary,
        input: StoredArtifact,
        annotated: StoredArtifact,
    },
    Video {
        info: VideoInfo,
        summary: Summary,
        input: StoredArtifact,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureModelRequest {
    pub onnx_path: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub input_size: Option<u32>,
    #[serde(default)]
    pub conf_threshold: Option<f32>,
    #[serde(default)]
    pub iou_threshold: Option<f32>,
    #[serde(default)]
    pub max_detections: Option<usize>,
}

impl ConfigureModelRequest {
    /// Fields left out keep their current values.
    pub fn merge_into(self, current: &InferenceConfig) -> InferenceConfig {
        let defaults = &current.params;
        InferenceConfig {
            model: ModelId {
                name: self.model_name.unwrap_or_else(|| current.model.name.clone()),
                onnx_path: self.onnx_path,
            },
            params: DetectorParams {
                input_size: self.input_size.unwrap_or(defaults.input_size),
                conf_threshold: self.conf_threshold.unwrap_or(defaults.conf_threshold),
                iou_threshold: self.iou_threshold.unwrap_or(defaults.iou_threshold),
                max_detections: self.max_detections.unwrap_or(defaults.max_detections),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub kind: MediaKind,
    pub summary: Summary,
    pub report: String,
    pub detections: Vec<Detection>,
    pub input_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoInfo>,
}

impl From<DetectionOutcome> for DetectResponse {
    fn from(outcome: DetectionOutcome) -> Self {
        match outcome {
            DetectionOutcome::Image { detections, summary, input, annotated } => Self {
                kind: input.kind,
                report: summary.render_report(),
                summary,
                detections,
                input_url: input.url(),
                annotated_url: Some(annotated.url()),
                video: None,
            },
            DetectionOutcome::Video { info, summary, input } => Self {
                kind: input.kind,
                report: summary.render_report(),
                summary,
                detections: Vec::new(),
                input_url: input.url(),
                annotated_url: None,
                video: Some(info),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}
