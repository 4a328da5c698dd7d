use clap::Parser;
use std::path::{Path, PathBuf};

use crate::domain::model::{DetectorParams, InferenceConfig, ModelId};

/// Command line / environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "shipwatch-dashboard", version, about = "Ship & object detection dashboard")]
pub struct AppConfig {
    /// Address the HTTP server listens on
    #[arg(long, env = "SHIPWATCH_BIND", default_value = "0.0.0.0:8090")]
    pub bind: String,

    /// ONNX weights; loaded on the first detection
    #[arg(long, env = "SHIPWATCH_MODEL", default_value = "models/best.onnx")]
    pub model: String,

    /// Label table, one class name per line (defaults to ship/cargo/island/cloud)
    #[arg(long, env = "SHIPWATCH_LABELS")]
    pub labels: Option<PathBuf>,

    #[arg(long, env = "SHIPWATCH_IMGSZ", default_value_t = 640)]
    pub input_size: u32,

    #[arg(long, env = "SHIPWATCH_CONF", default_value_t = 0.25)]
    pub conf_threshold: f32,

    #[arg(long, env = "SHIPWATCH_IOU", default_value_t = 0.45)]
    pub iou_threshold: f32,

    #[arg(long, env = "SHIPWATCH_MAX_DET", default_value_t = 100)]
    pub max_detections: usize,

    /// Where per-request uploads and annotated outputs are written
    #[arg(long, env = "SHIPWATCH_ARTIFACT_DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Front-end files served at `/`
    #[arg(long, env = "SHIPWATCH_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Upload size limit in MiB
    #[arg(long, env = "SHIPWATCH_MAX_UPLOAD_MB", default_value_t = 200)]
    pub max_upload_mb: usize,
}

impl AppConfig {
    pub fn inference_config(&self) -> InferenceConfig {
        let name = Path::new(&self.model)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        InferenceConfig {
            model: ModelId { name, onnx_path: self.model.clone() },
            params: DetectorParams {
                input_size: self.input_size,
                conf_threshold: self.conf_threshold,
                iou_threshold: self.iou_threshold,
                max_detections: self.max_detections,
            },
        }
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("shipwatch"))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
