use anyhow::Result;
use async_trait::async_trait;
use image::RgbImage;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{error, info};

use crate::adapters::onnx::labels::LabelTable;
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::RawDetection,
    errors::{DomainError, DomainResult},
    model::{DetectorParams, InferenceConfig},
};

/// A loaded model able to run one image at a time.
pub trait InferenceEngine: Send {
    fn infer(
        &mut self,
        rgb: &RgbImage,
        params: &DetectorParams,
        labels: &LabelTable,
    ) -> Result<Vec<RawDetection>>;
}

pub type EngineLoader = dyn Fn(&str) -> Result<Box<dyn InferenceEngine>> + Send + Sync;

#[derive(Default)]
struct EngineSlot {
    loaded_path: Option<String>,
    engine: Option<Box<dyn InferenceEngine>>,
}

/// Lazily loaded model handle. The engine is built on the first detection,
/// reused afterwards and rebuilt only when the configured model path changes.
/// Inference is serialized through the slot lock.
pub struct LazyDetector {
    cfg: RwLock<InferenceConfig>,
    labels: Arc<LabelTable>,
    slot: Arc<Mutex<EngineSlot>>,
    loader: Arc<EngineLoader>,
}

impl LazyDetector {
    pub fn new(cfg: InferenceConfig, labels: LabelTable, loader: Arc<EngineLoader>) -> Self {
        Self {
            cfg: RwLock::new(cfg),
            labels: Arc::new(labels),
            slot: Arc::new(Mutex::new(EngineSlot::default())),
            loader,
        }
    }

    fn snapshot(&self) -> DomainResult<InferenceConfig> {
        self.cfg
            .read()
            .map(|c| c.clone())
            .map_err(|_| DomainError::OperationFailed("model config lock poisoned".into()))
    }
}

#[async_trait]
impl DetectorPort for LazyDetector {
    async fn configure(&self, infer: InferenceConfig) -> DomainResult<()> {
        let mut lock = self.cfg.write()
            .map_err(|_| DomainError::OperationFailed("model config lock poisoned".into()))?;
        info!("Detector configured: {} ({})", infer.model.name, infer.model.onnx_path);
        *lock = infer;
        Ok(())
    }

    async fn current(&self) -> InferenceConfig {
        match self.cfg.read() {
            Ok(c) => c.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<RawDetection>> {
        let current = self.snapshot()?;
        let slot = self.slot.clone();
        let loader = self.loader.clone();
        let labels = self.labels.clone();

        tokio::task::spawn_blocking(move || -> DomainResult<Vec<RawDetection>> {
            let mut slot = slot
                .lock()
                .map_err(|_| DomainError::OperationFailed("engine lock poisoned".into()))?;

            let path = &current.model.onnx_path;
            if slot.loaded_path.as_deref() != Some(path.as_str()) || slot.engine.is_none() {
                info!("Loading model {}", path);
                slot.engine = None;
                slot.loaded_path = None;
                let engine = (*loader)(path).map_err(|e| {
                    error!("Error loading model {}: {:?}", path, e);
                    DomainError::Inference(format!("loading {path}: {e:#}"))
                })?;
                slot.engine = Some(engine);
                slot.loaded_path = Some(path.clone());
            }

            let Some(engine) = slot.engine.as_mut() else {
                return Err(DomainError::Inference("model not loaded".into()));
            };
            let started = std::time::Instant::now();
            let detections = engine
                .infer(&image, &current.params, &labels)
                .map_err(|e| DomainError::Inference(format!("{e:#}")))?;
            info!(
                "Inference: {} detections in {:.1} ms",
                detections.len(),
                started.elapsed().as_secs_f32() * 1000.0
            );
            Ok(detections)
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("inference task: {e}")))?
    }
}

/// Loader backed by ONNX Runtime.
#[cfg(feature = "onnx")]
pub fn onnx_loader() -> Arc<EngineLoader> {
    use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
    Arc::new(|path: &str| -> Result<Box<dyn InferenceEngine>> {
        Ok(Box::new(OnnxYoloEngine::load(path)?))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ModelId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoEngine {
        path: String,
    }

    impl InferenceEngine for EchoEngine {
        fn infer(&mut self, _rgb: &RgbImage, _p: &DetectorParams, labels: &LabelTable) -> Result<Vec<RawDetection>> {
            Ok(vec![RawDetection {
                x1: 0.0,
                y1: 0.0,
                x2: 4.0,
                y2: 4.0,
                score: 0.5,
                class_id: 1,
                label: format!("{}@{}", labels.name(1), self.path),
            }])
        }
    }

    fn config(path: &str) -> InferenceConfig {
        InferenceConfig {
            model: ModelId { name: "m".into(), onnx_path: path.into() },
            params: DetectorParams::default(),
        }
    }

    fn counting_loader(loads: Arc<AtomicUsize>) -> Arc<EngineLoader> {
        Arc::new(move |path: &str| -> Result<Box<dyn InferenceEngine>> {
            loads.fetch_add(1, Ordering::SeqCst);
            if path == "missing.onnx" {
                anyhow::bail!("no such file");
            }
            Ok(Box::new(EchoEngine { path: path.to_string() }))
        })
    }

    #[tokio::test]
    async fn loads_once_and_reuses_engine() {
        let loads = Arc::new(AtomicUsize::new(0));
        let det = LazyDetector::new(config("a.onnx"), LabelTable::default(), counting_loader(loads.clone()));
        assert_eq!(loads.load(Ordering::SeqCst), 0, "nothing loaded before first use");

        let first = det.detect(RgbImage::new(4, 4)).await.unwrap();
        det.detect(RgbImage::new(4, 4)).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(first[0].label, "cargo@a.onnx");
    }

    #[tokio::test]
    async fn reloads_when_model_path_changes() {
        let loads = Arc::new(AtomicUsize::new(0));
        let det = LazyDetector::new(config("a.onnx"), LabelTable::default(), counting_loader(loads.clone()));
        det.detect(RgbImage::new(4, 4)).await.unwrap();

        det.configure(config("b.onnx")).await.unwrap();
        let out = det.detect(RgbImage::new(4, 4)).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(out[0].label, "cargo@b.onnx");
        assert_eq!(det.current().await.model.onnx_path, "b.onnx");
    }

    #[tokio::test]
    async fn load_failure_surfaces_as_inference_error() {
        let loads = Arc::new(AtomicUsize::new(0));
        let det = LazyDetector::new(config("missing.onnx"), LabelTable::default(), counting_loader(loads));
        let err = det.detect(RgbImage::new(4, 4)).await.unwrap_err();
        assert!(matches!(err, DomainError::Inference(_)));
    }
}
