use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::{
        annotator::Annotator,
        dto::{ArtifactRole, DetectionOutcome},
        ports::{ArtifactStorePort, DetectorPort, ImageCodecPort, ModelCatalogPort, VideoProbePort},
    },
    domain::{
        errors::{DomainError, DomainResult},
        media::{ImageEncoding, MediaKind},
        model::InferenceConfig,
        summary::summarize,
    },
};

/// Runs one uploaded file through detection, annotation and summarization.
/// Every call gets its own request id, so concurrent uploads never share artifacts.
#[derive(Clone)]
pub struct DetectionService {
    detector: Arc<dyn DetectorPort>,
    codec: Arc<dyn ImageCodecPort>,
    annotator: Annotator,
    video_probe: Arc<dyn VideoProbePort>,
    artifacts: Arc<dyn ArtifactStorePort>,
}

impl DetectionService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        codec: Arc<dyn ImageCodecPort>,
        annotator: Annotator,
        video_probe: Arc<dyn VideoProbePort>,
        artifacts: Arc<dyn ArtifactStorePort>,
    ) -> Self {
        Self { detector, codec, annotator, video_probe, artifacts }
    }

    /// `expected` lets the caller insist on an image or a video; the file
    /// extension still decides the concrete encoding.
    pub async fn process_upload(
        &self,
        file_name: &str,
        expected: Option<UploadKind>,
        bytes: Vec<u8>,
    ) -> DomainResult<DetectionOutcome> {
        let kind = MediaKind::from_file_name(file_name)?;
        if let Some(expected) = expected {
            if expected.is_video() != kind.is_video() {
                return Err(DomainError::InvalidInput(format!(
                    "{file_name} is not a {} file",
                    expected.as_str()
                )));
            }
        }
        if bytes.is_empty() {
            return Err(DomainError::Decode(format!("{file_name} is empty")));
        }

        match kind {
            MediaKind::Image(encoding) => self.process_image(encoding, bytes).await,
            MediaKind::Mp4 => self.process_video(bytes).await,
        }
    }

    pub async fn process_image(
        &self,
        encoding: ImageEncoding,
        bytes: Vec<u8>,
    ) -> DomainResult<DetectionOutcome> {
        let request_id = Uuid::new_v4();
        let mut image = self.codec.decode(&bytes, encoding)?;
        info!(%request_id, width = image.width(), height = image.height(), "processing image");

        let input = self
            .artifacts
            .save(request_id, ArtifactRole::Input, MediaKind::Image(encoding), bytes)
            .await?;

        let raw = self.detector.detect(image.clone()).await?;
        let detections = self.annotator.annotate(&mut image, &raw);
        if detections.is_empty() {
            info!(%request_id, "no objects detected");
        }

        let encoded = self.codec.encode(&image, encoding)?;
        let annotated = self
            .artifacts
            .save(request_id, ArtifactRole::Annotated, MediaKind::Image(encoding), encoded)
            .await?;

        let summary = summarize(&detections, None);
        info!(%request_id, total = summary.total_objects, "image processed");
        Ok(DetectionOutcome::Image { detections, summary, input, annotated })
    }

    /// Videos are only probed for length; frames are never run through the detector.
    pub async fn process_video(&self, bytes: Vec<u8>) -> DomainResult<DetectionOutcome> {
        let request_id = Uuid::new_v4();
        let input = self
            .artifacts
            .save(request_id, ArtifactRole::Input, MediaKind::Mp4, bytes)
            .await?;

        let info = match self.video_probe.probe(&input.path).await {
            Ok(info) => info,
            Err(e) => {
                warn!(%request_id, "video probe failed: {e}");
                // nothing links to the upload once this request fails
                if let Err(cleanup) = self.artifacts.remove(&input).await {
                    warn!(%request_id, "could not remove {}: {cleanup}", input.file_name);
                }
                return Err(e);
            }
        };
        info!(%request_id, frames = info.frame_count, fps = info.fps, "video probed");

        let summary = summarize(&[], Some(&info));
        Ok(DetectionOutcome::Video { info, summary, input })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
}

impl UploadKind {
    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(DomainError::InvalidInput(format!("unknown input type: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Owns the model configuration: validates a new model before handing it to the detector.
#[derive(Clone)]
pub struct ModelService {
    detector: Arc<dyn DetectorPort>,
    model_catalog: Arc<dyn ModelCatalogPort>,
}

impl ModelService {
    pub fn new(detector: Arc<dyn DetectorPort>, model_catalog: Arc<dyn ModelCatalogPort>) -> Self {
        Self { detector, model_catalog }
    }

    pub async fn configure(&self, infer: InferenceConfig) -> DomainResult<()> {
        self.model_catalog.validate_model(&infer.model).await?;
        if !(0.0..=1.0).contains(&infer.params.conf_threshold)
            || !(0.0..=1.0).contains(&infer.params.iou_threshold)
        {
            return Err(DomainError::InvalidInput("thresholds must lie in [0, 1]".into()));
        }
        if infer.params.input_size == 0 || infer.params.max_detections == 0 {
            return Err(DomainError::InvalidInput(
                "input_size and max_detections must be positive".into(),
            ));
        }
        self.detector.configure(infer).await
    }

    pub async fn current(&self) -> InferenceConfig {
        self.detector.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::StoredArtifact;
    use crate::application::ports::OverlayPort;
    use crate::domain::detection::{Detection, RawDetection};
    use crate::domain::media::VideoInfo;
    use crate::domain::model::{DetectorParams, ModelId};
    use crate::domain::summary::RiskLevel;
    use async_trait::async_trait;
    use image::RgbImage;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct FixedDetector {
        out: Vec<RawDetection>,
        config: Mutex<InferenceConfig>,
    }

    #[async_trait]
    impl DetectorPort for FixedDetector {
        async fn configure(&self, infer: InferenceConfig) -> DomainResult<()> {
            *self.config.lock().unwrap() = infer;
            Ok(())
        }
        async fn current(&self) -> InferenceConfig {
            self.config.lock().unwrap().clone()
        }
        async fn detect(&self, _image: RgbImage) -> DomainResult<Vec<RawDetection>> {
            Ok(self.out.clone())
        }
    }

    struct PlainCodec;

    impl ImageCodecPort for PlainCodec {
        fn decode(&self, bytes: &[u8], _encoding: ImageEncoding) -> DomainResult<RgbImage> {
            if bytes == b"img" {
                Ok(RgbImage::new(64, 64))
            } else {
                Err(DomainError::Decode("garbage".into()))
            }
        }
        fn encode(&self, _image: &RgbImage, _encoding: ImageEncoding) -> DomainResult<Vec<u8>> {
            Ok(b"annotated".to_vec())
        }
    }

    struct NoOverlay;

    impl OverlayPort for NoOverlay {
        fn draw(&self, _image: &mut RgbImage, _detections: &[Detection]) {}
    }

    struct FixedProbe(VideoInfo);

    #[async_trait]
    impl VideoProbePort for FixedProbe {
        async fn probe(&self, _path: &Path) -> DomainResult<VideoInfo> {
            Ok(self.0)
        }
    }

    struct BrokenProbe;

    #[async_trait]
    impl VideoProbePort for BrokenProbe {
        async fn probe(&self, path: &Path) -> DomainResult<VideoInfo> {
            Err(DomainError::Decode(format!("{} has no video track", path.display())))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<(Uuid, ArtifactRole, Vec<u8>)>>,
        removed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ArtifactStorePort for MemoryStore {
        async fn save(
            &self,
            request_id: Uuid,
            role: ArtifactRole,
            kind: MediaKind,
            bytes: Vec<u8>,
        ) -> DomainResult<StoredArtifact> {
            self.saved.lock().unwrap().push((request_id, role, bytes));
            let file_name = format!("{request_id}-{}.{}", role.as_str(), kind.extension());
            Ok(StoredArtifact { path: PathBuf::from(&file_name), file_name, role, kind })
        }
        async fn load(&self, file_name: &str) -> DomainResult<(MediaKind, Vec<u8>)> {
            Err(DomainError::NotFound(file_name.into()))
        }
        async fn remove(&self, artifact: &StoredArtifact) -> DomainResult<()> {
            self.removed.lock().unwrap().push(artifact.file_name.clone());
            Ok(())
        }
    }

    fn raw(label: &str, score: f32) -> RawDetection {
        RawDetection { x1: 10.0, y1: 10.0, x2: 20.0, y2: 20.0, score, class_id: 0, label: label.into() }
    }

    fn config() -> InferenceConfig {
        InferenceConfig {
            model: ModelId { name: "best".into(), onnx_path: "best.onnx".into() },
            params: DetectorParams::default(),
        }
    }

    fn service(out: Vec<RawDetection>, store: Arc<MemoryStore>) -> DetectionService {
        DetectionService::new(
            Arc::new(FixedDetector { out, config: Mutex::new(config()) }),
            Arc::new(PlainCodec),
            Annotator::new(Arc::new(NoOverlay)),
            Arc::new(FixedProbe(VideoInfo { frame_count: 300, fps: 30.0 })),
            store,
        )
    }

    #[tokio::test]
    async fn image_upload_produces_summary_and_two_artifacts() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(vec![raw("ship", 0.9), raw("ship", 0.8), raw("cloud", 0.7)], store.clone());

        let outcome = svc.process_upload("harbor.jpg", None, b"img".to_vec()).await.unwrap();
        let DetectionOutcome::Image { detections, summary, input, annotated } = outcome else {
            panic!("expected image outcome");
        };
        assert_eq!(detections.len(), 3);
        assert_eq!(summary.total_objects, 3);
        assert_eq!(summary.avg_confidence, 80.0);
        assert_eq!(summary.risk, Some(RiskLevel::NoRisk));
        assert_eq!(input.role, ArtifactRole::Input);
        assert!(annotated.file_name.ends_with("-annotated.jpg"));

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].0, saved[1].0, "artifacts share the request id");
        assert_eq!(saved[1].2, b"annotated".to_vec());
    }

    #[tokio::test]
    async fn requests_get_distinct_ids() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(Vec::new(), store.clone());
        svc.process_upload("a.png", None, b"img".to_vec()).await.unwrap();
        svc.process_upload("a.png", None, b"img".to_vec()).await.unwrap();
        let saved = store.saved.lock().unwrap();
        assert_ne!(saved[0].0, saved[2].0);
    }

    #[tokio::test]
    async fn corrupt_image_is_a_decode_error() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(vec![raw("ship", 0.9)], store.clone());
        let err = svc.process_upload("x.png", None, b"nope".to_vec()).await.unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
        assert!(store.saved.lock().unwrap().is_empty());

        let err = svc.process_upload("x.png", None, Vec::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
    }

    #[tokio::test]
    async fn video_upload_only_yields_speed() {
        let svc = service(vec![raw("ship", 0.9)], Arc::new(MemoryStore::default()));
        let outcome = svc
            .process_upload("clip.mp4", Some(UploadKind::Video), b"mp4".to_vec())
            .await
            .unwrap();
        let DetectionOutcome::Video { summary, info, .. } = outcome else {
            panic!("expected video outcome");
        };
        assert_eq!(info.frame_count, 300);
        assert_eq!(summary.total_objects, 0);
        assert_eq!(summary.speed.map(|s| s.knots), Some(15.0));
    }

    #[tokio::test]
    async fn unreadable_video_drops_the_stored_upload() {
        let store = Arc::new(MemoryStore::default());
        let svc = DetectionService::new(
            Arc::new(FixedDetector { out: Vec::new(), config: Mutex::new(config()) }),
            Arc::new(PlainCodec),
            Annotator::new(Arc::new(NoOverlay)),
            Arc::new(BrokenProbe),
            store.clone(),
        );
        let err = svc.process_upload("clip.mp4", None, b"mp4".to_vec()).await.unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));

        let saved = store.saved.lock().unwrap();
        let removed = store.removed.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(*removed, vec![format!("{}-input.mp4", saved[0].0)]);
    }

    #[tokio::test]
    async fn declared_kind_must_match_extension() {
        let svc = service(Vec::new(), Arc::new(MemoryStore::default()));
        let err = svc
            .process_upload("clip.mp4", Some(UploadKind::Image), b"mp4".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    struct AcceptAll;

    #[async_trait]
    impl ModelCatalogPort for AcceptAll {
        async fn validate_model(&self, _model: &ModelId) -> DomainResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn model_service_rejects_bad_thresholds() {
        let detector = Arc::new(FixedDetector { out: Vec::new(), config: Mutex::new(config()) });
        let svc = ModelService::new(detector, Arc::new(AcceptAll));

        let mut bad = config();
        bad.params.conf_threshold = 1.5;
        assert!(matches!(svc.configure(bad).await, Err(DomainError::InvalidInput(_))));

        let mut good = config();
        good.model.onnx_path = "other.onnx".into();
        svc.configure(good.clone()).await.unwrap();
        assert_eq!(svc.current().await, good);
    }
}
