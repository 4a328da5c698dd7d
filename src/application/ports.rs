use async_trait::async_trait;
use image::RgbImage;
use std::path::Path;

use crate::domain::{
    detection::{Detection, RawDetection},
    errors::DomainResult,
    media::{ImageEncoding, MediaKind, VideoInfo},
    model::{InferenceConfig, ModelId},
};
use crate::application::dto::{ArtifactRole, StoredArtifact};

#[async_trait]
pub trait DetectorPort: Send + Sync {
    /// Swaps the model configuration; the engine is (re)loaded on next use.
    async fn configure(&self, infer: InferenceConfig) -> DomainResult<()>;
    async fn current(&self) -> InferenceConfig;
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<RawDetection>>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

#[async_trait]
pub trait VideoProbePort: Send + Sync {
    async fn probe(&self, path: &Path) -> DomainResult<VideoInfo>;
}

#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    async fn save(
        &self,
        request_id: uuid::Uuid,
        role: ArtifactRole,
        kind: MediaKind,
        bytes: Vec<u8>,
    ) -> DomainResult<StoredArtifact>;
    async fn load(&self, file_name: &str) -> DomainResult<(MediaKind, Vec<u8>)>;
    /// Drops an artifact no response will point to; a missing file is not an error.
    async fn remove(&self, artifact: &StoredArtifact) -> DomainResult<()>;
}

pub trait ImageCodecPort: Send + Sync {
    fn decode(&self, bytes: &[u8], encoding: ImageEncoding) -> DomainResult<RgbImage>;
    fn encode(&self, image: &RgbImage, encoding: ImageEncoding) -> DomainResult<Vec<u8>>;
}

/// Draws boxes and label blocks onto an image in place.
pub trait OverlayPort: Send + Sync {
    fn draw(&self, image: &mut RgbImage, detections: &[Detection]);
}
