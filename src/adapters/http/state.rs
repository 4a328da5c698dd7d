use std::sync::Arc;
use crate::application::ports::ArtifactStorePort;
use crate::application::services::{DetectionService, ModelService};

/// Shared state for the axum handlers: the use-case services plus artifact lookup.
#[derive(Clone)]
pub struct HttpState {
    /// Upload processing: detection, annotation, summary.
    pub detection: Arc<DetectionService>,
    /// Model configuration and reload.
    pub model: Arc<ModelService>,
    pub artifacts: Arc<dyn ArtifactStorePort>,
}
