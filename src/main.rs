use std::sync::Arc;
use clap::Parser;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use shipwatch::adapters::{
    http::{router, state::HttpState},
    media::{image_codec::ImageCodec, video_probe},
    onnx::{detector::LazyDetector, labels::LabelTable, model_catalog::OnnxModelCatalog},
    render::overlay::BoxOverlay,
    storage::temp_store::TempArtifactStore,
};
use shipwatch::application::{
    annotator::Annotator,
    ports::{ArtifactStorePort, VideoProbePort},
    services::{DetectionService, ModelService},
};
use shipwatch::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logs (RUST_LOG=info by default)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::parse();
    tracing::info!("🔧 Initializing adapters...");

    // 2. Infrastructure adapters
    let labels = match &cfg.labels {
        Some(path) => LabelTable::from_file(path)?,
        None => LabelTable::default(),
    };
    tracing::info!("Label table: {} classes", labels.len());

    let detector = Arc::new(LazyDetector::new(cfg.inference_config(), labels, engine_loader()));
    let model_cat = Arc::new(OnnxModelCatalog::new());
    let store = Arc::new(TempArtifactStore::new(cfg.artifact_dir())?);
    let artifacts: Arc<dyn ArtifactStorePort> = store.clone();
    tracing::info!("📂 Artifacts written to {}", store.root().display());

    // 3. Use-case services
    let detection_service = Arc::new(DetectionService::new(
        detector.clone(),
        Arc::new(ImageCodec::new()),
        Annotator::new(Arc::new(BoxOverlay::default())),
        build_video_probe()?,
        artifacts.clone(),
    ));
    let model_service = Arc::new(ModelService::new(detector, model_cat));

    // Check the configured model up front; a bad path is only a warning until it is used.
    let initial = model_service.current().await;
    if let Err(e) = model_service.configure(initial).await {
        tracing::warn!("⚠️ Configured model is not usable yet: {}", e);
    }

    // 4. HTTP state + router + static files
    let state = HttpState {
        detection: detection_service,
        model: model_service,
        artifacts,
    };
    let app = router(state, cfg.max_upload_bytes())
        .fallback_service(ServeDir::new(&cfg.static_dir));

    // 5. Serve
    tracing::info!("🚀 Detection server listening on http://{}", cfg.bind);
    tracing::info!("📂 Static files served from {}", cfg.static_dir.display());

    let listener = tokio::net::TcpListener::bind(&cfg.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "onnx")]
fn engine_loader() -> Arc<shipwatch::adapters::onnx::detector::EngineLoader> {
    shipwatch::adapters::onnx::detector::onnx_loader()
}

#[cfg(not(feature = "onnx"))]
fn engine_loader() -> Arc<shipwatch::adapters::onnx::detector::EngineLoader> {
    Arc::new(|path: &str| -> anyhow::Result<Box<dyn shipwatch::adapters::onnx::detector::InferenceEngine>> {
        anyhow::bail!("cannot load {path}: built without the `onnx` feature")
    })
}

#[cfg(feature = "video-ffmpeg")]
fn build_video_probe() -> anyhow::Result<Arc<dyn VideoProbePort>> {
    Ok(Arc::new(video_probe::FfmpegVideoProbe::new()?))
}

#[cfg(not(feature = "video-ffmpeg"))]
fn build_video_probe() -> anyhow::Result<Arc<dyn VideoProbePort>> {
    Ok(Arc::new(video_probe::Mp4VideoProbe))
}
