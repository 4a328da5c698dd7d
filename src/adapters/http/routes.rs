use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::adapters::http::state::HttpState;
use crate::application::dto::{ConfigureModelRequest, DetectResponse, ErrorResponse, OkResponse};
use crate::application::services::UploadKind;
use crate::domain::errors::DomainError;

/// Maps domain failures onto HTTP answers.
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, None),
            // a broken upload is reported, never fatal for the server
            DomainError::Decode(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some("No objects detected".to_string()))
            }
            DomainError::Unsupported(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, None),
            DomainError::Inference(_) | DomainError::OperationFailed(_) => {
                error!("request failed: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };
        (status, Json(ErrorResponse { error: self.0.to_string(), message })).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    let cfg = st.model.current().await;
    Json(json!({
        "model_name": cfg.model.name,
        "model_path": cfg.model.onnx_path,
        "imgsz": cfg.params.input_size,
        "conf_thres": cfg.params.conf_threshold,
        "iou_thres": cfg.params.iou_threshold,
        "max_det": cfg.params.max_detections,
        "accepted_types": ["png", "jpg", "jpeg", "mp4"],
    }))
}

pub async fn configure_model(
    State(st): State<HttpState>,
    Json(req): Json<ConfigureModelRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let infer = req.merge_into(&st.model.current().await);
    st.model.configure(infer).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Multipart upload: a `file` part and an optional `kind` part (`image` / `video`).
pub async fn detect(
    State(st): State<HttpState>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut expected: Option<UploadKind> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::InvalidInput(format!("multipart: {e}")))?
    {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| DomainError::InvalidInput(format!("reading upload: {e}")))?;
                upload = Some((name, bytes.to_vec()));
            }
            Some("kind") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| DomainError::InvalidInput(format!("reading kind: {e}")))?;
                expected = Some(UploadKind::parse(&text)?);
            }
            other => warn!("ignoring multipart field {:?}", other),
        }
    }

    let Some((file_name, bytes)) = upload else {
        return Err(DomainError::InvalidInput("missing `file` part".into()).into());
    };

    let outcome = st.detection.process_upload(&file_name, expected, bytes).await?;
    Ok(Json(DetectResponse::from(outcome)))
}

pub async fn get_artifact(
    State(st): State<HttpState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let (kind, bytes) = st.artifacts.load(&file).await?;
    let disposition = format!("inline; filename=\"{file}\"");
    Ok((
        [(header::CONTENT_TYPE, kind.content_type().to_string()), (header::CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response())
}
