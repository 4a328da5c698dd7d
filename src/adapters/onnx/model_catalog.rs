use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self { Self }
}

impl Default for OnnxModelCatalog {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        if model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("onnx_path empty".into()));
        }
        let path = Path::new(&model.onnx_path);
        let is_onnx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("onnx"));
        if !is_onnx {
            return Err(DomainError::InvalidInput(format!("not an .onnx file: {}", model.onnx_path)));
        }
        if !path.is_file() {
            return Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(path: &str) -> ModelId {
        ModelId { name: "best".into(), onnx_path: path.into() }
    }

    #[tokio::test]
    async fn rejects_empty_wrong_extension_and_missing() {
        let cat = OnnxModelCatalog::new();
        assert!(matches!(cat.validate_model(&model("  ")).await, Err(DomainError::InvalidInput(_))));
        assert!(matches!(cat.validate_model(&model("best.pt")).await, Err(DomainError::InvalidInput(_))));
        assert!(matches!(
            cat.validate_model(&model("/definitely/missing/best.onnx")).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn accepts_existing_onnx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.onnx");
        std::fs::write(&path, b"onnx").unwrap();
        let cat = OnnxModelCatalog::new();
        cat.validate_model(&model(path.to_str().unwrap())).await.unwrap();
    }
}
