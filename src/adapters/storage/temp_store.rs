use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::application::dto::{ArtifactRole, StoredArtifact};
use crate::application::ports::ArtifactStorePort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::media::MediaKind;

/// Per-request artifacts under one directory, named `<uuid>-<role>.<ext>`.
/// Files are left for the host to clean up.
pub struct TempArtifactStore {
    root: PathBuf,
}

impl TempArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Accepts only names this store produces, so lookups cannot escape the root.
fn parse_file_name(file_name: &str) -> DomainResult<MediaKind> {
    let invalid = || DomainError::InvalidInput(format!("bad artifact name: {file_name}"));
    let (stem, _) = file_name.rsplit_once('.').ok_or_else(invalid)?;
    let (id, role) = stem.rsplit_once('-').ok_or_else(invalid)?;
    Uuid::parse_str(id).map_err(|_| invalid())?;
    if role != ArtifactRole::Input.as_str() && role != ArtifactRole::Annotated.as_str() {
        return Err(invalid());
    }
    MediaKind::from_file_name(file_name).map_err(|_| invalid())
}

#[async_trait]
impl ArtifactStorePort for TempArtifactStore {
    async fn save(
        &self,
        request_id: Uuid,
        role: ArtifactRole,
        kind: MediaKind,
        bytes: Vec<u8>,
    ) -> DomainResult<StoredArtifact> {
        let file_name = format!("{request_id}-{}.{}", role.as_str(), kind.extension());
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| DomainError::OperationFailed(format!("writing {}: {e}", path.display())))?;
        debug!("artifact stored: {} ({} bytes)", path.display(), bytes.len());
        Ok(StoredArtifact { file_name, role, kind, path })
    }

    async fn load(&self, file_name: &str) -> DomainResult<(MediaKind, Vec<u8>)> {
        let kind = parse_file_name(file_name)?;
        let path = self.root.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok((kind, bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DomainError::NotFound(format!("artifact {file_name}")))
            }
            Err(e) => Err(DomainError::OperationFailed(format!("reading {}: {e}", path.display()))),
        }
    }

    async fn remove(&self, artifact: &StoredArtifact) -> DomainResult<()> {
        parse_file_name(&artifact.file_name)?;
        let path = self.root.join(&artifact.file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("artifact removed: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::OperationFailed(format!("removing {}: {e}", path.display()))),
        }
    }
}
