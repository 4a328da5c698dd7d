use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image(ImageEncoding),
    Mp4,
}

impl MediaKind {
    /// Accepted uploads: png, jpg/jpeg and mp4.
    pub fn from_file_name(name: &str) -> DomainResult<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| DomainError::Unsupported(format!("file without extension: {name}")))?;
        match ext.as_str() {
            "png" => Ok(Self::Image(ImageEncoding::Png)),
            "jpg" | "jpeg" => Ok(Self::Image(ImageEncoding::Jpeg)),
            "mp4" => Ok(Self::Mp4),
            other => Err(DomainError::Unsupported(format!("file type .{other}"))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image(ImageEncoding::Png) => "png",
            Self::Image(ImageEncoding::Jpeg) => "jpg",
            Self::Mp4 => "mp4",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Image(ImageEncoding::Png) => "image/png",
            Self::Image(ImageEncoding::Jpeg) => "image/jpeg",
            Self::Mp4 => "video/mp4",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Mp4)
    }
}

/// What the video path needs from a clip: no frame is ever decoded for detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VideoInfo {
    pub frame_count: u64,
    pub fps: f64,
}
