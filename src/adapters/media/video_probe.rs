use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::VideoProbePort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::media::VideoInfo;

/// Reads frame count and frame rate from the MP4 sample tables of the first video track.
/// Nothing is decoded, so it needs no system libraries.
pub struct Mp4VideoProbe;

impl Mp4VideoProbe {
    fn probe_blocking(path: &Path) -> anyhow::Result<VideoInfo> {
        use anyhow::Context;

        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open '{}'", path.display()))?;
        let size = file.metadata()?.len();
        let reader = mp4::Mp4Reader::read_header(std::io::BufReader::new(file), size)
            .with_context(|| format!("'{}' is not a readable mp4", path.display()))?;

        let track = reader
            .tracks()
            .iter()
            .filter(|(_, t)| matches!(t.track_type(), Ok(mp4::TrackType::Video)))
            .min_by_key(|(id, _)| **id)
            .map(|(_, t)| t)
            .ok_or_else(|| anyhow::anyhow!("file has no video track"))?;

        let frame_count = u64::from(track.sample_count());
        // mp4's duration() divides by the media timescale
        let secs = if track.timescale() > 0 { track.duration().as_secs_f64() } else { 0.0 };
        let fps = if secs > 0.0 { frame_count as f64 / secs } else { 0.0 };
        Ok(VideoInfo { frame_count, fps })
    }
}

#[async_trait]
impl VideoProbePort for Mp4VideoProbe {
    async fn probe(&self, path: &Path) -> DomainResult<VideoInfo> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_blocking(&path))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("probe task: {e}")))?
            .map_err(|e| DomainError::Decode(format!("{e:#}")))
    }
}

/// Reads frame count and frame rate of the best video stream with FFmpeg.
#[cfg(feature = "video-ffmpeg")]
pub struct FfmpegVideoProbe;

#[cfg(feature = "video-ffmpeg")]
impl FfmpegVideoProbe {
    pub fn new() -> anyhow::Result<Self> {
        use anyhow::Context;
        ffmpeg_next::init().context("initialize ffmpeg")?;
        Ok(Self)
    }

    fn probe_blocking(path: &Path) -> anyhow::Result<VideoInfo> {
        use anyhow::Context;
        use ffmpeg_next as ffmpeg;

        let input = ffmpeg::format::input(&path)
            .with_context(|| format!("failed to open '{}' with ffmpeg", path.display()))?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("file has no video track"))?;

        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 { f64::from(rate) } else { 0.0 };

        // some muxers leave nb_frames empty; fall back to duration x rate
        let frame_count = match stream.frames() {
            n if n > 0 => n as u64,
            _ => {
                let secs = stream.duration() as f64 * f64::from(stream.time_base());
                if secs.is_finite() && secs > 0.0 && fps > 0.0 { (secs * fps).round() as u64 } else { 0 }
            }
        };
        Ok(VideoInfo { frame_count, fps })
    }
}

#[cfg(feature = "video-ffmpeg")]
#[async_trait]
impl VideoProbePort for FfmpegVideoProbe {
    async fn probe(&self, path: &Path) -> DomainResult<VideoInfo> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_blocking(&path))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("probe task: {e}")))?
            .map_err(|e| DomainError::Decode(format!("{e:#}")))
    }
}
