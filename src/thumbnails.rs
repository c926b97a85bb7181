//! Thumbnail generation capability
//!
//! The backend is chosen once at startup by [`initialize`] and handed to the
//! sync service. Callers treat every failure as non-fatal.

use async_trait::async_trait;
use bjj_core::ClipId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ThumbnailConfig;

/// Error types for thumbnail generation
#[derive(thiserror::Error, Debug)]
pub enum ThumbnailError {
    #[error("Thumbnail generation unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffmpeg failed for {path}: {message}")]
    Ffmpeg { path: PathBuf, message: String },
}

/// Produces a thumbnail image for a clip
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Generate a thumbnail for `file_path`, returning a reference to it
    async fn generate(
        &self,
        file_path: &Path,
        clip_id: ClipId,
    ) -> Result<Option<String>, ThumbnailError>;
}

/// Extracts a single frame with ffmpeg
#[derive(Debug, Clone)]
pub struct FfmpegThumbnailGenerator {
    ffmpeg_path: String,
    output_dir: PathBuf,
    seek_seconds: f64,
    width: u32,
}

impl FfmpegThumbnailGenerator {
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            output_dir: config.output_dir.clone(),
            seek_seconds: config.seek_seconds,
            width: config.width,
        }
    }

    /// Where the thumbnail for a clip is written
    pub fn thumbnail_path(&self, clip_id: ClipId) -> PathBuf {
        self.output_dir.join(format!("clip_{}.jpg", clip_id))
    }
}

#[async_trait]
impl ThumbnailGenerator for FfmpegThumbnailGenerator {
    async fn generate(
        &self,
        file_path: &Path,
        clip_id: ClipId,
    ) -> Result<Option<String>, ThumbnailError> {
        let thumbnail_path = self.thumbnail_path(clip_id);
        let seek = format!("{:.2}", self.seek_seconds);
        let scale = format!("scale={}:-1", self.width);

        let output = tokio::process::Command::new(&self.ffmpeg_path)
            .arg("-ss")
            .arg(&seek)
            .arg("-i")
            .arg(file_path)
            .args(["-vframes", "1", "-vf", &scale, "-q:v", "2", "-y"])
            .arg(&thumbnail_path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThumbnailError::Ffmpeg {
                path: file_path.to_path_buf(),
                message: stderr.lines().last().unwrap_or("unknown error").to_string(),
            });
        }

        Ok(Some(thumbnail_path.to_string_lossy().to_string()))
    }
}

/// Backend used when thumbnails are disabled or ffmpeg is missing
#[derive(Debug, Clone)]
pub struct UnavailableThumbnails {
    reason: String,
}

impl UnavailableThumbnails {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl ThumbnailGenerator for UnavailableThumbnails {
    async fn generate(&self, _: &Path, _: ClipId) -> Result<Option<String>, ThumbnailError> {
        Err(ThumbnailError::Unavailable(self.reason.clone()))
    }
}

/// Pick the thumbnail backend once at startup
pub async fn initialize(config: &ThumbnailConfig) -> Arc<dyn ThumbnailGenerator> {
    if !config.enabled {
        info!("🖼️ Thumbnail generation disabled");
        return Arc::new(UnavailableThumbnails::new("disabled in configuration"));
    }

    let probe = tokio::process::Command::new(&config.ffmpeg_path)
        .arg("-version")
        .output()
        .await;

    match probe {
        Ok(output) if output.status.success() => {}
        Ok(_) => {
            warn!("{} -version failed, thumbnails unavailable", config.ffmpeg_path);
            return Arc::new(UnavailableThumbnails::new("ffmpeg probe failed"));
        }
        Err(e) => {
            warn!("ffmpeg not found ({}), thumbnails unavailable", e);
            return Arc::new(UnavailableThumbnails::new(format!("ffmpeg not found: {}", e)));
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.output_dir).await {
        warn!(
            "Cannot create thumbnail directory {}: {}",
            config.output_dir.display(),
            e
        );
        return Arc::new(UnavailableThumbnails::new(format!("output dir unusable: {}", e)));
    }

    info!("🖼️ Thumbnails via {} into {}", config.ffmpeg_path, config.output_dir.display());
    Arc::new(FfmpegThumbnailGenerator::new(config))
}
