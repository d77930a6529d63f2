use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::utils::format_duration;

/// Trait for isolating the audio track from a local video file
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract the audio track of `video` into `dest`, discarding video frames
    async fn extract(&self, video: &Path, dest: &Path) -> Result<()>;
}

/// Audio extractor backed by the ffmpeg/ffprobe binaries. Verifies the input
/// actually carries an audio stream before converting to MP3.
pub struct FfmpegExtractor;

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Validate that the file exists, is readable, and is non-empty
    async fn validate_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("File does not exist: {}", path.display());
        }

        if !path.is_file() {
            anyhow::bail!("Path is not a file: {}", path.display());
        }

        match tokio::fs::metadata(path).await {
            Ok(metadata) => {
                if metadata.len() == 0 {
                    anyhow::bail!("File is empty: {}", path.display());
                }
            }
            Err(e) => {
                anyhow::bail!("Cannot access file {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    /// Probe container streams with ffprobe and fail if no audio stream exists
    async fn require_audio_stream(&self, path: &Path) -> Result<()> {
        let info = self.probe(path).await?;

        let empty_vec = vec![];
        let streams = info["streams"].as_array().unwrap_or(&empty_vec);
        let has_audio = streams
            .iter()
            .any(|stream| stream["codec_type"].as_str() == Some("audio"));

        if !has_audio {
            anyhow::bail!(
                "Video contains no audio track: {}",
                path.display()
            );
        }

        Ok(())
    }

    /// Duration of a media file in seconds, if ffprobe reports one
    pub async fn probe_duration(&self, path: &Path) -> Result<Option<f64>> {
        let info = self.probe(path).await?;

        Ok(info["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok()))
    }

    async fn probe(&self, path: &Path) -> Result<serde_json::Value> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                &path.to_string_lossy(),
            ])
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    anyhow::anyhow!("ffprobe is not installed. Please install ffmpeg")
                }
                _ => anyhow::anyhow!("Failed to run ffprobe: {}", e),
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to analyze file with ffprobe: {}", error);
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    /// Convert to MP3 using ffmpeg, dropping the video stream
    async fn convert_to_mp3(&self, source: &Path, dest: &Path) -> Result<()> {
        tracing::debug!("Extracting audio: {} -> {}", source.display(), dest.display());

        let output = Command::new("ffmpeg")
            .args([
                "-i",
                &source.to_string_lossy(),
                "-vn", // No video
                "-codec:a",
                "libmp3lame",
                "-ab",
                "128k", // Good quality for transcription
                "-ar",
                "44100", // Standard sample rate
                "-y", // Overwrite output file
                "-loglevel",
                "error",
                &dest.to_string_lossy(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    anyhow::anyhow!("ffmpeg is not installed. Please install ffmpeg")
                }
                _ => anyhow::anyhow!("Failed to run ffmpeg: {}", e),
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed to extract audio: {}", error);
        }

        Ok(())
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract(&self, video: &Path, dest: &Path) -> Result<()> {
        self.validate_file(video).await?;
        self.require_audio_stream(video).await?;
        self.convert_to_mp3(video, dest).await?;

        if let Ok(Some(seconds)) = self.probe_duration(dest).await {
            tracing::info!("Extracted audio track ({})", format_duration(seconds));
        }

        Ok(())
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}
