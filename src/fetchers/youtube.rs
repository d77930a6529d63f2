use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{VideoFetcher, VideoInfo};
use crate::Result;

/// Platform video fetcher backed by the yt-dlp binary. Handles YouTube,
/// Twitter/X, and Vimeo URLs; the video file is downloaded as-is and audio
/// extraction happens in a later stage.
pub struct YtDlpFetcher {
    yt_dlp_path: String,
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Probing video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => anyhow::anyhow!(
                    "yt-dlp is not installed. Please install it: https://github.com/yt-dlp/yt-dlp"
                ),
                _ => anyhow::anyhow!("Failed to run yt-dlp: {}", e),
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }
}

#[async_trait]
impl VideoFetcher for YtDlpFetcher {
    async fn probe(&self, url: &str) -> Result<VideoInfo> {
        let info = self.get_video_info(url).await?;

        let title = info["title"].as_str().map(|s| s.to_string());
        let duration = info["duration"].as_f64().map(|d| Duration::seconds(d as i64));
        let file_size = info["filesize"]
            .as_u64()
            .or_else(|| info["filesize_approx"].as_u64());

        Ok(VideoInfo {
            title,
            duration,
            file_size,
            original_url: url.to_string(),
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!("Downloading video to: {}", dest.display());

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &dest.to_string_lossy(),
                // Prefer a single mp4 so ffmpeg sees one well-known container
                "--format",
                "best[ext=mp4]/best",
                "--no-playlist",
                "--newline",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to download video: {}", error);
        }

        if !dest.exists() {
            anyhow::bail!("yt-dlp reported success but no file was written");
        }

        Ok(())
    }

    fn supports_url(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();
        url_lower.contains("youtube.com/watch")
            || url_lower.contains("youtu.be/")
            || url_lower.contains("youtube.com/embed/")
            || url_lower.contains("youtube.com/shorts/")
            || url_lower.contains("m.youtube.com/")
            || url_lower.contains("twitter.com/")
            || url_lower.contains("x.com/")
            || url_lower.contains("vimeo.com/")
    }

    fn platform_name(&self) -> &'static str {
        "yt-dlp"
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_common_platform_urls() {
        let fetcher = YtDlpFetcher::new();
        assert!(fetcher.supports_url("https://www.youtube.com/watch?v=abc"));
        assert!(fetcher.supports_url("https://youtu.be/abc"));
        assert!(fetcher.supports_url("https://youtube.com/shorts/abc"));
        assert!(fetcher.supports_url("https://x.com/user/status/123"));
        assert!(fetcher.supports_url("https://vimeo.com/12345"));
    }

    #[test]
    fn rejects_non_platform_urls() {
        let fetcher = YtDlpFetcher::new();
        assert!(!fetcher.supports_url("https://example.com/video.mp4"));
        assert!(!fetcher.supports_url("https://example.com/"));
    }
}
