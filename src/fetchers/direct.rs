use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use url::Url;

use super::{VideoFetcher, VideoInfo};
use crate::Result;

/// Fetcher for URLs that point directly at a video file.
pub struct DirectFetcher {
    client: Client,
}

impl DirectFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Check if URL points to a video file
    fn is_video_url(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();

        let video_extensions = [
            ".mp4", ".avi", ".mov", ".mkv", ".webm", ".m4v", ".wmv", ".flv", ".mpg", ".mpeg",
        ];

        video_extensions.iter().any(|ext| url_lower.contains(ext))
    }

    /// Get content information via HEAD request
    async fn get_content_info(&self, url: &str) -> Result<Option<u64>> {
        let response = self.client.head(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to access URL: HTTP {}", response.status());
        }

        let content_length = response
            .headers()
            .get("content-length")
            .and_then(|cl| cl.to_str().ok())
            .and_then(|cl| cl.parse::<u64>().ok());

        Ok(content_length)
    }

    /// Derive a title from the URL's filename
    fn title_from_url(url: &Url) -> Option<String> {
        url.path_segments()
            .and_then(|segments| segments.last())
            .filter(|filename| !filename.is_empty())
            .map(|filename| {
                let name = match filename.rfind('.') {
                    Some(dot_pos) => &filename[..dot_pos],
                    None => filename,
                };
                urlencoding::decode(name)
                    .unwrap_or_else(|_| name.into())
                    .replace(['_', '-'], " ")
            })
    }
}

#[async_trait]
impl VideoFetcher for DirectFetcher {
    async fn probe(&self, url: &str) -> Result<VideoInfo> {
        let parsed_url = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL: {}", url))?;

        let file_size = self.get_content_info(url).await?;

        Ok(VideoInfo {
            title: Self::title_from_url(&parsed_url),
            duration: None, // Unknown without downloading
            file_size,
            original_url: url.to_string(),
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!("Streaming video download to: {}", dest.display());

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download video: HTTP {}", response.status());
        }

        let total_size = response.content_length().unwrap_or(0);

        let progress = ProgressBar::new(total_size);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap(),
        );
        progress.set_message("Downloading video...");

        let mut file = fs_err::File::create(dest)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }

        progress.finish_with_message("Download complete");

        Ok(())
    }

    fn supports_url(&self, url: &str) -> bool {
        if Url::parse(url).is_err() {
            return false;
        }

        self.is_video_url(url)
    }

    fn platform_name(&self) -> &'static str {
        "Direct URL"
    }
}

impl Default for DirectFetcher {
    fn default() -> Self {
        Self::new()
    }
}
