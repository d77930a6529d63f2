use async_trait::async_trait;
use chrono::Duration;
use std::path::Path;
use url::Url;

pub mod direct;
pub mod youtube;

use crate::Result;

/// Metadata about the video behind a URL, reported before download.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Title or description of the video
    pub title: Option<String>,

    /// Duration of the video if available
    pub duration: Option<Duration>,

    /// File size in bytes if available
    pub file_size: Option<u64>,

    /// Original URL that was processed
    pub original_url: String,
}

/// Trait for retrieving videos from different platforms
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Probe video metadata without downloading
    async fn probe(&self, url: &str) -> Result<VideoInfo>;

    /// Download the video file to the given path
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Check if this fetcher supports the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

/// Registry for managing multiple fetchers
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn VideoFetcher>>,
}

impl FetcherRegistry {
    /// Create a new registry with default fetchers
    pub fn new() -> Self {
        let mut registry = Self {
            fetchers: Vec::new(),
        };

        registry.register(Box::new(youtube::YtDlpFetcher::new()));
        registry.register(Box::new(direct::DirectFetcher::new()));

        registry
    }

    /// Register a new fetcher
    pub fn register(&mut self, fetcher: Box<dyn VideoFetcher>) {
        self.fetchers.push(fetcher);
    }

    /// Find a fetcher that supports the given URL
    pub fn find_fetcher(&self, url: &str) -> Option<&dyn VideoFetcher> {
        self.fetchers
            .iter()
            .find(|fetcher| fetcher.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// List all supported platforms
    pub fn list_platforms(&self) -> Vec<&'static str> {
        self.fetchers
            .iter()
            .map(|fetcher| fetcher.platform_name())
            .collect()
    }

    /// Retrieve the video behind `url` into `dest` using the first fetcher
    /// that supports it. Returns the probed metadata.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<VideoInfo> {
        let validated = validate_url(url)?;

        let fetcher = self
            .find_fetcher(validated.as_str())
            .ok_or_else(|| anyhow::anyhow!("No fetcher supports this URL: {}", url))?;

        tracing::info!("Fetching via {}: {}", fetcher.platform_name(), url);

        let info = fetcher.probe(validated.as_str()).await?;
        fetcher.download(validated.as_str(), dest).await?;

        Ok(info)
    }
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate and normalize URLs
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_routes_youtube_urls_to_ytdlp() {
        let registry = FetcherRegistry::new();
        let fetcher = registry
            .find_fetcher("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .expect("youtube URL should be supported");
        assert_eq!(fetcher.platform_name(), "yt-dlp");
    }

    #[test]
    fn registry_routes_media_urls_to_direct() {
        let registry = FetcherRegistry::new();
        let fetcher = registry
            .find_fetcher("https://example.com/talk.mp4")
            .expect("direct media URL should be supported");
        assert_eq!(fetcher.platform_name(), "Direct URL");
    }

    #[test]
    fn registry_rejects_unsupported_urls() {
        let registry = FetcherRegistry::new();
        assert!(registry.find_fetcher("https://example.com/article").is_none());
    }

    #[test]
    fn validate_url_rejects_malformed_input() {
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("ftp://example.com/a.mp4").is_err());
        assert!(validate_url("https://example.com/a.mp4").is_ok());
    }

    #[tokio::test]
    async fn fetch_fails_fast_on_malformed_url() {
        let registry = FetcherRegistry::new();
        let dest = std::env::temp_dir().join("vidbrief-test-never-written.mp4");
        let err = registry.fetch("not-a-url", &dest).await.unwrap_err();
        assert!(err.to_string().contains("Invalid URL format"));
        assert!(!dest.exists());
    }
}
