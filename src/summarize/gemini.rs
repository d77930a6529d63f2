use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_summary_prompt, chunk_transcript, Summarizer};
use crate::config::Config;

/// Summarizer backed by a Gemini-compatible generateContent endpoint.
///
/// Long transcripts are split into word-boundary chunks; each chunk is
/// summarized with its own request and the partial summaries are joined.
#[derive(Debug)]
pub struct GeminiSummarizer {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_chunk_chars: usize,
    min_chunk_chars: usize,
}

impl GeminiSummarizer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.summarizer_api_key()?;

        let endpoint = config
            .summarizer
            .endpoint
            .trim()
            .trim_end_matches('/')
            .to_string();
        if endpoint.is_empty() {
            anyhow::bail!("summarizer.endpoint must be configured");
        }

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(45))
                .build()
                .context("Failed to build summarizer HTTP client")?,
            api_key,
            model: config.summarizer.model.trim().to_string(),
            endpoint,
            max_chunk_chars: config.summarizer.max_chunk_chars,
            min_chunk_chars: config.summarizer.min_chunk_chars,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    /// Summarize a single chunk with one generateContent request
    async fn summarize_chunk(&self, chunk: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![ContentPayload {
                parts: vec![ContentPart {
                    text: build_summary_prompt(chunk),
                }],
            }],
        };

        let response = self
            .http
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .context("Summarizer request failed")?;

        let response = response
            .error_for_status()
            .context("Summarizer returned an error status")?;

        let payload: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse summarizer response")?;

        payload
            .candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
            .context("Summarizer response did not contain summary text")
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            anyhow::bail!("Transcript is empty, nothing to summarize");
        }

        let chunks = chunk_transcript(transcript, self.max_chunk_chars, self.min_chunk_chars);
        if chunks.is_empty() {
            anyhow::bail!(
                "Transcript is too short to summarize ({} characters)",
                transcript.trim().len()
            );
        }

        tracing::info!(
            "Summarizing transcript in {} chunk(s) with {}",
            chunks.len(),
            self.model
        );

        let progress = ProgressBar::new(chunks.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        progress.set_message("Summarizing...");

        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            partials.push(self.summarize_chunk(chunk).await?);
            progress.inc(1);
        }

        progress.finish_with_message("Summary ready");

        Ok(partials.join(" "))
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<ContentPayload>,
}

#[derive(Debug, Serialize)]
struct ContentPayload {
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn configured() -> Config {
        let mut config = Config::default();
        config.summarizer.api_key = Some("test-key".to_string());
        config.summarizer.api_key_env = "VIDBRIEF_TEST_KEY_UNSET".to_string();
        config
    }

    #[test]
    fn builds_request_url_from_config() {
        let summarizer = GeminiSummarizer::from_config(&configured()).unwrap();
        let url = summarizer.request_url();
        assert!(url.starts_with("https://generativelanguage.googleapis.com/v1beta/models/"));
        assert!(url.contains(":generateContent?key=test-key"));
    }

    #[test]
    fn summarizer_is_debug_formattable() {
        let summarizer = GeminiSummarizer::from_config(&configured()).unwrap();
        let rendered = format!("{:?}", summarizer);
        assert!(rendered.contains("GeminiSummarizer"));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let mut config = Config::default();
        config.summarizer.api_key = None;
        config.summarizer.api_key_env = "VIDBRIEF_TEST_KEY_UNSET".to_string();

        let err = GeminiSummarizer::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("API key is missing"));
    }

    #[tokio::test]
    async fn empty_transcript_is_rejected_before_any_request() {
        let summarizer = GeminiSummarizer::from_config(&configured()).unwrap();
        let err = summarizer.summarize("   ").await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn too_short_transcript_is_rejected_before_any_request() {
        let summarizer = GeminiSummarizer::from_config(&configured()).unwrap();
        let err = summarizer.summarize("hi there").await.unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn response_candidates_deserialize() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "  a short summary  "}]}}
            ]
        }"#;
        let payload: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = payload
            .candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty());
        assert_eq!(text, Some("a short summary"));
    }
}
