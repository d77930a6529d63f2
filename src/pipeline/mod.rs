use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

use crate::audio::{AudioExtractor, FfmpegExtractor};
use crate::config::Config;
use crate::fetchers::{FetcherRegistry, VideoInfo};
use crate::summarize::{GeminiSummarizer, Summarizer};
use crate::transcribe::{AwsTranscriber, SpeechToText};
use crate::utils::sanitize_filename;
use crate::{PipelineError, Stage};

/// Result of one end-to-end pipeline run.
#[derive(Debug)]
pub struct RunOutcome {
    /// The generated summary
    pub summary: String,

    /// The full transcript the summary was produced from
    pub transcript: String,

    /// Metadata reported by the fetcher
    pub video_info: VideoInfo,

    /// Preserved video file, if media was kept
    pub video_path: Option<PathBuf>,

    /// Preserved audio file, if media was kept
    pub audio_path: Option<PathBuf>,
}

/// The four-stage summary pipeline. Owns the temporary directory holding the
/// intermediate video and audio files; the directory is removed when the
/// pipeline is dropped, on success and on failure alike.
pub struct SummaryPipeline {
    fetchers: FetcherRegistry,
    extractor: Box<dyn AudioExtractor>,
    transcriber: Box<dyn SpeechToText>,
    summarizer: Box<dyn Summarizer>,
    temp_dir: TempDir,
    keep_media: bool,
}

impl SummaryPipeline {
    /// Create a pipeline with the production capabilities
    pub async fn new(config: Config, keep_media: bool) -> Result<Self> {
        let transcriber = AwsTranscriber::new(&config).await?;
        let summarizer = GeminiSummarizer::from_config(&config)?;

        Self::with_capabilities(
            FetcherRegistry::new(),
            Box::new(FfmpegExtractor::new()),
            Box::new(transcriber),
            Box::new(summarizer),
            keep_media,
        )
    }

    /// Create a pipeline from explicit capability implementations. Lets tests
    /// substitute fakes for the external collaborators.
    pub fn with_capabilities(
        fetchers: FetcherRegistry,
        extractor: Box<dyn AudioExtractor>,
        transcriber: Box<dyn SpeechToText>,
        summarizer: Box<dyn Summarizer>,
        keep_media: bool,
    ) -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;

        Ok(Self {
            fetchers,
            extractor,
            transcriber,
            summarizer,
            temp_dir,
            keep_media,
        })
    }

    /// Run the full pipeline for one URL: fetch, extract, transcribe,
    /// summarize. Fails fast; an error in any stage aborts the run and
    /// reports that stage.
    pub async fn run(
        &self,
        url: &str,
        language: Option<&str>,
    ) -> std::result::Result<RunOutcome, PipelineError> {
        let uuid = Uuid::new_v4().to_string();
        let run_id = &uuid[..8];
        let video_path = self.temp_dir.path().join(format!("video_{}.mp4", run_id));
        let audio_path = self.temp_dir.path().join(format!("audio_{}.mp3", run_id));

        tracing::info!(stage = %Stage::Fetching, "Retrieving video: {}", url);
        let video_info = self
            .fetchers
            .fetch(url, &video_path)
            .await
            .map_err(PipelineError::Retrieval)?;

        tracing::info!(stage = %Stage::Extracting, "Extracting audio track");
        self.extractor
            .extract(&video_path, &audio_path)
            .await
            .map_err(PipelineError::Extraction)?;

        tracing::info!(stage = %Stage::Transcribing, "Transcribing audio");
        let transcript = self
            .transcriber
            .transcribe(&audio_path, language)
            .await
            .map_err(PipelineError::Transcription)?;

        tracing::info!(
            stage = %Stage::Summarizing,
            "Summarizing transcript ({} characters)",
            transcript.len()
        );
        let summary = self
            .summarizer
            .summarize(&transcript)
            .await
            .map_err(PipelineError::Summarization)?;

        if transcript.len() > 200 && summary.len() >= transcript.len() {
            tracing::warn!(
                "Summary ({} chars) is not shorter than the transcript ({} chars)",
                summary.len(),
                transcript.len()
            );
        }

        let (kept_video, kept_audio) = if self.keep_media {
            (
                self.preserve_media(&video_path, &video_info, "mp4"),
                self.preserve_media(&audio_path, &video_info, "mp3"),
            )
        } else {
            (None, None)
        };

        Ok(RunOutcome {
            summary,
            transcript,
            video_info,
            video_path: kept_video,
            audio_path: kept_audio,
        })
    }

    /// Copy a temporary artifact into the working directory under a readable
    /// name. Best effort: a failed copy is logged and the artifact is lost
    /// with the temp dir.
    fn preserve_media(&self, temp_path: &Path, info: &VideoInfo, extension: &str) -> Option<PathBuf> {
        let filename = info
            .title
            .as_ref()
            .map(|title| format!("{}.{}", sanitize_filename(title), extension))
            .unwrap_or_else(|| {
                format!(
                    "vidbrief_{}.{}",
                    chrono::Utc::now().format("%Y%m%d_%H%M%S"),
                    extension
                )
            });

        let output_path = match std::env::current_dir() {
            Ok(dir) => dir.join(filename),
            Err(e) => {
                tracing::warn!("Cannot resolve working directory: {}", e);
                return None;
            }
        };

        match fs_err::copy(temp_path, &output_path) {
            Ok(_) => Some(output_path),
            Err(e) => {
                tracing::warn!("Failed to preserve {}: {}", temp_path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::VideoFetcher;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VideoFetcher for FakeFetcher {
        async fn probe(&self, url: &str) -> Result<VideoInfo> {
            Ok(VideoInfo {
                title: Some("Fake Video".to_string()),
                duration: None,
                file_size: None,
                original_url: url.to_string(),
            })
        }

        async fn download(&self, _url: &str, dest: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            fs_err::write(dest, b"fake video bytes")?;
            Ok(())
        }

        fn supports_url(&self, url: &str) -> bool {
            url.contains("fake.test")
        }

        fn platform_name(&self) -> &'static str {
            "Fake"
        }
    }

    struct FakeExtractor {
        no_audio: bool,
    }

    #[async_trait]
    impl AudioExtractor for FakeExtractor {
        async fn extract(&self, video: &Path, dest: &Path) -> Result<()> {
            assert!(video.exists(), "video must exist before extraction");
            if self.no_audio {
                anyhow::bail!("Video contains no audio track: {}", video.display());
            }
            fs_err::write(dest, b"fake audio bytes")?;
            Ok(())
        }
    }

    struct FakeTranscriber {
        transcript: String,
    }

    #[async_trait]
    impl SpeechToText for FakeTranscriber {
        async fn transcribe(&self, audio_path: &Path, _language: Option<&str>) -> Result<String> {
            assert!(audio_path.exists(), "audio must exist before transcription");
            Ok(self.transcript.clone())
        }
    }

    struct FakeSummarizer;

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, transcript: &str) -> Result<String> {
            if transcript.trim().is_empty() {
                anyhow::bail!("Transcript is empty, nothing to summarize");
            }
            let cut = transcript
                .char_indices()
                .nth(transcript.chars().count() / 4)
                .map(|(i, _)| i)
                .unwrap_or(transcript.len());
            Ok(transcript[..cut].to_string())
        }
    }

    fn pipeline(
        transcript: &str,
        no_audio: bool,
    ) -> (SummaryPipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetchers = FetcherRegistry::new();
        fetchers.register(Box::new(FakeFetcher {
            calls: calls.clone(),
        }));

        let pipeline = SummaryPipeline::with_capabilities(
            fetchers,
            Box::new(FakeExtractor { no_audio }),
            Box::new(FakeTranscriber {
                transcript: transcript.to_string(),
            }),
            Box::new(FakeSummarizer),
            false,
        )
        .unwrap();

        (pipeline, calls)
    }

    const TRANSCRIPT: &str = "today we are going to talk about the history of \
        computing, starting with mechanical calculators and ending with \
        modern distributed systems running in the cloud";

    #[tokio::test]
    async fn full_run_produces_nonempty_shorter_summary() {
        let (pipeline, calls) = pipeline(TRANSCRIPT, false);

        let outcome = pipeline.run("https://fake.test/v/1", None).await.unwrap();

        assert!(!outcome.summary.is_empty());
        assert!(outcome.summary.len() < outcome.transcript.len());
        assert_eq!(outcome.transcript, TRANSCRIPT);
        assert_eq!(outcome.video_info.title.as_deref(), Some("Fake Video"));
        assert!(outcome.video_path.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_url_fails_at_fetching() {
        let (pipeline, calls) = pipeline(TRANSCRIPT, false);

        let err = pipeline.run("not-a-url", None).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Fetching);
        assert_eq!(err.exit_code(), 10);
        // No stage effect happened
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_url_fails_at_fetching() {
        let (pipeline, _) = pipeline(TRANSCRIPT, false);

        let err = pipeline
            .run("https://unknown.example/page", None)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Fetching);
    }

    #[tokio::test]
    async fn video_without_audio_fails_at_extracting() {
        let (pipeline, _) = pipeline(TRANSCRIPT, true);

        let err = pipeline.run("https://fake.test/v/2", None).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Extracting);
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("no audio track"));
    }

    #[tokio::test]
    async fn empty_transcript_fails_at_summarizing() {
        let (pipeline, _) = pipeline("", false);

        let err = pipeline.run("https://fake.test/v/3", None).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Summarizing);
        assert_eq!(err.exit_code(), 13);
    }

    #[tokio::test]
    async fn runs_are_idempotent_with_equivalent_capabilities() {
        let (pipeline, _) = pipeline(TRANSCRIPT, false);

        let first = pipeline.run("https://fake.test/v/4", None).await.unwrap();
        let second = pipeline.run("https://fake.test/v/4", None).await.unwrap();

        assert_eq!(first.summary, second.summary);
        assert_eq!(first.transcript, second.transcript);
    }

    #[tokio::test]
    async fn temp_files_are_removed_with_the_pipeline() {
        let (pipeline, _) = pipeline(TRANSCRIPT, false);
        let temp_root = pipeline.temp_dir.path().to_path_buf();

        pipeline.run("https://fake.test/v/5", None).await.unwrap();
        assert!(temp_root.exists());

        drop(pipeline);
        assert!(!temp_root.exists());
    }
}
