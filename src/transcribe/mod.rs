use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_transcribe::Client as TranscribeClient;
use std::path::Path;
use uuid::Uuid;

use crate::config::Config;

pub mod job;

/// Trait for converting a local audio file into plain text
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the audio at `audio_path`. A `language` code pins the
    /// recognizer's language; `None` means auto-detect.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<String>;
}

/// Speech-to-text backed by AWS Transcribe, staging audio through S3.
pub struct AwsTranscriber {
    s3_client: S3Client,
    transcribe_client: TranscribeClient,
    s3_bucket: String,
    s3_key_prefix: Option<String>,
    default_language: Option<String>,
}

impl AwsTranscriber {
    /// Create a transcriber from the application configuration
    pub async fn new(config: &Config) -> Result<Self> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(config.aws_region())
            .load()
            .await;

        Ok(Self {
            s3_client: S3Client::new(&aws_config),
            transcribe_client: TranscribeClient::new(&aws_config),
            s3_bucket: config.aws.s3_bucket.clone(),
            s3_key_prefix: config.aws.s3_key_prefix.clone(),
            default_language: config.aws.default_language.clone(),
        })
    }

    /// Upload audio file to S3
    async fn upload_to_s3(&self, audio_path: &Path) -> Result<String> {
        let key = format!(
            "{}audio_{}_{}.mp3",
            self.s3_key_prefix.as_deref().unwrap_or(""),
            Uuid::new_v4(),
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        );

        tracing::info!("Uploading audio to S3: s3://{}/{}", self.s3_bucket, key);

        let content = fs_err::read(audio_path)?;
        if content.is_empty() {
            anyhow::bail!("Audio file is empty: {}", audio_path.display());
        }

        self.s3_client
            .put_object()
            .bucket(&self.s3_bucket)
            .key(&key)
            .body(content.into())
            .content_type("audio/mpeg")
            .send()
            .await
            .context("Failed to upload audio to S3")?;

        Ok(key)
    }

    /// Start an AWS Transcribe job for the staged object
    async fn start_transcription_job(&self, s3_key: &str, language: Option<&str>) -> Result<String> {
        let job_name = format!("vidbrief_{}", Uuid::new_v4());
        let media_uri = format!("s3://{}/{}", self.s3_bucket, s3_key);

        tracing::info!("Starting transcription job: {}", job_name);

        use aws_sdk_transcribe::types::{Media, MediaFormat};

        let media = Media::builder().media_file_uri(media_uri).build();

        let mut job_builder = self
            .transcribe_client
            .start_transcription_job()
            .transcription_job_name(&job_name)
            .media_format(MediaFormat::Mp3)
            .media(media);

        if let Some(lang) = language.or(self.default_language.as_deref()) {
            tracing::info!("Using specified language: {}", lang);
            job_builder = job_builder.language_code(lang.parse()?);
        } else {
            tracing::info!("Using automatic language detection");
            job_builder = job_builder.identify_language(true);
        }

        job_builder
            .send()
            .await
            .context("Failed to start transcription job")?;

        Ok(job_name)
    }

    /// Delete the staged S3 object
    async fn cleanup_s3(&self, s3_key: &str) -> Result<()> {
        tracing::debug!("Cleaning up S3 object: {}", s3_key);

        self.s3_client
            .delete_object()
            .bucket(&self.s3_bucket)
            .key(s3_key)
            .send()
            .await
            .context("Failed to clean up S3 object")?;

        Ok(())
    }
}

#[async_trait]
impl SpeechToText for AwsTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<String> {
        let s3_key = self.upload_to_s3(audio_path).await?;

        // The staged object is deleted whether or not the job succeeds
        let result = async {
            let job_name = self.start_transcription_job(&s3_key, language).await?;
            job::TranscriptionJobPoller::new(self.transcribe_client.clone(), job_name)
                .wait_for_transcript()
                .await
        }
        .await;

        if let Err(e) = self.cleanup_s3(&s3_key).await {
            tracing::warn!("S3 cleanup failed: {:#}", e);
        }

        result
    }
}
