use anyhow::{Context, Result};
use aws_sdk_transcribe::types::{TranscriptionJob, TranscriptionJobStatus};
use aws_sdk_transcribe::Client as TranscribeClient;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

/// AWS Transcribe transcript document, reduced to the fields the pipeline
/// consumes. The transcript is treated as plain text; timestamps and speaker
/// structure are not carried forward.
#[derive(Debug, Deserialize)]
struct AwsTranscriptDoc {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    transcripts: Vec<TranscriptText>,
}

#[derive(Debug, Deserialize)]
struct TranscriptText {
    transcript: String,
}

/// Polls a transcription job until it settles and retrieves the transcript text.
pub struct TranscriptionJobPoller {
    client: TranscribeClient,
    job_name: String,
}

impl TranscriptionJobPoller {
    pub fn new(client: TranscribeClient, job_name: String) -> Self {
        Self { client, job_name }
    }

    /// Wait for job completion with progress tracking, then download and
    /// parse the transcript.
    pub async fn wait_for_transcript(&self) -> Result<String> {
        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        progress.set_message("Waiting for transcription job...");

        let start_time = std::time::Instant::now();
        let mut check_count: u64 = 0;

        loop {
            check_count += 1;

            let job = self.get_transcription_job().await?;

            match job.transcription_job_status() {
                Some(TranscriptionJobStatus::Queued) | Some(TranscriptionJobStatus::InProgress) => {
                    progress.set_message(format!(
                        "Transcribing... ({}s elapsed, check #{})",
                        start_time.elapsed().as_secs(),
                        check_count
                    ));

                    // Wait before next check (linear backoff capped at 30 seconds)
                    let wait_time = std::cmp::min(5 + (check_count - 1) * 2, 30);
                    sleep(Duration::from_secs(wait_time)).await;
                }
                Some(TranscriptionJobStatus::Completed) => {
                    progress.finish_with_message("Transcription completed");
                    break;
                }
                Some(TranscriptionJobStatus::Failed) => {
                    progress.finish_with_message("Transcription failed");

                    let failure_reason = job.failure_reason().unwrap_or("Unknown error");
                    anyhow::bail!("Transcription job failed: {}", failure_reason);
                }
                _ => {
                    progress.finish_with_message("Transcription status unknown");
                    anyhow::bail!("Unexpected transcription job status");
                }
            }
        }

        // Fetch the settled job once more for the transcript URI
        let job = self.get_transcription_job().await?;
        let transcript_uri = job
            .transcript()
            .and_then(|t| t.transcript_file_uri())
            .ok_or_else(|| anyhow::anyhow!("No transcript URI found"))?;

        let transcript_json = self.download_transcript(transcript_uri).await?;
        parse_transcript_text(&transcript_json)
    }

    /// Get transcription job details
    async fn get_transcription_job(&self) -> Result<TranscriptionJob> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(&self.job_name)
            .send()
            .await
            .context("Failed to get transcription job status")?;

        response
            .transcription_job()
            .ok_or_else(|| anyhow::anyhow!("Transcription job not found"))
            .cloned()
    }

    /// Download the transcript document from its presigned URI
    async fn download_transcript(&self, uri: &str) -> Result<String> {
        let response = reqwest::get(uri)
            .await
            .context("Failed to download transcript")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download transcript: HTTP {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read transcript content")
    }
}

/// Extract the plain transcript text from a transcript document.
fn parse_transcript_text(transcript_json: &str) -> Result<String> {
    let doc: AwsTranscriptDoc =
        serde_json::from_str(transcript_json).context("Failed to parse transcript JSON")?;

    Ok(doc
        .results
        .transcripts
        .first()
        .map(|t| t.transcript.trim().to_string())
        .unwrap_or_default())
}
