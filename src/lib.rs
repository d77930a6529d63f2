//! Vidbrief - A Rust CLI tool for turning a video URL into a short text summary
//!
//! This library drives a four-stage pipeline: fetch the video with yt-dlp or a
//! direct HTTP download, extract its audio track with ffmpeg, transcribe the
//! audio with AWS Transcribe, and condense the transcript with an LLM endpoint.

pub mod audio;
pub mod cli;
pub mod config;
pub mod fetchers;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use fetchers::{FetcherRegistry, VideoFetcher, VideoInfo};
pub use pipeline::{RunOutcome, SummaryPipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Pipeline stages, in execution order. Used for diagnostics and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Transcribing,
    Summarizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Transcribing => "transcribing",
            Stage::Summarizing => "summarizing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One error variant per pipeline stage. Any stage failure aborts the run;
/// no partial summary is ever produced.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("video retrieval failed: {0:#}")]
    Retrieval(anyhow::Error),

    #[error("audio extraction failed: {0:#}")]
    Extraction(anyhow::Error),

    #[error("transcription failed: {0:#}")]
    Transcription(anyhow::Error),

    #[error("summarization failed: {0:#}")]
    Summarization(anyhow::Error),
}

impl PipelineError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Retrieval(_) => Stage::Fetching,
            PipelineError::Extraction(_) => Stage::Extracting,
            PipelineError::Transcription(_) => Stage::Transcribing,
            PipelineError::Summarization(_) => Stage::Summarizing,
        }
    }

    /// Per-stage process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Retrieval(_) => 10,
            PipelineError::Extraction(_) => 11,
            PipelineError::Transcription(_) => 12,
            PipelineError::Summarization(_) => 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_follow_pipeline_order() {
        let stages = [
            Stage::Fetching,
            Stage::Extracting,
            Stage::Transcribing,
            Stage::Summarizing,
        ];
        let names: Vec<&str> = stages.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            ["fetching", "extracting", "transcribing", "summarizing"]
        );
    }

    #[test]
    fn exit_codes_are_distinct_per_stage() {
        let errors = [
            PipelineError::Retrieval(anyhow::anyhow!("x")),
            PipelineError::Extraction(anyhow::anyhow!("x")),
            PipelineError::Transcription(anyhow::anyhow!("x")),
            PipelineError::Summarization(anyhow::anyhow!("x")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), 4);
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn error_message_names_the_cause() {
        let err = PipelineError::Retrieval(anyhow::anyhow!("URL unreachable"));
        let msg = err.to_string();
        assert!(msg.contains("video retrieval failed"));
        assert!(msg.contains("URL unreachable"));
        assert_eq!(err.stage(), Stage::Fetching);
    }
}
