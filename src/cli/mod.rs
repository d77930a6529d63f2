use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vidbrief",
    about = "Vidbrief - Summarize any video from its URL",
    version,
    long_about = "A CLI tool that downloads a video, extracts its audio track, transcribes the speech with AWS Transcribe, and condenses the transcript into a short summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, transcribe, and summarize a video
    Summarize {
        /// Video URL (YouTube, Twitter/X, Vimeo, or a direct media URL)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Language code for transcription (auto-detect if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Keep the downloaded video and extracted audio files
        #[arg(long)]
        keep_media: bool,

        /// Include the full transcript in the output
        #[arg(long)]
        show_transcript: bool,
    },

    /// Configure AWS and summarizer settings
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported platforms
    Platforms,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with video metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn summarize_requires_a_url() {
        let result = Cli::try_parse_from(["vidbrief", "summarize"]);
        assert!(result.is_err());
    }

    #[test]
    fn summarize_parses_defaults() {
        let cli = Cli::try_parse_from(["vidbrief", "summarize", "https://youtu.be/abc"]).unwrap();
        match cli.command {
            Commands::Summarize {
                url,
                output,
                format,
                language,
                keep_media,
                show_transcript,
            } => {
                assert_eq!(url, "https://youtu.be/abc");
                assert!(output.is_none());
                assert_eq!(format, OutputFormat::Text);
                assert!(language.is_none());
                assert!(!keep_media);
                assert!(!show_transcript);
            }
            _ => panic!("expected summarize command"),
        }
    }
}
