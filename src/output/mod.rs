use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::RunOutcome;
use crate::utils::format_duration;

#[derive(Serialize)]
struct JsonReport<'a> {
    url: &'a str,
    title: Option<&'a str>,
    duration_seconds: Option<i64>,
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript: Option<&'a str>,
    generated_at: chrono::DateTime<chrono::Utc>,
}

fn render(outcome: &RunOutcome, format: OutputFormat, show_transcript: bool) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut content = String::new();
            if let Some(title) = &outcome.video_info.title {
                content.push_str(&format!("Video: {}\n", title));
            }
            if let Some(duration) = outcome.video_info.duration {
                content.push_str(&format!(
                    "Duration: {}\n",
                    format_duration(duration.num_seconds() as f64)
                ));
            }
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str("Summary:\n");
            content.push_str(&outcome.summary);
            content.push('\n');
            if show_transcript {
                content.push_str("\nTranscript:\n");
                content.push_str(&outcome.transcript);
                content.push('\n');
            }
            Ok(content)
        }
        OutputFormat::Json => {
            let report = JsonReport {
                url: &outcome.video_info.original_url,
                title: outcome.video_info.title.as_deref(),
                duration_seconds: outcome.video_info.duration.map(|d| d.num_seconds()),
                summary: &outcome.summary,
                transcript: show_transcript.then_some(outcome.transcript.as_str()),
                generated_at: chrono::Utc::now(),
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Save a run outcome to file
pub fn save_to_file(
    outcome: &RunOutcome,
    path: &Path,
    format: OutputFormat,
    show_transcript: bool,
) -> Result<()> {
    let content = render(outcome, format, show_transcript)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a run outcome to the console
pub fn print_to_console(
    outcome: &RunOutcome,
    format: OutputFormat,
    show_transcript: bool,
) -> Result<()> {
    let content = render(outcome, format, show_transcript)?;
    println!("{}", content);
    Ok(())
}
