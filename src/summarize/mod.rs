use anyhow::Result;
use async_trait::async_trait;

pub mod gemini;

pub use gemini::GeminiSummarizer;

/// Trait for condensing a transcript into a shorter summary
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a summary of `transcript`. Fails on an empty transcript.
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

/// Split a transcript into chunks of at most `max_chars` bytes, breaking on
/// whitespace where possible. A single run longer than `max_chars` (no
/// whitespace to break on) is hard-split at the nearest character boundary.
/// Chunks shorter than `min_chars` are dropped; they carry too little
/// content to summarize.
pub fn chunk_transcript(transcript: &str, max_chars: usize, min_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in transcript.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if word.len() > max_chars {
            let mut rest = word;
            while rest.len() > max_chars {
                let cut = split_point(rest, max_chars);
                let (head, tail) = rest.split_at(cut);
                chunks.push(head.to_string());
                rest = tail;
            }
            current.push_str(rest);
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.retain(|chunk| chunk.len() >= min_chars);
    chunks
}

/// Largest character boundary at or below `max`, never zero.
fn split_point(text: &str, max: usize) -> usize {
    let mut cut = max;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    if cut == 0 {
        // max is smaller than the first character; take it whole
        cut = text.chars().next().map(char::len_utf8).unwrap_or(text.len());
    }
    cut
}

/// Build the summarization prompt for one transcript chunk.
pub(crate) fn build_summary_prompt(chunk: &str) -> String {
    format!(
        "Summarize the following video transcript in a few sentences. \
         Keep only the key points; do not add commentary or headings.\n\n\
         Transcript:\n{}",
        chunk
    )
}
