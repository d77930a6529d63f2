use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidbrief::cli::{Cli, Commands};
use vidbrief::config::Config;
use vidbrief::pipeline::SummaryPipeline;
use vidbrief::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidbrief=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize {
            url,
            output,
            format,
            language,
            keep_media,
            show_transcript,
        } => {
            // Check for required external dependencies
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let config = Config::load().await?;
            let keep_media = keep_media || config.app.keep_media;

            let pipeline = SummaryPipeline::new(config, keep_media).await?;

            tracing::info!("Starting summary pipeline for URL: {}", url);

            let outcome = match pipeline.run(&url, language.as_deref()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("Pipeline failed while {}: {}", e.stage(), e);
                    std::process::exit(e.exit_code());
                }
            };

            match output {
                Some(path) => {
                    output::save_to_file(&outcome, &path, format, show_transcript)?;
                    println!("Summary saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&outcome, format, show_transcript)?;
                }
            }

            if keep_media {
                if let Some(video_path) = &outcome.video_path {
                    println!("Video saved to: {}", video_path.display());
                }
                if let Some(audio_path) = &outcome.audio_path {
                    println!("Audio saved to: {}", audio_path.display());
                }
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                config.interactive_setup().await?;
            }
        }
        Commands::Platforms => {
            println!("Supported platforms:");
            println!("  • YouTube (youtube.com, youtu.be)");
            println!("  • Twitter/X (twitter.com, x.com)");
            println!("  • Vimeo (vimeo.com)");
            println!("  • Direct video URLs (mp4, mkv, webm, mov, avi, ...)");
        }
    }

    Ok(())
}
