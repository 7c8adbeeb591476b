//! capburn - caption compiler and burn-in pipeline
//!
//! Entry point for the command-line tool: encodes timed segments into
//! SRT/WebVTT/ASS and burns styled captions into videos with ffmpeg.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use capburn::cli::{Args, Commands};
use capburn::config::Config;
use capburn::render::{JobEvent, JobState};
use capburn::subtitle::SubtitleFormat;
use capburn::workflow::{encode_files, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("capburn.toml").exists() {
                info!("Found capburn.toml in current directory, loading...");
                Config::from_file("capburn.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Render { video, segments, style, output } => {
            info!("Rendering captions into: {}", video.display());
            let workflow = Workflow::new(config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
            spinner.enable_steady_tick(Duration::from_millis(120));

            let (tx, mut rx) = mpsc::unbounded_channel::<JobEvent>();
            let progress_spinner = spinner.clone();
            let reporter = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    progress_spinner.set_message(format!("job {}: {}", event.job_id, event.state));
                    if event.state == JobState::Cleaned {
                        break;
                    }
                }
            });

            let result = workflow
                .render_file(&video, &segments, style.as_ref(), &output, Some(tx))
                .await;
            let _ = reporter.await;

            match result {
                Ok(()) => spinner.finish_with_message(format!("Wrote {}", output.display())),
                Err(e) => {
                    spinner.abandon_with_message(format!("Render failed ({})", e.kind()));
                    return Err(e.into());
                }
            }
        }
        Commands::Encode { segments, style, format, output } => {
            let format: SubtitleFormat = format.parse()?;
            let markup = encode_files(format, &segments, style.as_ref()).await?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, markup).await?;
                    info!("Wrote {} markup to {}", format, path.display());
                }
                None => print!("{}", markup),
            }
        }
        Commands::Check => {
            let workflow = Workflow::new(config)?;
            let version = workflow.check_encoder().await?;
            println!("Encoder available: {}", version);
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".capburn").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "capburn.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so `encode` can stream markup on stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("capburn.log").display());

    Ok(())
}
