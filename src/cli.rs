use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Burn styled captions into a video file
    Render {
        /// Input video file
        #[arg(long)]
        video: PathBuf,

        /// Segments JSON (array, or transcription response with "segments")
        #[arg(short, long)]
        segments: PathBuf,

        /// Style JSON (defaults apply when omitted)
        #[arg(long)]
        style: Option<PathBuf>,

        /// Output video file
        #[arg(short, long, default_value = "video-with-captions.mp4")]
        output: PathBuf,
    },

    /// Encode segments into subtitle markup
    Encode {
        /// Segments JSON (array, or transcription response with "segments")
        #[arg(short, long)]
        segments: PathBuf,

        /// Style JSON, used by the ass format
        #[arg(long)]
        style: Option<PathBuf>,

        /// Output format: srt, vtt or ass
        #[arg(short, long, default_value = "srt")]
        format: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the external video encoder is available
    Check,

    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "capburn.toml")]
        output: PathBuf,
    },
}
