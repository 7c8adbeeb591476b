use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, CaptionError};

fn default_timeout_secs() -> u64 {
    600
}

fn default_max_concurrent_jobs() -> usize {
    2
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Video codec used when re-encoding with burned-in captions
    pub video_codec: String,
    /// Additional encoding options for subtitle burn-in
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    /// - preset: encoding speed (ultrafast, fast, medium, slow, veryslow)
    /// - crf: quality (0-51, lower = better quality, 23 is default)
    /// - pix_fmt: pixel format for compatibility
    pub subtitle_options: Vec<String>,
    /// Kill the encoder if it runs longer than this
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Parent directory for per-job workspaces (defaults to the OS temp dir)
    pub workspace_root: Option<PathBuf>,
    /// Maximum number of encoder processes running at once
    pub max_concurrent_jobs: usize,
    /// Queue jobs beyond the limit instead of rejecting them
    pub queue_when_busy: bool,
    /// Also write an SRT rendering next to the ASS file
    pub write_srt_sidecar: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            subtitle_options: vec![
                // Example encoding options users can customize:
                // "-preset".to_string(), "medium".to_string(),  // ultrafast .. veryslow
                // "-crf".to_string(), "23".to_string(),         // 0-51, lower is better
                // "-pix_fmt".to_string(), "yuv420p".to_string(), // Pixel format for compatibility
            ],
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            max_concurrent_jobs: default_max_concurrent_jobs(),
            queue_when_busy: true,
            write_srt_sidecar: true,
        }
    }
}

impl RenderConfig {
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CaptionError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CaptionError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CaptionError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CaptionError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.render.max_concurrent_jobs == 0 {
            return Err(CaptionError::Config(
                "render.max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        if self.media.timeout_secs == 0 {
            return Err(CaptionError::Config("media.timeout_secs must be at least 1".to_string()));
        }
        if self.media.binary_path.trim().is_empty() {
            return Err(CaptionError::Config("media.binary_path must not be empty".to_string()));
        }
        Ok(())
    }
}
