use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{Result, CaptionError};
use super::{MediaProcessorTrait, MediaCommandBuilder};

/// Version checks get a short fixed deadline
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!("Burning subtitles from {} into {} -> {}",
              subtitle_path.display(), video_path.display(), output_path.display());

        let command = self.command_builder
            .burn_subtitles(
                video_path,
                subtitle_path,
                output_path,
                &self.config.video_codec,
                &self.config.subtitle_options,
            )
            .with_timeout(Duration::from_secs(self.config.timeout_secs));

        command.execute().await?;

        info!("Subtitle burn-in completed successfully");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .with_timeout(VERSION_CHECK_TIMEOUT)
            .execute()
            .await
            .map_err(|e| match e {
                CaptionError::EncodeFailed { stderr, .. } => {
                    CaptionError::EncoderUnavailable(format!(
                        "{} version check failed: {}",
                        self.config.binary_path, stderr
                    ))
                }
                other => other,
            })?;

        info!("Media processor is available");
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder
            .version_check()
            .with_timeout(VERSION_CHECK_TIMEOUT)
            .execute()
            .await?;

        let version_info = String::from_utf8_lossy(&stdout);
        // Extract the first line which typically contains the version
        let first_line = version_info.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}
