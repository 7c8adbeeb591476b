use std::path::Path;
use tokio::fs;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, CaptionError};
use crate::model::{Segment, SubtitleStyle, Transcript};
use crate::render::{JobEvent, RenderOrchestrator, RenderRequest};
use crate::subtitle::{encode, SubtitleFormat};

/// File-based front end over the render pipeline, used by the CLI
pub struct Workflow {
    orchestrator: RenderOrchestrator,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            orchestrator: RenderOrchestrator::new(config)?,
        })
    }

    /// Burn captions from JSON segment/style files into a video file
    pub async fn render_file<P: AsRef<Path>>(
        &self,
        video_path: P,
        segments_path: P,
        style_path: Option<P>,
        output_path: P,
        progress: Option<UnboundedSender<JobEvent>>,
    ) -> Result<()> {
        let video_path = video_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Rendering captions into {}", video_path.display());

        if !video_path.is_file() {
            return Err(CaptionError::Validation(format!(
                "video file not found: {}",
                video_path.display()
            )));
        }

        let video = fs::read(video_path).await?;
        let segments = load_segments(segments_path).await?;
        let style = load_style(style_path).await?;
        let filename = video_path.file_name().map(|n| n.to_string_lossy().to_string());

        let request = RenderRequest::new(video, filename, segments, style);
        let output = self.orchestrator.render_with_progress(request, progress).await?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(output_path, &output.bytes).await?;

        info!("Wrote {} ({} bytes)", output_path.display(), output.bytes.len());
        Ok(())
    }

    /// Check that the external encoder can be executed, returning its version line
    pub async fn check_encoder(&self) -> Result<String> {
        let media = self.orchestrator.media();
        media.check_availability().await?;
        media.get_version_info().await
    }
}

/// Encode segment/style files into markup without touching any video
pub async fn encode_files<P: AsRef<Path>>(
    format: SubtitleFormat,
    segments_path: P,
    style_path: Option<P>,
) -> Result<String> {
    let segments = load_segments(segments_path).await?;
    let style = load_style(style_path).await?;

    crate::model::validate_segments(&segments)?;
    style.validate()?;

    encode(format, &segments, &style)
}

pub async fn load_segments<P: AsRef<Path>>(path: P) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).await?;
    let transcript = Transcript::from_json(&content)?;

    if let Some(language) = transcript.language() {
        info!("Loaded transcript in language '{}' from {}", language, path.display());
    }
    Ok(transcript.into_segments())
}

pub async fn load_style<P: AsRef<Path>>(path: Option<P>) -> Result<SubtitleStyle> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path.as_ref()).await?;
            SubtitleStyle::from_json(&content)
        }
        None => Ok(SubtitleStyle::default()),
    }
}
