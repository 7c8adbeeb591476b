use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;

/// Video extensions accepted from user-supplied filenames
pub const ALLOWED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "mkv", "webm", "avi"];
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

const WORKSPACE_PREFIX: &str = "capburn-";
const SUBTITLE_FILE: &str = "captions.ass";
const SRT_FILE: &str = "captions.srt";
const OUTPUT_FILE: &str = "output.mp4";

/// Extension for the staged input video. Unknown or missing extensions
/// fall back to `mp4`; the original filename never reaches a path.
pub fn safe_video_extension(filename: Option<&str>) -> &'static str {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| ALLOWED_VIDEO_EXTENSIONS.iter().copied().find(|allowed| *allowed == ext))
        .unwrap_or(DEFAULT_VIDEO_EXTENSION)
}

/// One render request's private workspace.
///
/// The directory is exclusively owned by the job. It is removed by
/// [`RenderJob::cleanup`], or synchronously on drop if cleanup never ran.
#[derive(Debug)]
pub struct RenderJob {
    pub job_id: Uuid,
    pub work_dir: PathBuf,
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub srt_path: PathBuf,
    pub output_path: PathBuf,
    cleaned: bool,
}

impl RenderJob {
    /// Create `<root>/capburn-<uuid>`. The leaf is created non-recursively so
    /// an existing directory is an error, never shared.
    pub async fn create(root: &Path, filename: Option<&str>) -> Result<Self> {
        fs::create_dir_all(root).await?;

        let job_id = Uuid::new_v4();
        let work_dir = root.join(format!("{}{}", WORKSPACE_PREFIX, job_id));
        fs::create_dir(&work_dir).await?;

        let extension = safe_video_extension(filename);
        debug!("Created workspace {} (input extension: {})", work_dir.display(), extension);

        Ok(Self {
            job_id,
            video_path: work_dir.join(format!("input.{}", extension)),
            subtitle_path: work_dir.join(SUBTITLE_FILE),
            srt_path: work_dir.join(SRT_FILE),
            output_path: work_dir.join(OUTPUT_FILE),
            work_dir,
            cleaned: false,
        })
    }

    /// Write the source video unmodified
    pub async fn stage_video(&self, video: &[u8]) -> Result<()> {
        fs::write(&self.video_path, video).await?;
        debug!("Staged {} bytes of video at {}", video.len(), self.video_path.display());
        Ok(())
    }

    /// Write the ASS markup and, optionally, an SRT rendering alongside it
    pub async fn stage_subtitles(&self, ass: &str, srt: Option<&str>) -> Result<()> {
        fs::write(&self.subtitle_path, ass).await?;
        if let Some(srt) = srt {
            fs::write(&self.srt_path, srt).await?;
        }
        Ok(())
    }

    pub async fn read_output(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.output_path).await?)
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }

    /// Remove the workspace. Best-effort and idempotent.
    pub async fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        match fs::remove_dir_all(&self.work_dir).await {
            Ok(()) => info!("Removed workspace {}", self.work_dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove workspace {}: {}", self.work_dir.display(), e),
        }
    }
}

impl Drop for RenderJob {
    fn drop(&mut self) {
        if !self.cleaned {
            warn!("Workspace {} dropped without cleanup, removing", self.work_dir.display());
            if let Err(e) = std::fs::remove_dir_all(&self.work_dir) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove workspace {}: {}", self.work_dir.display(), e);
                }
            }
        }
    }
}
