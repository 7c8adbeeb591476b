use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{Config, RenderConfig};
use crate::error::{CaptionError, Result};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::{encode_ass, encode_srt};
use super::{JobEvent, JobState, RenderJob, RenderOutput, RenderRequest, ValidatedRequest};

/// Drives render jobs: validate, admit, stage, encode, return, clean up.
///
/// Jobs share nothing but the semaphore; each one gets its own workspace.
pub struct RenderOrchestrator {
    config: RenderConfig,
    media: Arc<dyn MediaProcessorTrait>,
    permits: Semaphore,
}

impl RenderOrchestrator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let media: Arc<dyn MediaProcessorTrait> =
            Arc::from(MediaProcessorFactory::create_processor(config.media.clone()));
        Ok(Self::with_processor(config.render, media))
    }

    pub fn with_processor(config: RenderConfig, media: Arc<dyn MediaProcessorTrait>) -> Self {
        let permits = Semaphore::new(config.max_concurrent_jobs.max(1));
        Self { config, media, permits }
    }

    pub fn media(&self) -> &Arc<dyn MediaProcessorTrait> {
        &self.media
    }

    pub async fn render(&self, request: RenderRequest) -> Result<RenderOutput> {
        self.render_with_progress(request, None).await
    }

    /// Render and report lifecycle transitions on `progress`
    pub async fn render_with_progress(
        &self,
        request: RenderRequest,
        progress: Option<UnboundedSender<JobEvent>>,
    ) -> Result<RenderOutput> {
        let request = request.validate()?;
        let _permit = self.admit().await?;

        let mut job =
            RenderJob::create(&self.config.workspace_root(), request.filename.as_deref()).await?;
        let job_id = job.job_id;
        info!("Render job {} started ({} segments)", job_id, request.segments.len());
        notify(&progress, job_id, JobState::Created);

        let result = self.run_job(&job, &request, &progress).await;
        match result {
            Ok(bytes) => {
                info!("Render job {} succeeded ({} bytes)", job_id, bytes.len());
                notify(&progress, job_id, JobState::Succeeded);

                tokio::spawn(async move {
                    job.cleanup().await;
                    notify(&progress, job_id, JobState::Cleaned);
                });

                Ok(RenderOutput::mp4(bytes))
            }
            Err(e) => {
                error!("Render job {} failed: {}", job_id, e);
                notify(&progress, job_id, JobState::Failed);

                job.cleanup().await;
                notify(&progress, job_id, JobState::Cleaned);

                Err(e)
            }
        }
    }

    async fn admit(&self) -> Result<SemaphorePermit<'_>> {
        if self.config.queue_when_busy {
            self.permits
                .acquire()
                .await
                .map_err(|_| CaptionError::Config("render queue closed".to_string()))
        } else {
            self.permits.try_acquire().map_err(|_| {
                warn!("Rejecting render job, {} already running", self.config.max_concurrent_jobs);
                CaptionError::Busy(self.config.max_concurrent_jobs)
            })
        }
    }

    async fn run_job(
        &self,
        job: &RenderJob,
        request: &ValidatedRequest,
        progress: &Option<UnboundedSender<JobEvent>>,
    ) -> Result<Vec<u8>> {
        // Markup errors must surface before the encoder runs
        let ass = encode_ass(&request.segments, &request.style)?;
        let srt = self.config.write_srt_sidecar.then(|| encode_srt(&request.segments));

        job.stage_video(&request.video).await?;
        job.stage_subtitles(&ass, srt.as_deref()).await?;
        notify(progress, job.job_id, JobState::Staged);

        notify(progress, job.job_id, JobState::Encoding);
        self.media
            .burn_subtitles(&job.video_path, &job.subtitle_path, &job.output_path)
            .await?;

        job.read_output().await
    }
}

fn notify(progress: &Option<UnboundedSender<JobEvent>>, job_id: Uuid, state: JobState) {
    if let Some(tx) = progress {
        // The receiver may have gone away; progress is advisory
        let _ = tx.send(JobEvent { job_id, state });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaProcessorTrait;
    use crate::model::{Segment, SubtitleStyle};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn render_config(root: &Path) -> RenderConfig {
        RenderConfig {
            workspace_root: Some(root.to_path_buf()),
            ..RenderConfig::default()
        }
    }

    fn request(segments: Vec<Segment>) -> RenderRequest {
        RenderRequest::new(
            b"fake video".to_vec(),
            Some("clip.mov".to_string()),
            segments,
            SubtitleStyle::default(),
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment { id: "1".into(), start: 1.5, end: 3.25, text: "Hello\nWorld".into() },
            Segment { id: "2".into(), start: 4.0, end: 6.0, text: "Again".into() },
        ]
    }

    fn workspace_count(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    async fn wait_until_empty(root: &Path) {
        for _ in 0..100 {
            if workspace_count(root) == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("workspace was not removed");
    }

    fn succeeding_processor() -> MockMediaProcessorTrait {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().returning(|video, subtitle, output| {
            assert_eq!(std::fs::read(video).unwrap(), b"fake video");
            let markup = std::fs::read_to_string(subtitle).unwrap();
            assert!(markup.starts_with("[Script Info]"));
            std::fs::write(output, b"captioned video").unwrap();
            Ok(())
        });
        media
    }

    #[tokio::test]
    async fn test_render_success_returns_output_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = RenderOrchestrator::with_processor(
            render_config(root.path()),
            Arc::new(succeeding_processor()),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();

        let output = orchestrator
            .render_with_progress(request(segments()), Some(tx))
            .await
            .unwrap();

        assert_eq!(output.bytes, b"captioned video");
        assert_eq!(output.content_type, "video/mp4");
        assert_eq!(output.filename, "video-with-captions.mp4");

        wait_until_empty(root.path()).await;

        let mut states = Vec::new();
        while let Some(event) = rx.recv().await {
            states.push(event.state);
        }
        assert_eq!(
            states,
            vec![
                JobState::Created,
                JobState::Staged,
                JobState::Encoding,
                JobState::Succeeded,
                JobState::Cleaned,
            ]
        );
    }

    #[tokio::test]
    async fn test_staged_files_use_safe_names() {
        let root = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().returning(|video, subtitle, output| {
            assert_eq!(video.file_name().unwrap(), "input.mp4");
            assert_eq!(subtitle.file_name().unwrap(), "captions.ass");
            assert!(subtitle.with_extension("srt").exists());
            std::fs::write(output, b"ok").unwrap();
            Ok(())
        });
        let orchestrator =
            RenderOrchestrator::with_processor(render_config(root.path()), Arc::new(media));

        let mut req = request(segments());
        req.filename = Some("../../etc/passwd;.sh".to_string());
        orchestrator.render(req).await.unwrap();
    }

    #[tokio::test]
    async fn test_encoder_failure_still_removes_workspace() {
        let root = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().returning(|_, _, _| {
            Err(CaptionError::EncodeFailed {
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            })
        });
        let orchestrator =
            RenderOrchestrator::with_processor(render_config(root.path()), Arc::new(media));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = orchestrator
            .render_with_progress(request(segments()), Some(tx))
            .await
            .unwrap_err();

        assert!(matches!(err, CaptionError::EncodeFailed { .. }));
        assert_eq!(workspace_count(root.path()), 0);

        let mut states = Vec::new();
        while let Some(event) = rx.recv().await {
            states.push(event.state);
        }
        assert_eq!(states.last(), Some(&JobState::Cleaned));
        assert!(states.contains(&JobState::Failed));
    }

    #[tokio::test]
    async fn test_missing_encoder_binary_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.media.binary_path = "/nonexistent/capburn-ffmpeg".to_string();
        config.render = render_config(root.path());
        let orchestrator = RenderOrchestrator::new(config).unwrap();

        let err = orchestrator.render(request(segments())).await.unwrap_err();

        assert!(matches!(err, CaptionError::EncoderUnavailable(_)));
        assert_eq!(workspace_count(root.path()), 0);
    }

    #[tokio::test]
    async fn test_invalid_segment_rejected_before_encoding() {
        let root = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().never();
        let orchestrator =
            RenderOrchestrator::with_processor(render_config(root.path()), Arc::new(media));

        let bad = vec![Segment { id: "x".into(), start: 5.0, end: 3.0, text: "backwards".into() }];
        let err = orchestrator.render(request(bad)).await.unwrap_err();

        assert!(matches!(err, CaptionError::Validation(_)));
        assert_eq!(workspace_count(root.path()), 0);
    }

    #[tokio::test]
    async fn test_malformed_color_aborts_before_encoding() {
        let root = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().never();
        let orchestrator =
            RenderOrchestrator::with_processor(render_config(root.path()), Arc::new(media));

        let mut req = request(segments());
        req.style = Some(SubtitleStyle::default().with_colors("#12345", "#000000"));
        let err = orchestrator.render(req).await.unwrap_err();

        assert!(matches!(err, CaptionError::Format(_)));
        assert_eq!(workspace_count(root.path()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_use_distinct_workspaces() {
        let root = tempfile::tempdir().unwrap();
        let seen: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().times(2).returning(move |video, _, output| {
            recorder.lock().unwrap().push(video.parent().unwrap().to_path_buf());
            std::fs::write(output, b"ok").unwrap();
            Ok(())
        });
        let orchestrator =
            RenderOrchestrator::with_processor(render_config(root.path()), Arc::new(media));

        let (first, second) = tokio::join!(
            orchestrator.render(request(segments())),
            orchestrator.render(request(segments())),
        );
        assert!(first.is_ok());
        assert!(second.is_ok());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);

        wait_until_empty(root.path()).await;
    }

    #[tokio::test]
    async fn test_busy_when_queueing_disabled() {
        let root = tempfile::tempdir().unwrap();
        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_subtitles().never();
        let config = RenderConfig {
            max_concurrent_jobs: 1,
            queue_when_busy: false,
            ..render_config(root.path())
        };
        let orchestrator = RenderOrchestrator::with_processor(config, Arc::new(media));

        let _held = orchestrator.permits.try_acquire().unwrap();
        let err = orchestrator.render(request(segments())).await.unwrap_err();

        assert!(matches!(err, CaptionError::Busy(1)));
        assert_eq!(workspace_count(root.path()), 0);
    }
}
