use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pipeline::start_shot_detection_use_case::ShotDetectionTicket;
use crate::shared::constants::VIDEO_EXTENSION;
use crate::shared::error::IndexError;
use crate::shared::storage_path::{episode_name, frame_key};
use crate::storage::domain::object_store::ObjectStore;
use crate::video::domain::frame_encoder::FrameEncoder;
use crate::video::domain::shot_frame_selector::ShotFrameSelector;
use crate::video::domain::video_reader::VideoReader;
use crate::vision::domain::segment_detector::SegmentDetector;
use crate::vision::domain::vision_types::{JobStatus, SegmentKind};

/// Builds a fresh decoder for each extraction.
pub type ReaderFactory = Box<dyn Fn() -> Box<dyn VideoReader> + Send + Sync>;

/// Frames stored for a job, plus the video duration the vision service
/// reported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFrames {
    pub frames: Vec<String>,
    pub duration_ms: i64,
}

/// Turns a finished shot-detection job into stored frame images, one per
/// shot start.
pub struct ExtractFramesUseCase {
    detector: Arc<dyn SegmentDetector>,
    objects: Arc<dyn ObjectStore>,
    reader_factory: ReaderFactory,
    encoder: Arc<dyn FrameEncoder>,
}

impl ExtractFramesUseCase {
    pub fn new(
        detector: Arc<dyn SegmentDetector>,
        objects: Arc<dyn ObjectStore>,
        reader_factory: ReaderFactory,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Self {
        Self {
            detector,
            objects,
            reader_factory,
            encoder,
        }
    }

    /// Fails with [`IndexError::UpstreamPending`] while the detection job
    /// is still running; callers retry later.
    pub fn execute(&self, ticket: &ShotDetectionTicket) -> Result<ExtractedFrames, IndexError> {
        let (duration_ms, targets) = self.shot_starts(&ticket.vision_job_id)?;
        log::info!(
            "{} shots found in {} ({} ms)",
            targets.len(),
            ticket.video,
            duration_ms
        );

        log::info!("Downloading video file");
        let body = self.objects.get(&ticket.video)?;
        let mut video = tempfile::Builder::new()
            .prefix("cast-index-")
            .suffix(&format!(".{VIDEO_EXTENSION}"))
            .tempfile()
            .and_then(|mut file| file.write_all(&body).map(|_| file))
            .map_err(|e| IndexError::ResourceUnavailable {
                path: ticket.video.clone().into(),
                source: Box::new(e),
            })?;
        video.flush().map_err(|e| IndexError::ResourceUnavailable {
            path: video.path().to_path_buf(),
            source: Box::new(e),
        })?;

        let mut selector = ShotFrameSelector::new((self.reader_factory)(), self.encoder.clone());
        let selected = selector.select(&targets, video.path())?;

        let episode = episode_name(&ticket.video);
        let mut frames = Vec::with_capacity(selected.len());
        for frame in selected {
            let key = frame_key(&ticket.collection, &episode, &ticket.job_id, frame.timestamp_ms);
            self.objects.put(&key, &frame.image)?;
            log::debug!("Saved frame {key}");
            frames.push(key);
        }

        Ok(ExtractedFrames {
            frames,
            duration_ms,
        })
    }

    /// Reads every result page and collects the start of each shot.
    fn shot_starts(&self, vision_job_id: &str) -> Result<(i64, BTreeSet<i64>), IndexError> {
        let mut page = self.detector.get_shot_detection(vision_job_id, None)?;
        log::info!("Job status: {:?}", page.status);
        match page.status {
            JobStatus::InProgress => {
                return Err(IndexError::UpstreamPending {
                    job_id: vision_job_id.to_string(),
                })
            }
            JobStatus::Failed => {
                return Err(IndexError::UpstreamFailed {
                    job_id: vision_job_id.to_string(),
                    reason: page.status_message.take(),
                })
            }
            JobStatus::Succeeded => {}
        }

        let duration_ms = page.duration_ms.unwrap_or_else(|| {
            log::warn!("No video duration reported for {vision_job_id}");
            0
        });

        let mut starts = BTreeSet::new();
        loop {
            starts.extend(
                page.segments
                    .iter()
                    .filter(|s| s.kind == SegmentKind::Shot)
                    .map(|s| s.start_timestamp_ms),
            );
            let Some(token) = page.next_token.take() else {
                break;
            };
            page = self.detector.get_shot_detection(vision_job_id, Some(&token))?;
        }
        Ok((duration_ms, starts))
    }
}
