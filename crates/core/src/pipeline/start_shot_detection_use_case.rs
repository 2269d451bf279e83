use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pipeline::pipeline_launcher::VideoRequest;
use crate::shared::error::IndexError;
use crate::vision::domain::segment_detector::SegmentDetector;
use crate::vision::domain::vision_types::VideoRef;

/// Handle on a running shot-detection job, passed between pipeline stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotDetectionTicket {
    pub vision_job_id: String,
    pub video: String,
    pub bucket: String,
    pub collection: String,
    pub job_id: String,
}

/// Asks the vision service to find the shot boundaries of a video.
pub struct StartShotDetectionUseCase {
    detector: Arc<dyn SegmentDetector>,
    min_confidence: f64,
}

impl StartShotDetectionUseCase {
    pub fn new(detector: Arc<dyn SegmentDetector>, min_confidence: f64) -> Self {
        Self {
            detector,
            min_confidence,
        }
    }

    pub fn execute(
        &self,
        request: &VideoRequest,
        job_id: &str,
    ) -> Result<ShotDetectionTicket, IndexError> {
        log::info!(
            "Starting shot detection for {} with confidence {}",
            request.video,
            self.min_confidence
        );
        let video = VideoRef {
            bucket: request.bucket.clone(),
            key: request.video.clone(),
        };
        let vision_job_id = self
            .detector
            .start_shot_detection(&video, self.min_confidence)?;
        log::info!("Shot detection job id: {vision_job_id}");

        Ok(ShotDetectionTicket {
            vision_job_id,
            video: request.video.clone(),
            bucket: request.bucket.clone(),
            collection: request.collection.clone(),
            job_id: job_id.to_string(),
        })
    }
}
