use crate::vision::domain::service_error::ServiceError;
use crate::vision::domain::vision_types::{SegmentDetectionPage, VideoRef};

/// Asynchronous shot-boundary detection over a stored video.
pub trait SegmentDetector: Send + Sync {
    /// Starts a shot detection job and returns its id.
    fn start_shot_detection(
        &self,
        video: &VideoRef,
        min_confidence: f64,
    ) -> Result<String, ServiceError>;

    fn get_shot_detection(
        &self,
        vision_job_id: &str,
        next_token: Option<&str>,
    ) -> Result<SegmentDetectionPage, ServiceError>;
}
