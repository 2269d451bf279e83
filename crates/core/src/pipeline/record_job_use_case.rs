use std::sync::Arc;

use chrono::Utc;

use crate::pipeline::detection_job::DetectionJob;
use crate::pipeline::start_shot_detection_use_case::ShotDetectionTicket;
use crate::shared::error::IndexError;
use crate::shared::storage_path::job_suffix;
use crate::storage::domain::record_store::JobStore;

/// Persists the bookkeeping row for a processed video.
pub struct RecordJobUseCase {
    jobs: Arc<dyn JobStore>,
}

impl RecordJobUseCase {
    pub fn new(jobs: Arc<dyn JobStore>) -> Self {
        Self { jobs }
    }

    /// Stores the job under the short form of its id.
    pub fn execute(
        &self,
        ticket: &ShotDetectionTicket,
        video_duration_ms: i64,
    ) -> Result<DetectionJob, IndexError> {
        let job = DetectionJob {
            job_id: job_suffix(&ticket.job_id).to_string(),
            collection_id: ticket.collection.clone(),
            filepath: ticket.video.clone(),
            video_duration_ms,
            job_date: Utc::now(),
        };
        log::info!("Recording job {}", job.job_id);
        self.jobs.put(&job)?;
        Ok(job)
    }
}
