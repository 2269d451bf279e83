use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::extract_frames_use_case::{ExtractFramesUseCase, ExtractedFrames};
use crate::pipeline::pipeline_launcher::{PipelineLauncher, VideoRequest};
use crate::pipeline::process_frame_use_case::{FrameTask, ProcessFrameUseCase};
use crate::pipeline::record_job_use_case::RecordJobUseCase;
use crate::pipeline::start_shot_detection_use_case::{
    ShotDetectionTicket, StartShotDetectionUseCase,
};
use crate::shared::error::IndexError;

const JOB_ID_PREFIX: &str = "cast-index:job";

/// Polling and fan-out limits.
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub frame_workers: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameFailure {
    pub frame_key: String,
    pub error: String,
}

/// Summary of one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineReport {
    pub job_id: String,
    pub video_duration_ms: i64,
    pub frames: usize,
    pub records: usize,
    pub failed_frames: Vec<FrameFailure>,
}

/// Runs the whole indexing pipeline for one video in-process.
///
/// Layout: `start → extract (polled) → record → [process frame] × N`
///
/// Frames are processed concurrently on `frame_workers` threads. A frame
/// that fails is reported and does not stop the others.
pub struct VideoPipeline {
    start: StartShotDetectionUseCase,
    extract: ExtractFramesUseCase,
    record: RecordJobUseCase,
    process: ProcessFrameUseCase,
    settings: PipelineSettings,
}

impl VideoPipeline {
    pub fn new(
        start: StartShotDetectionUseCase,
        extract: ExtractFramesUseCase,
        record: RecordJobUseCase,
        process: ProcessFrameUseCase,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            start,
            extract,
            record,
            process,
            settings,
        }
    }

    pub fn run(&self, request: &VideoRequest) -> Result<PipelineReport, IndexError> {
        let job_id = format!("{JOB_ID_PREFIX}:{}", Uuid::new_v4());
        let ticket = self.start.execute(request, &job_id)?;
        let extracted = self.wait_for_frames(&ticket)?;
        let job = self.record.execute(&ticket, extracted.duration_ms)?;

        let tasks: Vec<FrameTask> = extracted
            .frames
            .iter()
            .map(|frame_key| FrameTask {
                frame_key: frame_key.clone(),
                collection: ticket.collection.clone(),
                job_id: job.job_id.clone(),
            })
            .collect();
        let (records, failed_frames) = self.process_frames(tasks);

        if !failed_frames.is_empty() {
            log::warn!(
                "{} of {} frames failed for job {}",
                failed_frames.len(),
                extracted.frames.len(),
                job.job_id
            );
        }
        Ok(PipelineReport {
            job_id: job.job_id,
            video_duration_ms: job.video_duration_ms,
            frames: extracted.frames.len(),
            records,
            failed_frames,
        })
    }

    /// Retries frame extraction at a fixed interval while the detection
    /// job is still running.
    fn wait_for_frames(&self, ticket: &ShotDetectionTicket) -> Result<ExtractedFrames, IndexError> {
        let mut attempt = 1;
        loop {
            match self.extract.execute(ticket) {
                Err(e) if e.is_retryable() && attempt < self.settings.max_polls => {
                    log::info!(
                        "Shot detection still running (poll {attempt}/{}), retrying in {:?}",
                        self.settings.max_polls,
                        self.settings.poll_interval
                    );
                    std::thread::sleep(self.settings.poll_interval);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn process_frames(&self, tasks: Vec<FrameTask>) -> (usize, Vec<FrameFailure>) {
        let workers = self.settings.frame_workers.clamp(1, tasks.len().max(1));
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<FrameTask>();
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(String, Result<usize, IndexError>)>();

        for task in tasks {
            // Receiver is alive until the scope below ends.
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for task in task_rx {
                        let result = self.process.execute(&task).map(|records| records.len());
                        if result_tx.send((task.frame_key, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut records = 0;
        let mut failures = Vec::new();
        for (frame_key, result) in result_rx {
            match result {
                Ok(count) => records += count,
                Err(e) => {
                    log::warn!("Frame {frame_key} failed: {e}");
                    failures.push(FrameFailure {
                        frame_key,
                        error: e.to_string(),
                    });
                }
            }
        }
        failures.sort_by(|a, b| a.frame_key.cmp(&b.frame_key));
        (records, failures)
    }
}

impl PipelineLauncher for VideoPipeline {
    fn launch(&self, request: VideoRequest) -> Result<String, IndexError> {
        let report = self.run(&request)?;
        log::info!(
            "Job {} indexed {} frames into {} records",
            report.job_id,
            report.frames,
            report.records
        );
        Ok(report.job_id)
    }
}
