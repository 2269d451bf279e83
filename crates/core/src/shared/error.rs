use std::path::PathBuf;

use thiserror::Error;

use crate::storage::domain::store_error::StoreError;
use crate::vision::domain::service_error::ServiceError;

/// Boxed error used at decoder/encoder seams, sendable across worker threads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the indexing use cases.
///
/// Missing detections and unidentifiable faces are not errors; they are
/// recorded as data (null identity, placeholder records).
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("invalid storage path: {0}")]
    Validation(String),
    #[error("vision job {job_id} is still in progress")]
    UpstreamPending { job_id: String },
    #[error("vision job {job_id} failed{}", reason_suffix(.reason))]
    UpstreamFailed {
        job_id: String,
        reason: Option<String>,
    },
    #[error("cannot open video {path}: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("video decoding failed: {0}")]
    Decode(#[source] BoxError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

impl IndexError {
    /// Result code reported back to the event source.
    pub fn status_code(&self) -> u16 {
        match self {
            IndexError::Validation(_) => 400,
            IndexError::UpstreamPending { .. } => 409,
            _ => 500,
        }
    }

    /// True when the caller should try the same request again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IndexError::UpstreamPending { .. })
    }
}
