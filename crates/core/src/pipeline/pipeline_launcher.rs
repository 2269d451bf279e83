use serde::{Deserialize, Serialize};

use crate::shared::error::IndexError;
use crate::shared::storage_path::VideoKey;

/// An episode to index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub bucket: String,
    /// Object key of the video.
    pub video: String,
    /// Series collection the video's faces are searched in.
    pub collection: String,
}

impl VideoRequest {
    pub fn new(bucket: &str, video: &VideoKey) -> Self {
        Self {
            bucket: bucket.to_string(),
            video: video.key.clone(),
            collection: video.series.clone(),
        }
    }
}

/// Starts processing of an uploaded episode.
pub trait PipelineLauncher: Send + Sync {
    /// Returns the id of the started job.
    fn launch(&self, request: VideoRequest) -> Result<String, IndexError>;
}
