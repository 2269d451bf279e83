use serde::{Deserialize, Serialize};

use crate::appearance::domain::detection::{IdentifiedFace, PersonDetection};
use crate::shared::bounding_box::BoundingBox;

/// One subject observed in one frame.
///
/// `video_timestamp` is `{frame_timestamp_ms}_{index}`, the index being
/// unique within the frame. Identity fields are `None` when nobody could
/// be recognized; every field but `job_id`/`video_timestamp` is `None` on
/// the placeholder written for frames with no detections at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppearanceRecord {
    pub job_id: String,
    pub video_timestamp: String,
    pub confidence: Option<f64>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    /// Set when an operator attributed the appearance by hand.
    pub manual: bool,
}

impl AppearanceRecord {
    pub fn identified(job_id: &str, video_timestamp: String, face: &IdentifiedFace) -> Self {
        Self {
            job_id: job_id.to_string(),
            video_timestamp,
            confidence: Some(face.confidence),
            name: Some(face.name.clone()),
            role: Some(face.role.clone()),
            bounding_box: Some(face.bounding_box),
            manual: false,
        }
    }

    pub fn unidentified(job_id: &str, video_timestamp: String, person: &PersonDetection) -> Self {
        Self {
            job_id: job_id.to_string(),
            video_timestamp,
            confidence: Some(person.confidence),
            name: None,
            role: None,
            bounding_box: Some(person.bounding_box),
            manual: false,
        }
    }

    pub fn placeholder(job_id: &str, video_timestamp: String) -> Self {
        Self {
            job_id: job_id.to_string(),
            video_timestamp,
            confidence: None,
            name: None,
            role: None,
            bounding_box: None,
            manual: false,
        }
    }
}
