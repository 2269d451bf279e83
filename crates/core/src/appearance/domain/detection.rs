use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;

/// A person located in a frame by label detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonDetection {
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

/// A face that was matched against the series' identity collection.
///
/// Faces the collection could not match never become an `IdentifiedFace`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedFace {
    pub confidence: f64,
    pub name: String,
    pub role: String,
    pub bounding_box: BoundingBox,
}

/// Everything the resolver needs for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    pub job_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub persons: Vec<PersonDetection>,
    #[serde(default)]
    pub faces: Vec<IdentifiedFace>,
}
