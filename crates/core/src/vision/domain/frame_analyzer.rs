use crate::shared::bounding_box::BoundingBox;
use crate::vision::domain::service_error::ServiceError;
use crate::vision::domain::vision_types::Label;

/// Still-image analysis: labels (with instance boxes) and face locations.
pub trait FrameAnalyzer: Send + Sync {
    fn detect_labels(&self, image: &[u8], min_confidence: f64)
        -> Result<Vec<Label>, ServiceError>;

    fn detect_faces(&self, image: &[u8]) -> Result<Vec<BoundingBox>, ServiceError>;
}
