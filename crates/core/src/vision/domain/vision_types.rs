use crate::identity::domain::identity::FaceId;
use crate::shared::bounding_box::BoundingBox;

/// A label detected in an image, with per-instance locations when the
/// label denotes a countable object.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub confidence: f64,
    pub instances: Vec<LabelInstance>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelInstance {
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

/// A face stored in a collection by an indexing request.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedFace {
    pub face_id: FaceId,
    pub external_image_id: Option<String>,
    pub confidence: f64,
}

/// A collection face that resembles a searched image.
///
/// `confidence` is the detection confidence of the enrolled face;
/// `similarity` is how closely it matched the search image.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub face_id: FaceId,
    pub external_image_id: Option<String>,
    pub confidence: f64,
    pub similarity: f64,
}

/// Location of a video the vision service reads directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRef {
    pub bucket: String,
    pub key: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    InProgress,
    Succeeded,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Shot,
    TechnicalCue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start_timestamp_ms: i64,
    pub end_timestamp_ms: i64,
}

/// One page of a segment-detection job's results.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentDetectionPage {
    pub status: JobStatus,
    pub status_message: Option<String>,
    pub duration_ms: Option<i64>,
    pub segments: Vec<Segment>,
    pub next_token: Option<String>,
}
