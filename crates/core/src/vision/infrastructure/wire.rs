//! JSON payloads exchanged with the vision gateway.
//!
//! Field names follow the gateway's PascalCase convention; conversions into
//! domain types live here so the client stays a thin transport.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::identity::domain::identity::FaceId;
use crate::shared::bounding_box::BoundingBox;
use crate::vision::domain::vision_types::{
    FaceMatch, IndexedFace, JobStatus, Label, LabelInstance, Segment, SegmentDetectionPage,
    SegmentKind, VideoRef,
};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImagePayload {
    pub bytes: String,
}

impl ImagePayload {
    pub fn from_bytes(image: &[u8]) -> Self {
        Self {
            bytes: STANDARD.encode(image),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Object {
    pub bucket: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoPayload {
    pub s3_object: S3Object,
}

impl From<&VideoRef> for VideoPayload {
    fn from(video: &VideoRef) -> Self {
        Self {
            s3_object: S3Object {
                bucket: video.bucket.clone(),
                name: video.key.clone(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateCollectionRequest<'a> {
    pub collection_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexFacesRequest<'a> {
    pub collection_id: &'a str,
    pub image: ImagePayload,
    pub external_image_id: &'a str,
    pub max_faces: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteFacesRequest<'a> {
    pub collection_id: &'a str,
    pub face_ids: &'a [FaceId],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFacesByImageRequest<'a> {
    pub collection_id: &'a str,
    pub image: ImagePayload,
    pub face_match_threshold: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsRequest {
    pub image: ImagePayload,
    pub min_confidence: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesRequest {
    pub image: ImagePayload,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShotFilter {
    pub min_segment_confidence: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentFilters {
    pub shot_filter: ShotFilter,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartSegmentDetectionRequest {
    pub video: VideoPayload,
    pub segment_types: Vec<&'static str>,
    pub filters: SegmentFilters,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSegmentDetectionRequest<'a> {
    pub job_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<&'a str>,
}

#[derive(Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: String,
    #[serde(alias = "Message", default)]
    pub message: String,
}

#[derive(Deserialize)]
pub struct Empty {}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireBoundingBox {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl From<WireBoundingBox> for BoundingBox {
    fn from(b: WireBoundingBox) -> Self {
        BoundingBox::new(b.left, b.top, b.width, b.height)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireFace {
    pub face_id: String,
    #[serde(default)]
    pub external_image_id: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceRecord {
    pub face: WireFace,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexFacesResponse {
    #[serde(default)]
    pub face_records: Vec<FaceRecord>,
}

impl IndexFacesResponse {
    pub fn into_faces(self) -> Vec<IndexedFace> {
        self.face_records
            .into_iter()
            .map(|r| IndexedFace {
                face_id: FaceId::new(r.face.face_id),
                external_image_id: r.face.external_image_id,
                confidence: r.face.confidence,
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteFacesResponse {
    #[serde(default)]
    pub deleted_faces: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireFaceMatch {
    #[serde(default)]
    pub similarity: f64,
    pub face: WireFace,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFacesByImageResponse {
    #[serde(default)]
    pub face_matches: Vec<WireFaceMatch>,
}

impl SearchFacesByImageResponse {
    pub fn into_matches(self) -> Vec<FaceMatch> {
        self.face_matches
            .into_iter()
            .map(|m| FaceMatch {
                face_id: FaceId::new(m.face.face_id),
                external_image_id: m.face.external_image_id,
                confidence: m.face.confidence,
                similarity: m.similarity,
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireInstance {
    #[serde(default)]
    pub confidence: f64,
    pub bounding_box: WireBoundingBox,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireLabel {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub instances: Vec<WireInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsResponse {
    #[serde(default)]
    pub labels: Vec<WireLabel>,
}

impl DetectLabelsResponse {
    pub fn into_labels(self) -> Vec<Label> {
        self.labels
            .into_iter()
            .map(|l| Label {
                name: l.name,
                confidence: l.confidence,
                instances: l
                    .instances
                    .into_iter()
                    .map(|i| LabelInstance {
                        confidence: i.confidence,
                        bounding_box: i.bounding_box.into(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireFaceDetail {
    pub bounding_box: WireBoundingBox,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesResponse {
    #[serde(default)]
    pub face_details: Vec<WireFaceDetail>,
}

impl DetectFacesResponse {
    pub fn into_boxes(self) -> Vec<BoundingBox> {
        self.face_details
            .into_iter()
            .map(|d| d.bounding_box.into())
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartSegmentDetectionResponse {
    pub job_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireVideoMetadata {
    #[serde(default)]
    pub duration_millis: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireSegment {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default)]
    pub start_timestamp_millis: i64,
    #[serde(default)]
    pub end_timestamp_millis: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSegmentDetectionResponse {
    pub job_status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub video_metadata: Vec<WireVideoMetadata>,
    #[serde(default)]
    pub segments: Vec<WireSegment>,
    #[serde(default)]
    pub next_token: Option<String>,
}

impl GetSegmentDetectionResponse {
    pub fn into_page(self) -> Result<SegmentDetectionPage, String> {
        let status = match self.job_status.as_str() {
            "IN_PROGRESS" => JobStatus::InProgress,
            "SUCCEEDED" => JobStatus::Succeeded,
            "FAILED" => JobStatus::Failed,
            other => return Err(format!("unknown job status {other}")),
        };

        let segments = self
            .segments
            .into_iter()
            .filter_map(|s| {
                let kind = match s.kind.as_str() {
                    "SHOT" => SegmentKind::Shot,
                    "TECHNICAL_CUE" => SegmentKind::TechnicalCue,
                    _ => return None,
                };
                Some(Segment {
                    kind,
                    start_timestamp_ms: s.start_timestamp_millis,
                    end_timestamp_ms: s.end_timestamp_millis,
                })
            })
            .collect();

        Ok(SegmentDetectionPage {
            status,
            status_message: self.status_message,
            duration_ms: self.video_metadata.first().and_then(|m| m.duration_millis),
            segments,
            next_token: self.next_token.filter(|t| !t.is_empty()),
        })
    }
}
