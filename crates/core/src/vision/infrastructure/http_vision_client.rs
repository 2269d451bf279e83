use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::identity::domain::identity::FaceId;
use crate::shared::bounding_box::BoundingBox;
use crate::vision::domain::face_collection_service::FaceCollectionService;
use crate::vision::domain::frame_analyzer::FrameAnalyzer;
use crate::vision::domain::segment_detector::SegmentDetector;
use crate::vision::domain::service_error::ServiceError;
use crate::vision::domain::vision_types::{
    FaceMatch, IndexedFace, Label, SegmentDetectionPage, VideoRef,
};
use crate::vision::infrastructure::wire::{
    CreateCollectionRequest, DeleteFacesRequest, DeleteFacesResponse, DetectFacesRequest,
    DetectFacesResponse, DetectLabelsRequest, DetectLabelsResponse, Empty, ErrorBody,
    GetSegmentDetectionRequest, GetSegmentDetectionResponse, ImagePayload, IndexFacesRequest,
    IndexFacesResponse, SearchFacesByImageRequest, SearchFacesByImageResponse, SegmentFilters,
    ShotFilter, StartSegmentDetectionRequest, StartSegmentDetectionResponse,
};

/// Blocking JSON client for the vision gateway.
///
/// Every operation is a `POST {endpoint}/{Operation}` with a JSON body.
/// Non-2xx responses carry `{"__type": ..., "message": ...}` and are mapped
/// onto [`ServiceError`].
pub struct HttpVisionClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl HttpVisionClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn operation_url(&self, operation: &str) -> String {
        format!("{}/{operation}", self.endpoint)
    }

    fn call<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp, ServiceError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        log::debug!("vision call {operation}");
        let response = self
            .http
            .post(self.operation_url(operation))
            .json(body)
            .send()
            .map_err(|e| ServiceError::Transport(format!("{operation}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Resp>()
                .map_err(|e| ServiceError::Decode(format!("{operation}: {e}")));
        }

        let text = response.text().unwrap_or_default();
        Err(error_from_body(status.as_u16(), &text))
    }
}

fn error_from_body(status: u16, text: &str) -> ServiceError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) if !body.kind.is_empty() => ServiceError::from_kind(&body.kind, body.message),
        _ => ServiceError::Rejected {
            kind: format!("HTTP {status}"),
            message: text.to_string(),
        },
    }
}

impl FaceCollectionService for HttpVisionClient {
    fn create_collection(&self, collection_id: &str) -> Result<(), ServiceError> {
        self.call::<_, Empty>("CreateCollection", &CreateCollectionRequest { collection_id })?;
        Ok(())
    }

    fn index_faces(
        &self,
        collection_id: &str,
        image: &[u8],
        external_image_id: &str,
        max_faces: u32,
    ) -> Result<Vec<IndexedFace>, ServiceError> {
        let request = IndexFacesRequest {
            collection_id,
            image: ImagePayload::from_bytes(image),
            external_image_id,
            max_faces,
        };
        let response: IndexFacesResponse = self.call("IndexFaces", &request)?;
        Ok(response.into_faces())
    }

    fn delete_faces(
        &self,
        collection_id: &str,
        face_ids: &[FaceId],
    ) -> Result<Vec<FaceId>, ServiceError> {
        let response: DeleteFacesResponse = self.call(
            "DeleteFaces",
            &DeleteFacesRequest {
                collection_id,
                face_ids,
            },
        )?;
        Ok(response.deleted_faces.into_iter().map(FaceId::new).collect())
    }

    fn search_faces_by_image(
        &self,
        collection_id: &str,
        image: &[u8],
        threshold: f64,
    ) -> Result<Vec<FaceMatch>, ServiceError> {
        let request = SearchFacesByImageRequest {
            collection_id,
            image: ImagePayload::from_bytes(image),
            face_match_threshold: threshold,
        };
        let response: SearchFacesByImageResponse = self.call("SearchFacesByImage", &request)?;
        Ok(response.into_matches())
    }
}

impl FrameAnalyzer for HttpVisionClient {
    fn detect_labels(
        &self,
        image: &[u8],
        min_confidence: f64,
    ) -> Result<Vec<Label>, ServiceError> {
        let request = DetectLabelsRequest {
            image: ImagePayload::from_bytes(image),
            min_confidence,
        };
        let response: DetectLabelsResponse = self.call("DetectLabels", &request)?;
        Ok(response.into_labels())
    }

    fn detect_faces(&self, image: &[u8]) -> Result<Vec<BoundingBox>, ServiceError> {
        let request = DetectFacesRequest {
            image: ImagePayload::from_bytes(image),
        };
        let response: DetectFacesResponse = self.call("DetectFaces", &request)?;
        Ok(response.into_boxes())
    }
}

impl SegmentDetector for HttpVisionClient {
    fn start_shot_detection(
        &self,
        video: &VideoRef,
        min_confidence: f64,
    ) -> Result<String, ServiceError> {
        let request = StartSegmentDetectionRequest {
            video: video.into(),
            segment_types: vec!["SHOT"],
            filters: SegmentFilters {
                shot_filter: ShotFilter {
                    min_segment_confidence: min_confidence,
                },
            },
        };
        let response: StartSegmentDetectionResponse =
            self.call("StartSegmentDetection", &request)?;
        Ok(response.job_id)
    }

    fn get_shot_detection(
        &self,
        vision_job_id: &str,
        next_token: Option<&str>,
    ) -> Result<SegmentDetectionPage, ServiceError> {
        let request = GetSegmentDetectionRequest {
            job_id: vision_job_id,
            next_token,
        };
        let response: GetSegmentDetectionResponse = self.call("GetSegmentDetection", &request)?;
        response.into_page().map_err(ServiceError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_url_trims_trailing_slash() {
        let client = HttpVisionClient::new("http://localhost:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.operation_url("DetectFaces"),
            "http://localhost:9000/DetectFaces"
        );
    }

    #[test]
    fn test_error_body_maps_to_service_error() {
        let err = error_from_body(
            400,
            r#"{"__type":"ResourceAlreadyExistsException","message":"exists"}"#,
        );
        assert!(matches!(err, ServiceError::AlreadyExists(m) if m == "exists"));
    }

    #[test]
    fn test_unstructured_error_body_keeps_status() {
        let err = error_from_body(502, "bad gateway");
        match err {
            ServiceError::Rejected { kind, message } => {
                assert_eq!(kind, "HTTP 502");
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        let client = HttpVisionClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.detect_faces(b"img").unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
