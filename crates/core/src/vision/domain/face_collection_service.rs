use crate::identity::domain::identity::FaceId;
use crate::vision::domain::service_error::ServiceError;
use crate::vision::domain::vision_types::{FaceMatch, IndexedFace};

/// Per-series face collections held by the vision service.
pub trait FaceCollectionService: Send + Sync {
    /// Fails with [`ServiceError::AlreadyExists`] when the collection is
    /// already present.
    fn create_collection(&self, collection_id: &str) -> Result<(), ServiceError>;

    /// Detects up to `max_faces` faces in `image` and stores them in the
    /// collection tagged with `external_image_id`.
    fn index_faces(
        &self,
        collection_id: &str,
        image: &[u8],
        external_image_id: &str,
        max_faces: u32,
    ) -> Result<Vec<IndexedFace>, ServiceError>;

    /// Returns the ids that were actually removed.
    fn delete_faces(
        &self,
        collection_id: &str,
        face_ids: &[FaceId],
    ) -> Result<Vec<FaceId>, ServiceError>;

    /// Searches the collection for the largest face in `image`.
    ///
    /// Matches are ranked best first and limited to those whose similarity
    /// reaches `threshold`.
    fn search_faces_by_image(
        &self,
        collection_id: &str,
        image: &[u8],
        threshold: f64,
    ) -> Result<Vec<FaceMatch>, ServiceError>;
}
