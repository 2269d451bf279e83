use crate::appearance::domain::appearance_record::AppearanceRecord;
use crate::identity::domain::identity::{FaceId, Identity};
use crate::pipeline::detection_job::DetectionJob;
use crate::storage::domain::store_error::StoreError;

/// Enrolled-face mappings, keyed by face id and searchable by the
/// reference image they were indexed from.
pub trait IdentityStore: Send + Sync {
    fn put(&self, identity: &Identity) -> Result<(), StoreError>;

    fn find_by_filepath(&self, filepath: &str) -> Result<Vec<Identity>, StoreError>;

    fn delete(&self, face_id: &FaceId) -> Result<(), StoreError>;
}

/// Collections known to exist on the vision service.
pub trait CollectionRegistry: Send + Sync {
    fn contains(&self, collection_id: &str) -> Result<bool, StoreError>;

    fn insert(&self, collection_id: &str) -> Result<(), StoreError>;
}

pub trait JobStore: Send + Sync {
    fn put(&self, job: &DetectionJob) -> Result<(), StoreError>;

    fn get(&self, job_id: &str) -> Result<Option<DetectionJob>, StoreError>;
}

/// Appearance records keyed by `(job_id, video_timestamp)`; writing an
/// existing key replaces it.
pub trait AppearanceStore: Send + Sync {
    fn put_batch(&self, records: &[AppearanceRecord]) -> Result<(), StoreError>;

    /// Records of one job, ordered by `video_timestamp`.
    fn list_for_job(&self, job_id: &str) -> Result<Vec<AppearanceRecord>, StoreError>;
}
