//! In-memory stand-ins for the vision service and the stores, shared by
//! unit tests across modules.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;

use crate::appearance::domain::appearance_record::AppearanceRecord;
use crate::identity::domain::identity::{FaceId, Identity};
use crate::pipeline::detection_job::DetectionJob;
use crate::shared::bounding_box::BoundingBox;
use crate::storage::domain::object_store::ObjectStore;
use crate::storage::domain::record_store::{
    AppearanceStore, CollectionRegistry, IdentityStore, JobStore,
};
use crate::storage::domain::store_error::StoreError;
use crate::vision::domain::face_collection_service::FaceCollectionService;
use crate::vision::domain::frame_analyzer::FrameAnalyzer;
use crate::vision::domain::segment_detector::SegmentDetector;
use crate::vision::domain::service_error::ServiceError;
use crate::vision::domain::vision_types::{
    FaceMatch, IndexedFace, Label, SegmentDetectionPage, VideoRef,
};

/// Scripted search outcome for one `search_faces_by_image` call.
pub enum SearchOutcome {
    Matches(Vec<FaceMatch>),
    Fail,
}

/// Fake vision service recording every call it receives.
#[derive(Default)]
pub struct FakeVision {
    pub calls: Mutex<Vec<String>>,
    pub collections: Mutex<BTreeSet<String>>,
    /// collection → face id → external image id
    pub faces: Mutex<BTreeMap<String, BTreeMap<FaceId, String>>>,
    /// When false, `index_faces` finds no face in the image.
    pub finds_faces: Mutex<bool>,
    pub next_face_id: Mutex<usize>,
    pub searches: Mutex<VecDeque<SearchOutcome>>,
    pub search_images: Mutex<Vec<Vec<u8>>>,
    pub labels: Mutex<Vec<Label>>,
    pub face_boxes: Mutex<Vec<BoundingBox>>,
    pub started: Mutex<Vec<(VideoRef, f64)>>,
    /// token (None for the first page) → page
    pub pages: Mutex<HashMap<Option<String>, SegmentDetectionPage>>,
}

impl FakeVision {
    pub fn new() -> Self {
        let fake = Self::default();
        *fake.finds_faces.lock().unwrap() = true;
        fake
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn enrolled(&self, collection: &str) -> usize {
        self.faces
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, |f| f.len())
    }

    pub fn push_search(&self, outcome: SearchOutcome) {
        self.searches.lock().unwrap().push_back(outcome);
    }
}

impl FaceCollectionService for FakeVision {
    fn create_collection(&self, collection_id: &str) -> Result<(), ServiceError> {
        self.record(format!("create_collection:{collection_id}"));
        if !self
            .collections
            .lock()
            .unwrap()
            .insert(collection_id.to_string())
        {
            return Err(ServiceError::AlreadyExists(collection_id.to_string()));
        }
        Ok(())
    }

    fn index_faces(
        &self,
        collection_id: &str,
        _image: &[u8],
        external_image_id: &str,
        max_faces: u32,
    ) -> Result<Vec<IndexedFace>, ServiceError> {
        self.record(format!("index_faces:{collection_id}:{external_image_id}:{max_faces}"));
        if !self.collections.lock().unwrap().contains(collection_id) {
            return Err(ServiceError::NotFound(collection_id.to_string()));
        }
        if !*self.finds_faces.lock().unwrap() {
            return Ok(Vec::new());
        }
        let mut next = self.next_face_id.lock().unwrap();
        *next += 1;
        let face_id = FaceId::new(format!("face-{}", *next));
        self.faces
            .lock()
            .unwrap()
            .entry(collection_id.to_string())
            .or_default()
            .insert(face_id.clone(), external_image_id.to_string());
        Ok(vec![IndexedFace {
            face_id,
            external_image_id: Some(external_image_id.to_string()),
            confidence: 99.9,
        }])
    }

    fn delete_faces(
        &self,
        collection_id: &str,
        face_ids: &[FaceId],
    ) -> Result<Vec<FaceId>, ServiceError> {
        self.record(format!("delete_faces:{collection_id}"));
        let mut faces = self.faces.lock().unwrap();
        let collection = faces.entry(collection_id.to_string()).or_default();
        Ok(face_ids
            .iter()
            .filter(|id| collection.remove(*id).is_some())
            .cloned()
            .collect())
    }

    fn search_faces_by_image(
        &self,
        collection_id: &str,
        image: &[u8],
        _threshold: f64,
    ) -> Result<Vec<FaceMatch>, ServiceError> {
        self.record(format!("search_faces:{collection_id}"));
        self.search_images.lock().unwrap().push(image.to_vec());
        match self.searches.lock().unwrap().pop_front() {
            Some(SearchOutcome::Matches(m)) => Ok(m),
            Some(SearchOutcome::Fail) => {
                Err(ServiceError::InvalidImage("no face in crop".into()))
            }
            None => Ok(Vec::new()),
        }
    }
}

impl FrameAnalyzer for FakeVision {
    fn detect_labels(
        &self,
        _image: &[u8],
        min_confidence: f64,
    ) -> Result<Vec<Label>, ServiceError> {
        self.record(format!("detect_labels:{min_confidence}"));
        Ok(self.labels.lock().unwrap().clone())
    }

    fn detect_faces(&self, _image: &[u8]) -> Result<Vec<BoundingBox>, ServiceError> {
        self.record("detect_faces");
        Ok(self.face_boxes.lock().unwrap().clone())
    }
}

impl SegmentDetector for FakeVision {
    fn start_shot_detection(
        &self,
        video: &VideoRef,
        min_confidence: f64,
    ) -> Result<String, ServiceError> {
        self.record(format!("start_shot_detection:{}", video.key));
        self.started
            .lock()
            .unwrap()
            .push((video.clone(), min_confidence));
        Ok("vision-job-1".to_string())
    }

    fn get_shot_detection(
        &self,
        vision_job_id: &str,
        next_token: Option<&str>,
    ) -> Result<SegmentDetectionPage, ServiceError> {
        self.record(format!(
            "get_shot_detection:{vision_job_id}:{}",
            next_token.unwrap_or("-")
        ));
        self.pages
            .lock()
            .unwrap()
            .get(&next_token.map(str::to_string))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(vision_job_id.to_string()))
    }
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub identities: Mutex<Vec<Identity>>,
    pub collections: Mutex<BTreeSet<String>>,
    pub jobs: Mutex<Vec<DetectionJob>>,
    pub appearances: Mutex<Vec<AppearanceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, body: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
        self
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn identity_count(&self) -> usize {
        self.identities.lock().unwrap().len()
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
        Ok(())
    }
}

impl IdentityStore for MemoryStore {
    fn put(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut identities = self.identities.lock().unwrap();
        identities.retain(|i| i.face_id != identity.face_id);
        identities.push(identity.clone());
        Ok(())
    }

    fn find_by_filepath(&self, filepath: &str) -> Result<Vec<Identity>, StoreError> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.filepath == filepath)
            .cloned()
            .collect())
    }

    fn delete(&self, face_id: &FaceId) -> Result<(), StoreError> {
        self.identities
            .lock()
            .unwrap()
            .retain(|i| &i.face_id != face_id);
        Ok(())
    }
}

impl CollectionRegistry for MemoryStore {
    fn contains(&self, collection_id: &str) -> Result<bool, StoreError> {
        Ok(self.collections.lock().unwrap().contains(collection_id))
    }

    fn insert(&self, collection_id: &str) -> Result<(), StoreError> {
        self.collections
            .lock()
            .unwrap()
            .insert(collection_id.to_string());
        Ok(())
    }
}

impl JobStore for MemoryStore {
    fn put(&self, job: &DetectionJob) -> Result<(), StoreError> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }

    fn get(&self, job_id: &str) -> Result<Option<DetectionJob>, StoreError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.job_id == job_id)
            .cloned())
    }
}

impl AppearanceStore for MemoryStore {
    fn put_batch(&self, records: &[AppearanceRecord]) -> Result<(), StoreError> {
        self.appearances
            .lock()
            .unwrap()
            .extend_from_slice(records);
        Ok(())
    }

    fn list_for_job(&self, job_id: &str) -> Result<Vec<AppearanceRecord>, StoreError> {
        Ok(self
            .appearances
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.job_id == job_id)
            .cloned()
            .collect())
    }
}

/// Solid-color RGB image encoded as PNG.
pub fn png_image(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}
