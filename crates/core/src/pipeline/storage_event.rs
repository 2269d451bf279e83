use serde::{Deserialize, Serialize};

use crate::identity::domain::identity::FaceId;
use crate::shared::error::IndexError;

/// Object-storage change notification, as delivered by the bucket.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StorageNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StorageEventRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

/// What happened to the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Removed,
    Other,
}

impl StorageEventRecord {
    pub fn change_kind(&self) -> ChangeKind {
        if self.event_name.starts_with("ObjectCreated:") {
            ChangeKind::Created
        } else if self.event_name.starts_with("ObjectRemoved:") {
            ChangeKind::Removed
        } else {
            ChangeKind::Other
        }
    }

    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    /// The object key with notification encoding undone (`+` is a space,
    /// `%XX` an escaped byte).
    pub fn object_key(&self) -> Result<String, IndexError> {
        let raw = self.s3.object.key.replace('+', " ");
        urlencoding::decode(&raw)
            .map(|key| key.into_owned())
            .map_err(|e| IndexError::Validation(format!("{}: {e}", self.s3.object.key)))
    }
}

/// Result of routing one notification.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    VideoPipelineStarted { video: String, job_id: String },
    FaceEnrolled { face_id: FaceId, collection: String },
    FaceRevoked { face_id: FaceId, collection: String },
    NothingToDo,
}

impl EventOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            EventOutcome::VideoPipelineStarted { .. } => 202,
            EventOutcome::FaceEnrolled { .. } => 201,
            EventOutcome::FaceRevoked { .. } | EventOutcome::NothingToDo => 200,
        }
    }

    pub fn message(&self) -> String {
        match self {
            EventOutcome::VideoPipelineStarted { video, job_id } => {
                format!("Started job {job_id} for {video}")
            }
            EventOutcome::FaceEnrolled {
                face_id,
                collection,
            } => format!("Face {face_id} added to Face Collection {collection}"),
            EventOutcome::FaceRevoked {
                face_id,
                collection,
            } => format!("Face {face_id} deleted from Face Collection {collection}"),
            EventOutcome::NothingToDo => "Nothing to do".to_string(),
        }
    }
}

/// Status/body pair reported back to whoever delivered the notification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl From<&EventOutcome> for EventResponse {
    fn from(outcome: &EventOutcome) -> Self {
        Self {
            status_code: outcome.status_code(),
            body: outcome.message(),
        }
    }
}

impl EventResponse {
    pub fn from_error(error: &IndexError) -> Self {
        Self {
            status_code: error.status_code(),
            body: error.to_string(),
        }
    }
}
