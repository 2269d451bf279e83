use std::sync::Arc;

use crate::identity::identity_collection_manager::IdentityCollectionManager;
use crate::pipeline::pipeline_launcher::{PipelineLauncher, VideoRequest};
use crate::pipeline::storage_event::{ChangeKind, EventOutcome, StorageNotification};
use crate::shared::error::IndexError;
use crate::shared::storage_path::StorageKey;

/// Routes storage notifications to enrollment, revocation or the video
/// pipeline.
///
/// Records are handled in order and the first one that does something
/// ends the handling; later records in the same notification are ignored.
/// Keys outside the upload conventions are rejected before any external
/// call is made for them.
pub struct HandleStorageEventUseCase {
    identities: IdentityCollectionManager,
    launcher: Arc<dyn PipelineLauncher>,
}

impl HandleStorageEventUseCase {
    pub fn new(identities: IdentityCollectionManager, launcher: Arc<dyn PipelineLauncher>) -> Self {
        Self {
            identities,
            launcher,
        }
    }

    pub fn execute(&self, notification: &StorageNotification) -> Result<EventOutcome, IndexError> {
        for record in &notification.records {
            let key = record.object_key()?;
            log::info!("{}, {}, {}", record.event_name, record.bucket(), key);

            match (StorageKey::parse(&key)?, record.change_kind()) {
                (StorageKey::Video(video), ChangeKind::Created) => {
                    let job_id = self.launcher.launch(VideoRequest::new(record.bucket(), &video))?;
                    return Ok(EventOutcome::VideoPipelineStarted {
                        video: video.key,
                        job_id,
                    });
                }
                (StorageKey::Video(video), _) => {
                    return Err(IndexError::Validation(format!(
                        "{} on {}: only episode uploads are processed",
                        record.event_name, video.key
                    )));
                }
                (StorageKey::ReferenceFace(face), ChangeKind::Created) => {
                    log::info!("Adding entry to Face Collection");
                    if let Some(face_id) = self.identities.enroll(&face)? {
                        return Ok(EventOutcome::FaceEnrolled {
                            face_id,
                            collection: face.series,
                        });
                    }
                }
                (StorageKey::ReferenceFace(face), ChangeKind::Removed) => {
                    log::info!("Deleting entry from Face Collection");
                    if let Some(face_id) = self.identities.revoke(&face)? {
                        return Ok(EventOutcome::FaceRevoked {
                            face_id,
                            collection: face.series,
                        });
                    }
                }
                (StorageKey::ReferenceFace(face), ChangeKind::Other) => {
                    return Err(IndexError::Validation(format!(
                        "{} on {}: reference images are only added or removed",
                        record.event_name, face.key
                    )));
                }
            }
        }
        Ok(EventOutcome::NothingToDo)
    }
}
