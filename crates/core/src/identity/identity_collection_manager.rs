use std::sync::Arc;

use crate::identity::domain::identity::{FaceId, Identity};
use crate::shared::constants::MAX_FACES_PER_REFERENCE_IMAGE;
use crate::shared::error::IndexError;
use crate::shared::storage_path::FaceKey;
use crate::storage::domain::object_store::ObjectStore;
use crate::storage::domain::record_store::{CollectionRegistry, IdentityStore};
use crate::vision::domain::face_collection_service::FaceCollectionService;
use crate::vision::domain::service_error::ServiceError;

/// Keeps each series' face collection in step with its reference images.
///
/// A reference image upload enrolls one face; deleting the image removes
/// that face again. Collections are created on first enrollment.
pub struct IdentityCollectionManager {
    collections: Arc<dyn FaceCollectionService>,
    registry: Arc<dyn CollectionRegistry>,
    identities: Arc<dyn IdentityStore>,
    objects: Arc<dyn ObjectStore>,
}

impl IdentityCollectionManager {
    pub fn new(
        collections: Arc<dyn FaceCollectionService>,
        registry: Arc<dyn CollectionRegistry>,
        identities: Arc<dyn IdentityStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            collections,
            registry,
            identities,
            objects,
        }
    }

    /// Indexes the face in a reference image under `{artist}-{role}`.
    ///
    /// Returns `None` when the image contains no detectable face; that is
    /// not an error, reference images are often low quality.
    ///
    /// An image uploaded again under the same key replaces the face that
    /// was enrolled from it, so each key maps to at most one face.
    pub fn enroll(&self, face: &FaceKey) -> Result<Option<FaceId>, IndexError> {
        self.ensure_collection(&face.series)?;

        let image = self.objects.get(&face.key)?;
        self.forget_previous(face)?;

        log::info!("Indexing new face for {}", face.artist);
        let indexed = self.collections.index_faces(
            &face.series,
            &image,
            &face.external_image_id(),
            MAX_FACES_PER_REFERENCE_IMAGE,
        )?;

        let Some(first) = indexed.into_iter().next() else {
            log::info!("No face found in {}", face.key);
            return Ok(None);
        };

        let identity = Identity::from_reference(first.face_id, face);
        self.identities.put(&identity)?;
        log::info!(
            "Enrolled face {} for {} ({}) in {}",
            identity.face_id,
            identity.name,
            identity.role,
            face.series
        );
        Ok(Some(identity.face_id))
    }

    /// Removes the face enrolled from `face.key`, if any.
    ///
    /// More than one mapping for the same image is an integrity problem;
    /// nothing is deleted in that case.
    pub fn revoke(&self, face: &FaceKey) -> Result<Option<FaceId>, IndexError> {
        let mut matches = self.identities.find_by_filepath(&face.key)?;
        if matches.len() > 1 {
            log::warn!(
                "{} faces are mapped to {}; refusing to delete",
                matches.len(),
                face.key
            );
            return Ok(None);
        }
        let Some(identity) = matches.pop() else {
            log::info!("No enrolled face for {}", face.key);
            return Ok(None);
        };

        log::info!("Deleting face {} from {}", identity.face_id, face.series);
        self.collections
            .delete_faces(&face.series, std::slice::from_ref(&identity.face_id))?;
        self.identities.delete(&identity.face_id)?;
        Ok(Some(identity.face_id))
    }

    /// Drops every face and mapping left from an earlier upload of `face.key`.
    fn forget_previous(&self, face: &FaceKey) -> Result<(), IndexError> {
        let previous = self.identities.find_by_filepath(&face.key)?;
        if previous.is_empty() {
            return Ok(());
        }

        log::info!(
            "Replacing {} enrolled face(s) for {}",
            previous.len(),
            face.key
        );
        let face_ids: Vec<FaceId> = previous.into_iter().map(|i| i.face_id).collect();
        self.collections.delete_faces(&face.series, &face_ids)?;
        for face_id in &face_ids {
            self.identities.delete(face_id)?;
        }
        Ok(())
    }

    /// Creates the series collection unless it is already registered.
    ///
    /// A concurrent creator winning the race surfaces as `AlreadyExists`,
    /// which counts as success.
    fn ensure_collection(&self, series: &str) -> Result<(), IndexError> {
        if self.registry.contains(series)? {
            return Ok(());
        }

        log::info!("Creating collection {series}");
        match self.collections.create_collection(series) {
            Ok(()) => {}
            Err(ServiceError::AlreadyExists(_)) => {
                log::debug!("Collection {series} already exists");
            }
            Err(e) => return Err(e.into()),
        }
        self.registry.insert(series)?;
        Ok(())
    }
}
