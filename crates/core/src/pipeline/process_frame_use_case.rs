use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::appearance::domain::appearance_record::AppearanceRecord;
use crate::appearance::domain::appearance_resolver::resolve_appearances;
use crate::appearance::domain::detection::PersonDetection;
use crate::appearance::face_identifier::FaceIdentifier;
use crate::shared::constants::PERSON_LABEL;
use crate::shared::error::IndexError;
use crate::shared::storage_path::frame_timestamp;
use crate::storage::domain::object_store::ObjectStore;
use crate::storage::domain::record_store::AppearanceStore;
use crate::vision::domain::frame_analyzer::FrameAnalyzer;

/// One stored frame awaiting analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameTask {
    pub frame_key: String,
    pub collection: String,
    /// Short job id the records are filed under.
    pub job_id: String,
}

/// Detects people and faces in a frame, identifies the faces and stores
/// the resolved appearances.
pub struct ProcessFrameUseCase {
    analyzer: Arc<dyn FrameAnalyzer>,
    identifier: FaceIdentifier,
    objects: Arc<dyn ObjectStore>,
    appearances: Arc<dyn AppearanceStore>,
    label_min_confidence: f64,
}

impl ProcessFrameUseCase {
    pub fn new(
        analyzer: Arc<dyn FrameAnalyzer>,
        identifier: FaceIdentifier,
        objects: Arc<dyn ObjectStore>,
        appearances: Arc<dyn AppearanceStore>,
        label_min_confidence: f64,
    ) -> Self {
        Self {
            analyzer,
            identifier,
            objects,
            appearances,
            label_min_confidence,
        }
    }

    /// Always stores at least one record for the frame.
    pub fn execute(&self, task: &FrameTask) -> Result<Vec<AppearanceRecord>, IndexError> {
        let timestamp = frame_timestamp(&task.frame_key);
        let image = self.objects.get(&task.frame_key)?;

        let persons: Vec<PersonDetection> = self
            .analyzer
            .detect_labels(&image, self.label_min_confidence)?
            .into_iter()
            .filter(|label| label.name == PERSON_LABEL)
            .flat_map(|label| label.instances)
            .map(|instance| PersonDetection {
                confidence: instance.confidence,
                bounding_box: instance.bounding_box,
            })
            .collect();
        let faces = self.analyzer.detect_faces(&image)?;
        let identified = self
            .identifier
            .identify(&image, &faces, &task.collection)?;
        log::info!(
            "Frame {timestamp}: {} persons, {} faces, {} identified",
            persons.len(),
            faces.len(),
            identified.len()
        );

        let records = resolve_appearances(&persons, &identified, &timestamp, &task.job_id);
        self.appearances.put_batch(&records)?;
        log::debug!("Stored {} records for frame {timestamp}", records.len());
        Ok(records)
    }
}
