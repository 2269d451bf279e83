use std::io::Cursor;
use std::sync::Arc;

use crate::appearance::domain::detection::IdentifiedFace;
use crate::identity::domain::identity::parse_external_image_id;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::IndexError;
use crate::vision::domain::face_collection_service::FaceCollectionService;

/// Matches detected faces in a frame against a series' identity collection.
pub struct FaceIdentifier {
    collections: Arc<dyn FaceCollectionService>,
    match_threshold: f64,
}

impl FaceIdentifier {
    pub fn new(collections: Arc<dyn FaceCollectionService>, match_threshold: f64) -> Self {
        Self {
            collections,
            match_threshold,
        }
    }

    /// Crops each face out of `frame_image`, searches the collection with
    /// the crop and keeps the best match.
    ///
    /// Faces without a match are dropped. A failed search (typically a crop
    /// too poor for the service to find a face in) ends identification for
    /// the frame: faces after it are not searched, faces before it are
    /// kept. Only an undecodable frame image is an error.
    pub fn identify(
        &self,
        frame_image: &[u8],
        faces: &[BoundingBox],
        collection_id: &str,
    ) -> Result<Vec<IdentifiedFace>, IndexError> {
        let mut identified = Vec::new();
        if faces.is_empty() {
            return Ok(identified);
        }

        let img = image::load_from_memory(frame_image)?;
        let (width, height) = (img.width(), img.height());

        for (i, face) in faces.iter().enumerate() {
            let (x, y, w, h) = face.pixel_rect(width, height);
            let mut crop = Vec::new();
            img.crop_imm(x, y, w, h)
                .write_to(&mut Cursor::new(&mut crop), image::ImageFormat::Png)?;

            let matches = match self.collections.search_faces_by_image(
                collection_id,
                &crop,
                self.match_threshold,
            ) {
                Ok(matches) => matches,
                Err(e) => {
                    log::warn!(
                        "Unable to identify face {} of {} in crop, skipping the rest: {e}",
                        i + 1,
                        faces.len()
                    );
                    break;
                }
            };

            let Some(best) = matches.into_iter().next() else {
                continue;
            };
            let Some((name, role)) = best
                .external_image_id
                .as_deref()
                .and_then(parse_external_image_id)
            else {
                log::warn!(
                    "Face {} has an unusable external image id {:?}",
                    best.face_id,
                    best.external_image_id
                );
                continue;
            };

            identified.push(IdentifiedFace {
                confidence: best.confidence,
                name,
                role,
                bounding_box: *face,
            });
        }

        log::debug!(
            "Identified {} of {} faces in {collection_id}",
            identified.len(),
            faces.len()
        );
        Ok(identified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::domain::identity::FaceId;
    use crate::test_support::{png_image, FakeVision, SearchOutcome};
    use crate::vision::domain::vision_types::FaceMatch;
    use approx::assert_relative_eq;

    fn face_match(external_id: &str, confidence: f64, similarity: f64) -> FaceMatch {
        FaceMatch {
            face_id: FaceId::new(format!("id-{external_id}")),
            external_image_id: Some(external_id.to_string()),
            confidence,
            similarity,
        }
    }

    fn boxes(n: usize) -> Vec<BoundingBox> {
        (0..n)
            .map(|i| BoundingBox::new(0.1 * i as f64, 0.1, 0.1, 0.2))
            .collect()
    }

    fn identifier(vision: &Arc<FakeVision>) -> FaceIdentifier {
        FaceIdentifier::new(vision.clone(), 80.0)
    }

    #[test]
    fn test_best_match_gives_display_identity_and_face_confidence() {
        let vision = Arc::new(FakeVision::new());
        vision.push_search(SearchOutcome::Matches(vec![
            face_match("Jane_Doe-Lead_Detective", 99.5, 97.0),
            face_match("John_Roe-Extra", 99.9, 85.0),
        ]));
        let faces = boxes(1);

        let identified = identifier(&vision)
            .identify(&png_image(100, 50), &faces, "showA")
            .unwrap();

        assert_eq!(identified.len(), 1);
        assert_eq!(identified[0].name, "Jane Doe");
        assert_eq!(identified[0].role, "Lead Detective");
        assert_relative_eq!(identified[0].confidence, 99.5);
        assert_eq!(identified[0].bounding_box, faces[0]);
    }

    #[test]
    fn test_searches_with_cropped_png() {
        let vision = Arc::new(FakeVision::new());
        let faces = vec![BoundingBox::new(0.5, 0.0, 0.5, 0.5)];

        identifier(&vision)
            .identify(&png_image(100, 40), &faces, "showA")
            .unwrap();

        let sent = vision.search_images.lock().unwrap()[0].clone();
        let crop = image::load_from_memory(&sent).unwrap();
        assert_eq!(
            image::guess_format(&sent).unwrap(),
            image::ImageFormat::Png
        );
        assert_eq!((crop.width(), crop.height()), (50, 20));
    }

    #[test]
    fn test_unmatched_faces_are_dropped() {
        let vision = Arc::new(FakeVision::new());
        vision.push_search(SearchOutcome::Matches(vec![]));
        vision.push_search(SearchOutcome::Matches(vec![face_match("A-B", 90.0, 90.0)]));

        let identified = identifier(&vision)
            .identify(&png_image(100, 50), &boxes(2), "showA")
            .unwrap();

        assert_eq!(identified.len(), 1);
        assert_eq!(identified[0].name, "A");
    }

    #[test]
    fn test_search_failure_abandons_remaining_faces() {
        let vision = Arc::new(FakeVision::new());
        vision.push_search(SearchOutcome::Matches(vec![face_match("A-B", 90.0, 90.0)]));
        vision.push_search(SearchOutcome::Fail);
        vision.push_search(SearchOutcome::Matches(vec![face_match("C-D", 90.0, 90.0)]));

        let identified = identifier(&vision)
            .identify(&png_image(100, 50), &boxes(3), "showA")
            .unwrap();

        assert_eq!(identified.len(), 1);
        assert_eq!(identified[0].name, "A");
        assert_eq!(vision.count("search_faces"), 2);
    }

    #[test]
    fn test_malformed_external_id_is_skipped() {
        let vision = Arc::new(FakeVision::new());
        vision.push_search(SearchOutcome::Matches(vec![face_match("no_separator", 90.0, 90.0)]));
        vision.push_search(SearchOutcome::Matches(vec![face_match("A-B", 90.0, 90.0)]));

        let identified = identifier(&vision)
            .identify(&png_image(100, 50), &boxes(2), "showA")
            .unwrap();

        assert_eq!(identified.len(), 1);
        assert_eq!(identified[0].name, "A");
    }

    #[test]
    fn test_no_faces_skips_decoding() {
        let vision = Arc::new(FakeVision::new());
        let identified = identifier(&vision)
            .identify(b"not an image", &[], "showA")
            .unwrap();
        assert!(identified.is_empty());
    }

    #[test]
    fn test_undecodable_frame_is_image_error() {
        let vision = Arc::new(FakeVision::new());
        let err = identifier(&vision)
            .identify(b"not an image", &boxes(1), "showA")
            .unwrap_err();
        assert!(matches!(err, IndexError::Image(_)));
    }
}
