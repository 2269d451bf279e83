use crate::appearance::domain::appearance_record::AppearanceRecord;
use crate::appearance::domain::detection::{FrameDetections, IdentifiedFace, PersonDetection};

/// Reconciles person detections and identified faces into one roster per
/// frame.
///
/// Rules, in order:
/// 1. Each person (input order) takes the first identified face (input
///    order) whose top-left corner is on or after the person's top-left
///    corner and whose name is not yet on the roster. The merged record
///    carries the face's identity, confidence and box.
/// 2. A person without such a face is recorded with its own confidence and
///    box and no identity.
/// 3. Identified faces whose name is still not on the roster are appended.
/// 4. An empty roster becomes a single placeholder record.
///
/// Names are the only dedup key: two faces of the same name in one frame
/// yield one record. The containment test is the top-left heuristic, not
/// full geometric containment. Both are relied upon by stored results.
pub fn resolve_appearances(
    persons: &[PersonDetection],
    faces: &[IdentifiedFace],
    timestamp: &str,
    job_id: &str,
) -> Vec<AppearanceRecord> {
    let mut roster = FrameRoster::new(timestamp, job_id);

    for person in persons {
        let person_box = person.bounding_box.corners();

        let face = faces.iter().find(|face| {
            face.bounding_box.corners().top_left_within(&person_box)
                && !roster.contains_name(&face.name)
        });

        match face {
            Some(face) => roster.push_identified(face),
            None => roster.push_unidentified(person),
        }
    }

    for face in faces {
        if !roster.contains_name(&face.name) {
            roster.push_identified(face);
        }
    }

    roster.finish()
}

/// Convenience wrapper over [`resolve_appearances`] for a bundled frame.
pub fn resolve_frame(detections: &FrameDetections) -> Vec<AppearanceRecord> {
    resolve_appearances(
        &detections.persons,
        &detections.faces,
        &detections.timestamp,
        &detections.job_id,
    )
}

/// Records emitted so far for one frame, with the running suffix index.
struct FrameRoster<'a> {
    timestamp: &'a str,
    job_id: &'a str,
    records: Vec<AppearanceRecord>,
}

impl<'a> FrameRoster<'a> {
    fn new(timestamp: &'a str, job_id: &'a str) -> Self {
        Self {
            timestamp,
            job_id,
            records: Vec::new(),
        }
    }

    fn contains_name(&self, name: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.name.as_deref() == Some(name))
    }

    fn next_timestamp(&self) -> String {
        format!("{}_{}", self.timestamp, self.records.len())
    }

    fn push_identified(&mut self, face: &IdentifiedFace) {
        let video_timestamp = self.next_timestamp();
        self.records
            .push(AppearanceRecord::identified(self.job_id, video_timestamp, face));
    }

    fn push_unidentified(&mut self, person: &PersonDetection) {
        let video_timestamp = self.next_timestamp();
        self.records.push(AppearanceRecord::unidentified(
            self.job_id,
            video_timestamp,
            person,
        ));
    }

    fn finish(self) -> Vec<AppearanceRecord> {
        if self.records.is_empty() {
            return vec![AppearanceRecord::placeholder(
                self.job_id,
                format!("{}_0", self.timestamp),
            )];
        }
        self.records
    }
}
