use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping for one processed video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionJob {
    pub job_id: String,
    pub collection_id: String,
    pub filepath: String,
    pub video_duration_ms: i64,
    pub job_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_job_date_serializes_as_rfc3339() {
        let job = DetectionJob {
            job_id: "abc".into(),
            collection_id: "showA".into(),
            filepath: "showA/episodes/ep1.mp4".into(),
            video_duration_ms: 1_500,
            job_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["job_date"], "2024-05-01T12:00:00Z");
        assert_eq!(json["video_duration_ms"], 1_500);
    }
}
