use crate::shared::constants::{
    EPISODES_FOLDER, FACES_FOLDER, FRAMES_FOLDER, FRAME_EXTENSION, FRAME_EXTENSIONS,
    RESULTS_FOLDER, VIDEO_EXTENSION,
};
use crate::shared::error::IndexError;

const VIDEO_FORMAT: &str = "{series}/episodes/{filename}.mp4";
const FACE_FORMAT: &str = "{series}/faces/{artist_name}-{artist_role}/{filename}.{extension}";

/// An episode upload: `{series}/episodes/{episode}.mp4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoKey {
    pub series: String,
    pub episode: String,
    pub key: String,
}

/// A reference face image: `{series}/faces/{artist}-{role}/{filename}`.
///
/// `artist` and `role` are the raw path segments (underscores intact).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceKey {
    pub series: String,
    pub artist: String,
    pub role: String,
    pub filename: String,
    pub key: String,
}

/// A storage key recognized by one of the upload conventions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageKey {
    Video(VideoKey),
    ReferenceFace(FaceKey),
}

impl StorageKey {
    /// Classifies an object key, rejecting anything outside the two
    /// upload conventions.
    pub fn parse(key: &str) -> Result<Self, IndexError> {
        if let Some(video) = parse_video_key(key) {
            return Ok(StorageKey::Video(video));
        }
        if let Some(face) = parse_face_key(key) {
            return Ok(StorageKey::ReferenceFace(face));
        }
        Err(IndexError::Validation(format!(
            "{key} doesn't conform to {VIDEO_FORMAT} or {FACE_FORMAT}"
        )))
    }

    pub fn series(&self) -> &str {
        match self {
            StorageKey::Video(v) => &v.series,
            StorageKey::ReferenceFace(f) => &f.series,
        }
    }
}

impl FaceKey {
    /// Identifier attached to the enrolled face: `{artist}-{role}`.
    pub fn external_image_id(&self) -> String {
        format!("{}-{}", self.artist, self.role)
    }
}

fn parse_video_key(key: &str) -> Option<VideoKey> {
    let [series, folder, filename] = split_exact::<3>(key)?;
    if folder != EPISODES_FOLDER || !is_valid_segment(series) {
        return None;
    }
    let (episode, ext) = filename.rsplit_once('.')?;
    if ext != VIDEO_EXTENSION || !is_valid_segment(episode) {
        return None;
    }
    Some(VideoKey {
        series: series.to_string(),
        episode: episode.to_string(),
        key: key.to_string(),
    })
}

fn parse_face_key(key: &str) -> Option<FaceKey> {
    let [series, folder, artist_and_role, filename] = split_exact::<4>(key)?;
    if folder != FACES_FOLDER || !is_valid_segment(series) {
        return None;
    }

    let (artist, role) = artist_and_role.split_once('-')?;
    if !is_valid_name(artist) || !is_valid_name(role) {
        return None;
    }

    let (stem, ext) = filename.rsplit_once('.')?;
    if !is_valid_segment(stem) || !is_valid_extension(ext) {
        return None;
    }

    Some(FaceKey {
        series: series.to_string(),
        artist: artist.to_string(),
        role: role.to_string(),
        filename: filename.to_string(),
        key: key.to_string(),
    })
}

fn split_exact<const N: usize>(key: &str) -> Option<[&str; N]> {
    let parts: Vec<&str> = key.split('/').collect();
    parts.try_into().ok()
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':')
}

/// `.` and `..` are rejected so a key never climbs out of its series.
fn is_valid_segment(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_segment_char) && !s.chars().all(|c| c == '.')
}

/// Artist names and roles are joined by a single `-`, so neither may
/// contain one.
fn is_valid_name(s: &str) -> bool {
    is_valid_segment(s) && !s.contains('-')
}

fn is_valid_extension(ext: &str) -> bool {
    ext.len() >= 3
        && ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}

/// Human-readable form of a raw path segment: underscores become spaces.
pub fn display_name(raw: &str) -> String {
    raw.split('_').collect::<Vec<_>>().join(" ")
}

/// Short job identifier: everything after the last `:` of an
/// execution-style id, or the id itself.
pub fn job_suffix(job_id: &str) -> &str {
    job_id.rsplit(':').next().unwrap_or(job_id)
}

/// Episode name of a video key: the file name without `.mp4`.
pub fn episode_name(video_key: &str) -> String {
    let filename = video_key.rsplit('/').next().unwrap_or(video_key);
    filename
        .strip_suffix(&format!(".{VIDEO_EXTENSION}"))
        .unwrap_or(filename)
        .to_string()
}

/// Where an extracted frame is stored:
/// `{collection}/results/{episode}/{job_suffix}/frames/{timestamp_ms}.jpg`.
pub fn frame_key(collection: &str, episode: &str, job_id: &str, timestamp_ms: i64) -> String {
    format!(
        "{collection}/{RESULTS_FOLDER}/{episode}/{}/{FRAMES_FOLDER}/{timestamp_ms}.{FRAME_EXTENSION}",
        job_suffix(job_id)
    )
}

/// Frame timestamp label from a frame key: the file name with any frame
/// image extension removed.
pub fn frame_timestamp(frame_key: &str) -> String {
    let mut name = frame_key.rsplit('/').next().unwrap_or(frame_key).to_string();
    for ext in FRAME_EXTENSIONS {
        name = name.replace(&format!(".{ext}"), "");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_video_key_is_recognized() {
        let parsed = StorageKey::parse("showA/episodes/ep1.mp4").unwrap();
        assert_eq!(
            parsed,
            StorageKey::Video(VideoKey {
                series: "showA".into(),
                episode: "ep1".into(),
                key: "showA/episodes/ep1.mp4".into(),
            })
        );
        assert_eq!(parsed.series(), "showA");
    }

    #[test]
    fn test_face_key_is_recognized() {
        let parsed = StorageKey::parse("my_show/faces/Jane_Doe-Lead_Detective/ref1.jpg").unwrap();
        let StorageKey::ReferenceFace(face) = parsed else {
            panic!("expected a face key");
        };
        assert_eq!(face.series, "my_show");
        assert_eq!(face.artist, "Jane_Doe");
        assert_eq!(face.role, "Lead_Detective");
        assert_eq!(face.filename, "ref1.jpg");
        assert_eq!(face.external_image_id(), "Jane_Doe-Lead_Detective");
    }

    #[rstest]
    #[case::wrong_folder("showA/notfaces/x.jpg")]
    #[case::missing_role("showA/faces/JaneDoe/x.jpg")]
    #[case::extra_hyphen("showA/faces/Jane-Doe-Lead/x.jpg")]
    #[case::short_extension("showA/faces/Jane-Lead/x.jp")]
    #[case::no_extension("showA/faces/Jane-Lead/x")]
    #[case::not_mp4("showA/episodes/ep1.mov")]
    #[case::nested_episode("showA/episodes/season1/ep1.mp4")]
    #[case::space_in_series("show A/episodes/ep1.mp4")]
    #[case::empty_series("/episodes/ep1.mp4")]
    #[case::empty("")]
    #[case::parent_series_face("../faces/Jane_Doe-Lead/ref.jpg")]
    #[case::current_series_face("./faces/Jane_Doe-Lead/ref.jpg")]
    #[case::parent_series_video("../episodes/ep1.mp4")]
    #[case::dot_artist("showA/faces/..-Lead/ref.jpg")]
    fn test_nonconforming_keys_are_rejected(#[case] key: &str) {
        let err = StorageKey::parse(key).unwrap_err();
        assert!(matches!(err, IndexError::Validation(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_longer_extension_is_accepted() {
        assert!(StorageKey::parse("s/faces/a-b/photo.jpeg").is_ok());
    }

    #[test]
    fn test_display_name_replaces_underscores() {
        assert_eq!(display_name("Jane_Q_Doe"), "Jane Q Doe");
        assert_eq!(display_name("Plain"), "Plain");
    }

    #[rstest]
    #[case("arn:states:us-east-1:123:execution:sm:abc-123", "abc-123")]
    #[case("abc-123", "abc-123")]
    fn test_job_suffix(#[case] job_id: &str, #[case] expected: &str) {
        assert_eq!(job_suffix(job_id), expected);
    }

    #[test]
    fn test_frame_key_layout() {
        assert_eq!(
            frame_key("showA", "ep1", "exec:job-9", 1000),
            "showA/results/ep1/job-9/frames/1000.jpg"
        );
    }

    #[test]
    fn test_episode_name_strips_extension() {
        assert_eq!(episode_name("showA/episodes/ep1.mp4"), "ep1");
    }

    #[rstest]
    #[case("showA/results/ep1/j/frames/1000.jpg", "1000")]
    #[case("showA/results/ep1/j/frames/33.png", "33")]
    #[case("1000", "1000")]
    fn test_frame_timestamp(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(frame_timestamp(key), expected);
    }
}
