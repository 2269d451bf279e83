/// Label the vision service uses for people in a frame.
pub const PERSON_LABEL: &str = "Person";

/// Reference images are indexed with at most one face each.
pub const MAX_FACES_PER_REFERENCE_IMAGE: u32 = 1;

/// Extension of frames written by the shot-boundary selector.
pub const FRAME_EXTENSION: &str = "jpg";

/// Extensions stripped from frame keys when deriving the frame timestamp.
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg"];

pub const VIDEO_EXTENSION: &str = "mp4";
pub const EPISODES_FOLDER: &str = "episodes";
pub const FACES_FOLDER: &str = "faces";
pub const RESULTS_FOLDER: &str = "results";
pub const FRAMES_FOLDER: &str = "frames";

pub const DEFAULT_LABEL_MIN_CONFIDENCE: f64 = 80.0;
pub const DEFAULT_FACE_MIN_CONFIDENCE: f64 = 80.0;
pub const DEFAULT_SEGMENT_MIN_CONFIDENCE: f64 = 80.0;

pub const DEFAULT_FRAME_WORKERS: usize = 4;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_POLLS: u32 = 120;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;
