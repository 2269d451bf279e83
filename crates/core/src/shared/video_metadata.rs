use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    /// Container duration, when the demuxer reports one.
    pub duration_ms: Option<i64>,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}
