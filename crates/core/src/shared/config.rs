use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_FACE_MIN_CONFIDENCE, DEFAULT_FRAME_WORKERS, DEFAULT_LABEL_MIN_CONFIDENCE,
    DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SEGMENT_MIN_CONFIDENCE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} must be between 0 and 100, got {value}")]
    ConfidenceOutOfRange { name: &'static str, value: f64 },
    #[error("frame_workers must be at least 1")]
    NoWorkers,
}

/// Runtime settings shared by every stage of the indexer.
///
/// Confidence values use the vision service's 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub label_min_confidence: f64,
    pub face_min_confidence: f64,
    pub segment_min_confidence: f64,
    pub frame_workers: usize,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub request_timeout_secs: u64,
    pub storage_root: PathBuf,
    pub data_dir: PathBuf,
    pub vision_endpoint: Option<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        let base = base_dir();
        Self {
            label_min_confidence: DEFAULT_LABEL_MIN_CONFIDENCE,
            face_min_confidence: DEFAULT_FACE_MIN_CONFIDENCE,
            segment_min_confidence: DEFAULT_SEGMENT_MIN_CONFIDENCE,
            frame_workers: DEFAULT_FRAME_WORKERS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_polls: DEFAULT_MAX_POLLS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_root: base.join("objects"),
            data_dir: base.join("tables"),
            vision_endpoint: None,
        }
    }
}

impl IndexerConfig {
    /// Loads a JSON config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("label_min_confidence", self.label_min_confidence),
            ("face_min_confidence", self.face_min_confidence),
            ("segment_min_confidence", self.segment_min_confidence),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ConfidenceOutOfRange { name, value });
            }
        }
        if self.frame_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

/// Platform data directory for local objects and tables.
///
/// - Linux: `$XDG_DATA_HOME/cast-index` or `~/.local/share/cast-index`
/// - macOS: `~/Library/Application Support/cast-index`
/// - Windows: `%APPDATA%/cast-index`
fn base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cast-index")
}
