use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::shared::error::IndexError;
use crate::video::domain::frame_encoder::FrameEncoder;
use crate::video::domain::video_reader::VideoReader;

/// A still image extracted at a shot boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFrame {
    pub timestamp_ms: i64,
    pub image: Vec<u8>,
}

/// Pulls the frames whose presentation timestamp is exactly one of the
/// requested shot-boundary timestamps.
///
/// Matching is exact, not nearest: targets must come from the same timing
/// source the decoder uses, otherwise nothing matches. The whole stream is
/// decoded once per call, in presentation order.
pub struct ShotFrameSelector {
    reader: Box<dyn VideoReader>,
    encoder: Arc<dyn FrameEncoder>,
}

impl ShotFrameSelector {
    pub fn new(reader: Box<dyn VideoReader>, encoder: Arc<dyn FrameEncoder>) -> Self {
        Self { reader, encoder }
    }

    /// Extracts one image per matched timestamp.
    ///
    /// Fails with [`IndexError::ResourceUnavailable`] if the video cannot be
    /// opened. A decode or encode failure mid-stream fails the whole call;
    /// frames selected before it are discarded.
    pub fn select(
        &mut self,
        targets: &BTreeSet<i64>,
        video: &Path,
    ) -> Result<Vec<SelectedFrame>, IndexError> {
        let metadata = self
            .reader
            .open(video)
            .map_err(|source| IndexError::ResourceUnavailable {
                path: video.to_path_buf(),
                source,
            })?;
        log::debug!(
            "Selecting {} frames from {} ({}x{} @ {:.2} fps)",
            targets.len(),
            video.display(),
            metadata.width,
            metadata.height,
            metadata.fps
        );

        let result = self.scan(targets);
        self.reader.close();

        let selected = result?;
        if selected.len() < targets.len() {
            log::warn!(
                "Matched {} of {} shot timestamps in {}",
                selected.len(),
                targets.len(),
                video.display()
            );
        }
        Ok(selected)
    }

    fn scan(&mut self, targets: &BTreeSet<i64>) -> Result<Vec<SelectedFrame>, IndexError> {
        let mut selected = Vec::new();
        if targets.is_empty() {
            return Ok(selected);
        }

        for frame in self.reader.frames() {
            let frame = frame.map_err(IndexError::Decode)?;
            if !targets.contains(&frame.timestamp_ms()) {
                continue;
            }
            let image = self.encoder.encode(&frame).map_err(IndexError::Decode)?;
            log::debug!("Selected frame at {} ms", frame.timestamp_ms());
            selected.push(SelectedFrame {
                timestamp_ms: frame.timestamp_ms(),
                image,
            });
        }
        Ok(selected)
    }
}
