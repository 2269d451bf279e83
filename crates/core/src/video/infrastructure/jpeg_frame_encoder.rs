use image::codecs::jpeg::JpegEncoder;

use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_encoder::FrameEncoder;

/// Encodes RGB frames as JPEG using the `image` crate.
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    pub fn new() -> Self {
        Self::with_quality(DEFAULT_JPEG_QUALITY)
    }

    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, BoxError> {
        if frame.channels() != 3 {
            return Err(format!("expected an RGB frame, got {} channels", frame.channels()).into());
        }
        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        let mut bytes = Vec::new();
        img.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, self.quality))?;
        Ok(bytes)
    }

    fn extension(&self) -> &'static str {
        "jpg"
    }
}
