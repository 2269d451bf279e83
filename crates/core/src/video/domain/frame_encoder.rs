use crate::shared::error::BoxError;
use crate::shared::frame::Frame;

/// Encodes a decoded frame as a still image file body.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, BoxError>;

    /// File extension of the encoded images, without the dot.
    fn extension(&self) -> &'static str;
}
