use std::path::Path;

use crate::shared::frame::Frame;

/// Domain interface for decoding a bitmap file into a packed-pixel frame.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
