use std::path::Path;

use crate::io::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;
use crate::shared::pixel_format::PixelFormat;

/// Writes a packed-BGRA frame to an image file using the `image` crate.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let format = PixelFormat::BGRA8888;
        let mut bytes = Vec::with_capacity(frame.data().len() * 4);
        for &pixel in frame.data() {
            let [b, g, r, a] = format.unpack(pixel);
            bytes.extend_from_slice(&[r, g, b, a]);
        }

        let img = image::RgbaImage::from_raw(frame.width(), frame.height(), bytes)
            .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }
}
