use std::path::Path;

use crate::io::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;
use crate::shared::pixel_format::PixelFormat;

/// Decodes an image file into a packed-BGRA frame using the `image` crate.
///
/// The byte-plane to packed-pixel conversion happens here and nowhere else;
/// past this boundary the frame is opaque `u32`s.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let rgba = image::open(path)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let format = PixelFormat::BGRA8888;
        let data = rgba
            .pixels()
            .map(|pixel| {
                let [r, g, b, a] = pixel.0;
                format.pack([b, g, r, a])
            })
            .collect();

        Ok(Frame::new(data, width, height))
    }
}
