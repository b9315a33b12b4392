use std::path::Path;

use crate::io::domain::image_reader::ImageReader;
use crate::io::domain::image_writer::ImageWriter;
use crate::pixelate::domain::frame_pixelater::FramePixelater;
use crate::shared::region::Region;

/// Single-image pixelation pipeline: read -> pixelate -> write.
pub struct PixelateImageUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    pixelater: Box<dyn FramePixelater>,
}

impl PixelateImageUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        pixelater: Box<dyn FramePixelater>,
    ) -> Self {
        Self {
            reader,
            writer,
            pixelater,
        }
    }

    /// Reads a single image, pixelates the requested regions (the whole
    /// image when `regions` is empty), and writes the result.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut frame = self.reader.read(input_path)?;

        let regions = if regions.is_empty() {
            vec![Region::full(frame.width(), frame.height())]
        } else {
            regions.to_vec()
        };

        self.pixelater.pixelate(&mut frame, &regions)?;
        self.writer.write(output_path, &frame)?;

        Ok(())
    }
}
