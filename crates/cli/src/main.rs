use std::path::PathBuf;
use std::process;

use clap::Parser;

use mosaic_core::io::domain::image_reader::ImageReader;
use mosaic_core::io::domain::image_writer::ImageWriter;
use mosaic_core::io::infrastructure::image_file_reader::ImageFileReader;
use mosaic_core::io::infrastructure::image_file_writer::ImageFileWriter;
use mosaic_core::pipeline::pixelate_image_use_case::PixelateImageUseCase;
use mosaic_core::pixelate::domain::frame_pixelater::FramePixelater;
use mosaic_core::pixelate::infrastructure::block_pixelater::BlockPixelater;
use mosaic_core::shared::constants::DEFAULT_BLOCK_SIZE;
use mosaic_core::shared::region::Region;

/// Block pixelation for images.
#[derive(Parser)]
#[command(name = "mosaic")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Output image file.
    output: PathBuf,

    /// Edge length of the averaging blocks, in pixels.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    /// Region to pixelate as left,top,right,bottom (repeatable; the whole
    /// image when omitted).
    #[arg(long, value_parser = parse_region)]
    region: Vec<Region>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let reader: Box<dyn ImageReader> = Box::new(ImageFileReader::new());
    let writer: Box<dyn ImageWriter> = Box::new(ImageFileWriter::new());
    let pixelater: Box<dyn FramePixelater> = Box::new(BlockPixelater::new(cli.block_size)?);

    let mut use_case = PixelateImageUseCase::new(reader, writer, pixelater);
    use_case.execute(&cli.input, &cli.output, &cli.region)?;
    log::info!("Output written to {}", cli.output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.block_size == 0 {
        return Err("Block size must be at least 1".into());
    }
    for r in &cli.region {
        if r.left > r.right || r.top > r.bottom {
            return Err(format!(
                "Region bounds are inverted: {},{},{},{}",
                r.left, r.top, r.right, r.bottom
            )
            .into());
        }
    }
    Ok(())
}

fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err(format!("expected left,top,right,bottom, got '{s}'"));
    }
    let mut bounds = [0u32; 4];
    for (bound, part) in bounds.iter_mut().zip(&parts) {
        *bound = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid bound '{part}' in '{s}'"))?;
    }
    Ok(Region::new(bounds[0], bounds[1], bounds[2], bounds[3]))
}
