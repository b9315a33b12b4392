use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Rejected filter preconditions.
///
/// Every rejection happens before the block loop runs, so a returned error
/// guarantees the buffer was left completely unmodified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelateError {
    #[error("block size must be at least 1")]
    InvalidBlockSize,
    #[error("region bounds are inverted: [{left},{right}) x [{top},{bottom})")]
    InvalidRegion {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
    #[error("region [{left},{right}) x [{top},{bottom}) exceeds {width}x{height} buffer")]
    RegionOutOfBounds {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        width: u32,
        height: u32,
    },
}

/// Domain interface for applying block pixelation to regions of a frame.
///
/// Implementations modify the frame in place (`&mut Frame`) to avoid
/// allocation, and must leave it untouched when any region is rejected.
pub trait FramePixelater: Send {
    fn pixelate(&self, frame: &mut Frame, regions: &[Region]) -> Result<(), PixelateError>;
}
