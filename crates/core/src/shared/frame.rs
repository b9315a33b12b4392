use ndarray::{ArrayView2, ArrayViewMut2};

/// A single bitmap frame: packed 32-bit pixels in row-major order.
///
/// Channel packing is fixed ([`PixelFormat::BGRA8888`]); conversion to and
/// from byte-plane formats happens at I/O boundaries only, so everything
/// past that boundary treats pixels as opaque `u32`s.
///
/// [`PixelFormat::BGRA8888`]: crate::shared::pixel_format::PixelFormat::BGRA8888
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u32>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u32>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_ndarray(&self) -> ArrayView2<'_, u32> {
        ArrayView2::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut2<'_, u32> {
        ArrayViewMut2::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }
}
