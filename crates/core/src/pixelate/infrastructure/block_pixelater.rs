use crate::pixelate::domain::frame_pixelater::{FramePixelater, PixelateError};
use crate::shared::frame::Frame;
use crate::shared::pixel_format::{PixelFormat, CHANNEL_COUNT};
use crate::shared::region::Region;

/// Replaces every pixel of `region` with its enclosing block's per-channel
/// average, in place.
///
/// The region is tiled into `block_size` x `block_size` squares anchored at
/// its top-left corner; tiles in the last row/column may be clipped by the
/// region edge and are averaged over only the pixels they actually cover.
/// Channel means are integer division, truncating toward zero. Pixels
/// outside the region are never read or written.
///
/// `pixels` is row-major with `width` as the row stride. It must hold at
/// least `width * height` elements; that is the caller's obligation and is
/// not checked here. The region and block size are checked, and any
/// rejection leaves the buffer unmodified.
pub fn pixelate_region(
    pixels: &mut [u32],
    width: u32,
    height: u32,
    region: Region,
    block_size: u32,
) -> Result<(), PixelateError> {
    validate(width, height, region, block_size)?;
    if region.is_empty() {
        return Ok(());
    }

    let format = PixelFormat::BGRA8888;
    let stride = width as usize;
    let (left, right) = (region.left as usize, region.right as usize);
    let (top, bottom) = (region.top as usize, region.bottom as usize);
    let step = block_size as usize;

    let mut block_y = top;
    while block_y < bottom {
        let y_end = (block_y + step).min(bottom);
        let mut block_x = left;
        while block_x < right {
            let x_end = (block_x + step).min(right);

            // First pass: per-channel sums over the (possibly clipped) block.
            let mut sums = [0u64; CHANNEL_COUNT];
            let mut count = 0u64;
            for y in block_y..y_end {
                let row = y * stride;
                for x in block_x..x_end {
                    let channels = format.unpack(pixels[row + x]);
                    for (sum, value) in sums.iter_mut().zip(channels) {
                        *sum += u64::from(value);
                    }
                    count += 1;
                }
            }

            // count >= 1: the loop only reaches non-empty blocks.
            let mut means = [0u8; CHANNEL_COUNT];
            for (mean, sum) in means.iter_mut().zip(sums) {
                *mean = (sum / count) as u8;
            }
            let averaged = format.pack(means);

            // Second pass: write the block mean over the same bounds.
            for y in block_y..y_end {
                let row = y * stride;
                for x in block_x..x_end {
                    pixels[row + x] = averaged;
                }
            }

            block_x += step;
        }
        block_y += step;
    }

    Ok(())
}

fn validate(
    width: u32,
    height: u32,
    region: Region,
    block_size: u32,
) -> Result<(), PixelateError> {
    if block_size == 0 {
        return Err(PixelateError::InvalidBlockSize);
    }
    if region.left > region.right || region.top > region.bottom {
        return Err(PixelateError::InvalidRegion {
            left: region.left,
            top: region.top,
            right: region.right,
            bottom: region.bottom,
        });
    }
    if region.right > width || region.bottom > height {
        return Err(PixelateError::RegionOutOfBounds {
            left: region.left,
            top: region.top,
            right: region.right,
            bottom: region.bottom,
            width,
            height,
        });
    }
    Ok(())
}

/// Block-average pixelater over packed-BGRA frames.
///
/// Holds the tile edge length; each call tiles the requested regions and
/// delegates to [`pixelate_region`].
#[derive(Debug)]
pub struct BlockPixelater {
    block_size: u32,
}

impl BlockPixelater {
    /// Fails with [`PixelateError::InvalidBlockSize`] when `block_size` is 0.
    pub fn new(block_size: u32) -> Result<Self, PixelateError> {
        if block_size == 0 {
            return Err(PixelateError::InvalidBlockSize);
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

impl FramePixelater for BlockPixelater {
    fn pixelate(&self, frame: &mut Frame, regions: &[Region]) -> Result<(), PixelateError> {
        let width = frame.width();
        let height = frame.height();

        // Validate every region up front so a rejection midway through the
        // list cannot leave earlier regions already pixelated.
        for region in regions {
            validate(width, height, *region, self.block_size)?;
        }
        for region in regions {
            pixelate_region(frame.data_mut(), width, height, *region, self.block_size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bgra(b: u8, g: u8, r: u8, a: u8) -> u32 {
        PixelFormat::BGRA8888.pack([b, g, r, a])
    }

    fn blue(pixel: u32) -> u8 {
        PixelFormat::BGRA8888.unpack(pixel)[0]
    }

    /// Frame whose blue channel takes the given values, other channels zero.
    fn blue_frame(values: &[u8], width: u32, height: u32) -> Frame {
        let data = values.iter().map(|&b| bgra(b, 0, 0, 0)).collect();
        Frame::new(data, width, height)
    }

    #[test]
    fn test_four_by_two_full_region_block_two() {
        // Blue channel [10,20,30,40],[50,60,70,80]: left 2x2 block averages
        // to 35, right 2x2 block to 55.
        let mut pixels: Vec<u32> = [10u8, 20, 30, 40, 50, 60, 70, 80]
            .iter()
            .map(|&b| bgra(b, 0, 0, 0))
            .collect();

        pixelate_region(&mut pixels, 4, 2, Region::full(4, 2), 2).unwrap();

        let blues: Vec<u8> = pixels.iter().map(|&p| blue(p)).collect();
        assert_eq!(blues, vec![35, 35, 55, 55, 35, 35, 55, 55]);
        // Untouched channels stay zero.
        for &p in &pixels {
            let [_, g, r, a] = PixelFormat::BGRA8888.unpack(p);
            assert_eq!((g, r, a), (0, 0, 0));
        }
    }

    #[test]
    fn test_block_size_one_is_identity() {
        let mut pixels: Vec<u32> = (0..24).map(|i| bgra(i, i * 2, 255 - i, 100 + i)).collect();
        let original = pixels.clone();
        pixelate_region(&mut pixels, 6, 4, Region::full(6, 4), 1).unwrap();
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_reapplication_is_idempotent() {
        let mut pixels: Vec<u32> = (0..64u32)
            .map(|i| bgra((i * 37 % 256) as u8, (i * 11 % 256) as u8, (i * 3) as u8, 255))
            .collect();
        let region = Region::new(1, 1, 7, 6);

        pixelate_region(&mut pixels, 8, 8, region, 3).unwrap();
        let once = pixels.clone();
        pixelate_region(&mut pixels, 8, 8, region, 3).unwrap();
        assert_eq!(pixels, once);
    }

    #[test]
    fn test_pixels_outside_region_unchanged() {
        let mut pixels: Vec<u32> = (0..100u32).map(|i| bgra(i as u8, 7, 9, 255)).collect();
        let original = pixels.clone();
        let region = Region::new(2, 3, 7, 8);

        pixelate_region(&mut pixels, 10, 10, region, 4).unwrap();

        for y in 0..10u32 {
            for x in 0..10u32 {
                let inside =
                    x >= region.left && x < region.right && y >= region.top && y < region.bottom;
                let idx = (y * 10 + x) as usize;
                if !inside {
                    assert_eq!(pixels[idx], original[idx], "pixel ({x},{y}) changed");
                }
            }
        }
    }

    #[test]
    fn test_partial_edge_block_averages_only_region_pixels() {
        // Region 5 wide with block size 3: the second column of blocks is
        // clipped to 2 pixels. Row of blue values 0,0,0,10,20 -> the clipped
        // block averages 10 and 20, not a phantom third pixel.
        let mut pixels: Vec<u32> = [0u8, 0, 0, 10, 20].iter().map(|&b| bgra(b, 0, 0, 0)).collect();

        pixelate_region(&mut pixels, 5, 1, Region::full(5, 1), 3).unwrap();

        let blues: Vec<u8> = pixels.iter().map(|&p| blue(p)).collect();
        assert_eq!(blues, vec![0, 0, 0, 15, 15]);
    }

    #[test]
    fn test_channel_independence() {
        let base: Vec<u32> = (0..16u32).map(|i| bgra(i as u8 * 10, 50, 80, 200)).collect();
        let mut with_red: Vec<u32> = base
            .iter()
            .map(|&p| {
                let [b, g, _, a] = PixelFormat::BGRA8888.unpack(p);
                bgra(b, g, 130, a)
            })
            .collect();
        let mut without = base.clone();

        pixelate_region(&mut without, 4, 4, Region::full(4, 4), 2).unwrap();
        pixelate_region(&mut with_red, 4, 4, Region::full(4, 4), 2).unwrap();

        for (&p1, &p2) in without.iter().zip(&with_red) {
            let [b1, g1, r1, a1] = PixelFormat::BGRA8888.unpack(p1);
            let [b2, g2, r2, a2] = PixelFormat::BGRA8888.unpack(p2);
            assert_eq!((b1, g1, a1), (b2, g2, a2));
            assert_eq!(r1, 80);
            assert_eq!(r2, 130);
        }
    }

    #[test]
    fn test_every_pixel_gets_its_block_mean() {
        let width = 7u32;
        let height = 5u32;
        let block_size = 3u32;
        let region = Region::new(1, 0, 6, 5);
        let mut pixels: Vec<u32> = (0..35u32)
            .map(|i| bgra((i * 13 % 251) as u8, (i * 7 % 251) as u8, i as u8, 255))
            .collect();
        let original = pixels.clone();

        pixelate_region(&mut pixels, width, height, region, block_size).unwrap();

        // Recompute each pixel's block mean from the original and compare.
        for y in region.top..region.bottom {
            for x in region.left..region.right {
                let bx = region.left + (x - region.left) / block_size * block_size;
                let by = region.top + (y - region.top) / block_size * block_size;
                let x_end = (bx + block_size).min(region.right);
                let y_end = (by + block_size).min(region.bottom);

                let mut sums = [0u64; CHANNEL_COUNT];
                let mut count = 0u64;
                for py in by..y_end {
                    for px in bx..x_end {
                        let ch = PixelFormat::BGRA8888.unpack(original[(py * width + px) as usize]);
                        for (s, v) in sums.iter_mut().zip(ch) {
                            *s += u64::from(v);
                        }
                        count += 1;
                    }
                }
                let mut means = [0u8; CHANNEL_COUNT];
                for (m, s) in means.iter_mut().zip(sums) {
                    *m = (s / count) as u8;
                }
                assert_eq!(
                    pixels[(y * width + x) as usize],
                    PixelFormat::BGRA8888.pack(means),
                    "pixel ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn test_mean_truncates_toward_zero() {
        // 10 and 15 average to 12.5; integer division gives 12.
        let mut pixels = vec![bgra(10, 0, 0, 0), bgra(15, 0, 0, 0)];
        pixelate_region(&mut pixels, 2, 1, Region::full(2, 1), 2).unwrap();
        assert_eq!(blue(pixels[0]), 12);
        assert_eq!(blue(pixels[1]), 12);
    }

    #[test]
    fn test_alpha_participates_in_averaging() {
        let mut pixels = vec![bgra(0, 0, 0, 100), bgra(0, 0, 0, 201)];
        pixelate_region(&mut pixels, 2, 1, Region::full(2, 1), 2).unwrap();
        assert_eq!(PixelFormat::BGRA8888.unpack(pixels[0])[3], 150);
    }

    #[test]
    fn test_empty_region_is_noop() {
        let mut pixels: Vec<u32> = (0..9u32).map(|i| bgra(i as u8, 0, 0, 0)).collect();
        let original = pixels.clone();
        pixelate_region(&mut pixels, 3, 3, Region::new(1, 1, 1, 3), 2).unwrap();
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_block_larger_than_region_averages_whole_region() {
        let mut pixels: Vec<u32> = [1u8, 2, 3, 4].iter().map(|&b| bgra(b, 0, 0, 0)).collect();
        pixelate_region(&mut pixels, 2, 2, Region::full(2, 2), 100).unwrap();
        let blues: Vec<u8> = pixels.iter().map(|&p| blue(p)).collect();
        assert_eq!(blues, vec![2, 2, 2, 2]); // (1+2+3+4)/4 = 2
    }

    #[rstest]
    #[case::zero_block_size(Region::new(0, 0, 4, 4), 0, PixelateError::InvalidBlockSize)]
    #[case::inverted_horizontal(
        Region::new(10, 0, 5, 4),
        2,
        PixelateError::InvalidRegion { left: 10, top: 0, right: 5, bottom: 4 }
    )]
    #[case::inverted_vertical(
        Region::new(0, 3, 4, 1),
        2,
        PixelateError::InvalidRegion { left: 0, top: 3, right: 4, bottom: 1 }
    )]
    #[case::past_right_edge(
        Region::new(0, 0, 20, 4),
        2,
        PixelateError::RegionOutOfBounds { left: 0, top: 0, right: 20, bottom: 4, width: 16, height: 16 }
    )]
    #[case::past_bottom_edge(
        Region::new(0, 0, 4, 20),
        2,
        PixelateError::RegionOutOfBounds { left: 0, top: 0, right: 4, bottom: 20, width: 16, height: 16 }
    )]
    fn test_rejection_leaves_buffer_unchanged(
        #[case] region: Region,
        #[case] block_size: u32,
        #[case] expected: PixelateError,
    ) {
        let mut pixels: Vec<u32> = (0..256u32).map(|i| bgra(i as u8, 1, 2, 3)).collect();
        let original = pixels.clone();

        let err = pixelate_region(&mut pixels, 16, 16, region, block_size).unwrap_err();
        assert_eq!(err, expected);
        assert_eq!(pixels, original);
    }

    // -- BlockPixelater (trait surface) --

    #[test]
    fn test_new_rejects_zero_block_size() {
        assert_eq!(
            BlockPixelater::new(0).unwrap_err(),
            PixelateError::InvalidBlockSize
        );
        assert_eq!(BlockPixelater::new(8).unwrap().block_size(), 8);
    }

    #[test]
    fn test_pixelater_applies_all_regions() {
        let mut frame = blue_frame(&[10, 20, 30, 40, 50, 60, 70, 80], 4, 2);
        let pixelater = BlockPixelater::new(2).unwrap();

        pixelater
            .pixelate(
                &mut frame,
                &[Region::new(0, 0, 2, 2), Region::new(2, 0, 4, 2)],
            )
            .unwrap();

        let blues: Vec<u8> = frame.data().iter().map(|&p| blue(p)).collect();
        assert_eq!(blues, vec![35, 35, 55, 55, 35, 35, 55, 55]);
    }

    #[test]
    fn test_no_regions_frame_unchanged() {
        let mut frame = blue_frame(&[1, 2, 3, 4], 2, 2);
        let original = frame.data().to_vec();
        let pixelater = BlockPixelater::new(2).unwrap();
        pixelater.pixelate(&mut frame, &[]).unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_invalid_later_region_leaves_frame_unchanged() {
        // The second region is out of bounds; the first must not have been
        // applied when the call fails.
        let mut frame = blue_frame(&[10, 20, 30, 40, 50, 60, 70, 80], 4, 2);
        let original = frame.data().to_vec();
        let pixelater = BlockPixelater::new(2).unwrap();

        let result = pixelater.pixelate(
            &mut frame,
            &[Region::new(0, 0, 2, 2), Region::new(0, 0, 99, 99)],
        );

        assert!(matches!(
            result,
            Err(PixelateError::RegionOutOfBounds { .. })
        ));
        assert_eq!(frame.data(), &original[..]);
    }
}
