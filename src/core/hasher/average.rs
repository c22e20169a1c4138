//! Average Hash (aHash) over an 8x8 grid.
//!
//! 1. Convert to grayscale and downscale to 8x8
//! 2. Compute the mean brightness of the 64 cells
//! 3. Set a bit for every cell brighter than the mean

use super::fast_resize::FastResizer;
use super::traits::{Fingerprint, HashAlgorithm};
use crate::error::HashError;
use image::DynamicImage;

/// Width and height of the hash grid
const GRID: u32 = 8;

/// Average Hash (aHash) implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct AverageHasher;

impl AverageHasher {
    pub fn new() -> Self {
        Self
    }
}

impl HashAlgorithm for AverageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        // Resizer buffers are per call; the hasher is shared across workers
        let gray = FastResizer::new().resize_to_grayscale(image, GRID, GRID)?;

        let cells = (GRID * GRID) as u64;
        let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();

        // cell > total / cells, compared without rounding
        let mut bits = 0u64;
        for (index, pixel) in gray.pixels().enumerate() {
            if pixel[0] as u64 * cells > total {
                bits |= 1 << (63 - index);
            }
        }

        Ok(Fingerprint::from_bits(bits))
    }

    fn name(&self) -> &'static str {
        "aHash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn solid(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |_, _| Rgb([value, value, value])))
    }

    fn left_half_white() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = AverageHasher::new();
        let image = left_half_white();

        let first = hasher.hash_image(&image).unwrap();
        let second = hasher.hash_image(&image).unwrap();

        assert_eq!(first.distance(&second), 0);
    }

    #[test]
    fn solid_image_has_no_bits_set() {
        // No cell is strictly brighter than the mean
        let hash = AverageHasher::new().hash_image(&solid(128)).unwrap();
        assert_eq!(hash.bits(), 0);
    }

    #[test]
    fn bright_left_half_sets_left_columns() {
        let hash = AverageHasher::new().hash_image(&left_half_white()).unwrap();

        // Each row reads 1111_0000 with the bright half on the left
        assert_eq!(hash.bits(), 0xF0F0_F0F0_F0F0_F0F0);
    }

    #[test]
    fn scaled_copy_matches_original() {
        let hasher = AverageHasher::new();
        let large = left_half_white();
        let small = large.resize_exact(32, 32, image::imageops::FilterType::Nearest);

        let a = hasher.hash_image(&large).unwrap();
        let b = hasher.hash_image(&small).unwrap();

        assert_eq!(a, b);
    }
}
