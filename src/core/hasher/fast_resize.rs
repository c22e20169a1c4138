//! SIMD-accelerated downscaling to the hash grid.
//!
//! Uses fast_image_resize, which picks AVX2/NEON when available.

use crate::error::HashError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::path::PathBuf;

/// Reusable grayscale resizer
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Convert to grayscale, then resize to `width` x `height` with a
    /// bilinear filter.
    pub fn resize_to_grayscale(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        // Grayscale first: one channel is cheaper to resize than three
        let gray = image.to_luma8();

        let (src_width, src_height) = gray.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(HashError::EmptyImage {
                path: PathBuf::new(),
            });
        }

        if width == 0 || height == 0 {
            return Err(resize_failed("destination grid has zero size"));
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| resize_failed(format!("invalid source buffer: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Bilinear,
        ));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| resize_failed(e.to_string()))?;

        let result: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, dst_image.into_vec())
                .ok_or_else(|| resize_failed("destination buffer has the wrong length"))?;

        Ok(result)
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

fn resize_failed(reason: impl Into<String>) -> HashError {
    HashError::ResizeFailed {
        path: PathBuf::new(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            Rgb([r, g, 128])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn resize_produces_hash_grid() {
        let resized = FastResizer::new()
            .resize_to_grayscale(&gradient(120, 80), 8, 8)
            .unwrap();
        assert_eq!(resized.dimensions(), (8, 8));
    }

    #[test]
    fn upscales_tiny_images() {
        let resized = FastResizer::new()
            .resize_to_grayscale(&gradient(3, 2), 8, 8)
            .unwrap();
        assert_eq!(resized.dimensions(), (8, 8));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let result = FastResizer::new().resize_to_grayscale(&gradient(16, 16), 0, 8);
        assert!(matches!(result, Err(HashError::ResizeFailed { .. })));
    }
}
