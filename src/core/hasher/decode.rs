//! JPEG decoding from already-open file handles.
//!
//! Small files are read into memory, large ones are memory-mapped. The
//! zune-jpeg decoder is tried first (1.5-2x faster than the image crate);
//! the image crate's JPEG decoder is the fallback for files zune rejects.

use crate::error::HashError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File bytes that may be either owned or memory-mapped.
pub enum HandleBytes {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl std::ops::Deref for HandleBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            HandleBytes::Vec(v) => v,
            HandleBytes::Mmap(m) => m,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> HashError {
    HashError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

/// Read the full contents behind `file`, starting from offset 0.
pub fn read_handle(path: &Path, file: &File) -> Result<HandleBytes, HashError> {
    let len = file.metadata().map_err(|e| io_error(path, e))?.len();
    if len == 0 {
        return Err(HashError::EmptyImage {
            path: path.to_path_buf(),
        });
    }

    if len >= MMAP_THRESHOLD {
        // SAFETY: the mapping is read-only and dropped before the caller
        // releases the handle.
        let mmap = unsafe { Mmap::map(file) }.map_err(|e| io_error(path, e))?;
        return Ok(HandleBytes::Mmap(mmap));
    }

    let mut reader = file;
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| io_error(path, e))?;
    let mut bytes = Vec::with_capacity(len as usize);
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error(path, e))?;

    Ok(HandleBytes::Vec(bytes))
}

/// Decode JPEG bytes into an image.
pub fn decode_jpeg(path: &Path, bytes: &[u8]) -> Result<DynamicImage, HashError> {
    match decode_zune(path, bytes) {
        Ok(image) => Ok(image),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "zune-jpeg failed, retrying with image crate");
            decode_fallback(path, bytes)
        }
    }
}

fn decode_zune(path: &Path, bytes: &[u8]) -> Result<DynamicImage, HashError> {
    let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);

    let pixels = decoder.decode().map_err(|e| HashError::DecodeError {
        path: path.to_path_buf(),
        reason: format!("zune-jpeg decode failed: {:?}", e),
    })?;

    let info = decoder.info().ok_or_else(|| HashError::DecodeError {
        path: path.to_path_buf(),
        reason: "missing image info".to_string(),
    })?;
    let width = info.width as u32;
    let height = info.height as u32;

    let buffer_error = |kind: &str| HashError::DecodeError {
        path: path.to_path_buf(),
        reason: format!("decoded {} buffer has the wrong size", kind),
    };

    let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
        ColorSpace::RGB => {
            let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
            DynamicImage::ImageRgb8(buffer)
        }
        ColorSpace::RGBA => {
            let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGBA"))?;
            DynamicImage::ImageRgba8(buffer)
        }
        ColorSpace::Luma => {
            let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("Luma"))?;
            DynamicImage::ImageLuma8(buffer)
        }
        other => {
            return Err(HashError::DecodeError {
                path: path.to_path_buf(),
                reason: format!("unsupported colorspace {:?}", other),
            })
        }
    };

    Ok(image)
}

fn decode_fallback(path: &Path, bytes: &[u8]) -> Result<DynamicImage, HashError> {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg).map_err(|e| {
        HashError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })
}
