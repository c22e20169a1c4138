//! Fingerprint type and the hashing seam.

use super::decode;
use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A 64-bit perceptual fingerprint.
///
/// Bits are laid out row-major over the 8x8 hash grid, most significant bit
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const BITS: u32 = 64;

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: number of differing bits
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Trait for fingerprint algorithms
pub trait HashAlgorithm: Send + Sync {
    /// Compute a fingerprint from an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Decode the JPEG behind an open handle and fingerprint it.
    ///
    /// The handle is read from the start and left open.
    fn hash_handle(&self, path: &Path, file: &File) -> Result<Fingerprint, HashError> {
        let bytes = decode::read_handle(path, file)?;
        let image = decode::decode_jpeg(path, &bytes)?;
        self.hash_image(&image).map_err(|e| e.at(path))
    }

    /// Short algorithm name for reports
    fn name(&self) -> &'static str;
}

impl HashError {
    /// Attach `path` to errors raised before the path was known.
    pub(crate) fn at(self, path: &Path) -> Self {
        match self {
            HashError::EmptyImage { .. } => HashError::EmptyImage {
                path: path.to_path_buf(),
            },
            HashError::ResizeFailed { reason, .. } => HashError::ResizeFailed {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        }
    }
}
