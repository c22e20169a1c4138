//! # Hasher Module
//!
//! Computes 64-bit average-hash fingerprints for JPEG images.
//!
//! ## How It Works
//! 1. Read the image through the caller's open handle (mmap for large files)
//! 2. Decode with zune-jpeg, falling back to the image crate
//! 3. Grayscale and downscale to 8x8 with a SIMD bilinear filter
//! 4. Threshold each cell against the mean brightness
//!
//! Work is split into chunks (200 paths by default) and handed to a fixed
//! pool of worker threads. A file that cannot be decoded gets no
//! fingerprint; the rest of the batch carries on.
//!
//! ## Example
//! ```rust,ignore
//! use media_tidy::core::hasher::HasherConfig;
//!
//! let computer = HasherConfig::new().chunk_size(100).workers(4).build();
//! let results = computer.compute(&paths, &handles);
//! ```

mod average;
mod decode;
mod fast_resize;
mod pool;
mod traits;

pub use average::AverageHasher;
pub use fast_resize::FastResizer;
pub use pool::{HashComputer, HashResults};
pub use traits::{Fingerprint, HashAlgorithm};

/// Default number of paths handed to a worker at once
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Configuration builder for the hash computer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasherConfig {
    chunk_size: usize,
    workers: usize,
}

impl HasherConfig {
    /// Defaults: chunks of 200, one worker per available core
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }

    /// Paths per chunk; 0 restores the default
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = if size == 0 { DEFAULT_CHUNK_SIZE } else { size };
        self
    }

    /// Upper bound on concurrent worker threads; at least 1
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Build a computer using the average hash
    pub fn build(self) -> HashComputer {
        HashComputer::new(self, Box::new(AverageHasher::new()))
    }

    pub(crate) fn chunk_size_value(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn workers_value(&self) -> usize {
        self.workers
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_chunks_of_200() {
        let config = HasherConfig::new();
        assert_eq!(config.chunk_size_value(), 200);
        assert!(config.workers_value() >= 1);
    }

    #[test]
    fn zero_values_are_clamped() {
        let config = HasherConfig::new().chunk_size(0).workers(0);
        assert_eq!(config.chunk_size_value(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.workers_value(), 1);
    }

    #[test]
    fn build_creates_computer() {
        let computer = HasherConfig::new().chunk_size(10).build();
        assert_eq!(computer.config().chunk_size_value(), 10);
    }
}
