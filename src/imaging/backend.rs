//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the gallery needs:
//! identify (pixel size of an encoded image) and resize (decode, scale,
//! re-encode as a preview). Both work on in-memory bytes because originals
//! come out of an object store, not the local filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An encoded image ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Get the pixel size of an encoded image.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, resize to exactly the requested size and encode.
    fn resize(&self, params: &ResizeParams) -> Result<EncodedImage, BackendError>;
}
