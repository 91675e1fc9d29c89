//! High-level image operations.
//!
//! These functions combine calculations with backend execution.

use super::backend::{BackendError, EncodedImage, ImageBackend};
use super::calculations::fit_inside;
use super::params::{PreviewConfig, ResizeParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, bytes: &[u8]) -> Result<(u32, u32)> {
    let dims = backend.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// Create a preview that fits inside `config.max_edge` without enlargement.
pub fn create_preview(
    backend: &impl ImageBackend,
    source: &[u8],
    config: &PreviewConfig,
) -> Result<EncodedImage> {
    let original = get_dimensions(backend, source)?;
    if original.0 == 0 || original.1 == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "image has no pixels ({}x{})",
            original.0, original.1
        )));
    }
    let (width, height) = fit_inside(original, config.max_edge);
    backend.resize(&ResizeParams {
        source,
        width,
        height,
    })
}
