//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. They sit between the
//! [`operations`](super::operations) module, which decides target sizes, and
//! the [`backend`](super::backend), which does the pixel work, so a mock
//! backend can stand in during tests.

/// A resize of an in-memory source to exact output dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams<'a> {
    pub source: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Preview generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Previews fit inside a `max_edge` square.
    pub max_edge: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { max_edge: 400 }
    }
}

impl From<&crate::config::PreviewsConfig> for PreviewConfig {
    fn from(config: &crate::config::PreviewsConfig) -> Self {
        Self {
            max_edge: config.max_edge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_config_default_is_400() {
        assert_eq!(PreviewConfig::default().max_edge, 400);
    }

    #[test]
    fn preview_config_from_gallery_config() {
        let section = crate::config::PreviewsConfig {
            max_edge: 256,
            max_processes: None,
        };
        assert_eq!(PreviewConfig::from(&section).max_edge, 256);
    }
}
