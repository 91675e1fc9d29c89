//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user `config.toml` in the config directory overrides any
//! subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [source]
//! gallery_endpoint = "/api/gallery"          # Dynamic manifest endpoint
//! fallback = "gallery-index.json"            # Static snapshot used when the endpoint fails
//! categories_endpoint = "/api/categories"    # Category tree for the drawer
//! public_base_url = ""                       # Prefix for original/preview URLs
//! request_timeout_secs = 15
//!
//! [layout]
//! breakpoint = 768          # Viewport width (px) where the wide layout starts
//! narrow_columns = 4
//! wide_columns = 8
//!
//! [loading]
//! scroll_throttle_ms = 120  # Minimum spacing between scroll evaluations
//! fill_margin = 400         # Load more while content < viewport + margin
//!
//! [viewer]
//! swipe_threshold = 50      # Horizontal px before a swipe navigates
//!
//! [drawer]
//! pull_threshold = 80       # Resisted px past which a pull opens the drawer
//! resistance = 0.8          # Exponent applied to raw pull distance
//! all_label = "All"
//!
//! [previews]
//! max_edge = 400            # Previews fit inside max_edge x max_edge
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Where the manifest and category tree come from.
    pub source: SourceConfig,
    /// Column breakpoint and counts.
    pub layout: LayoutConfig,
    /// Scroll-driven batch loading.
    pub loading: LoadingConfig,
    /// Full-screen viewer gestures.
    pub viewer: ViewerConfig,
    /// Pull-down category drawer.
    pub drawer: DrawerConfig,
    /// Preview generation.
    pub previews: PreviewsConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.gallery_endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source.gallery_endpoint must not be empty".into(),
            ));
        }
        if self.layout.narrow_columns == 0 || self.layout.wide_columns == 0 {
            return Err(ConfigError::Validation(
                "layout column counts must be non-zero".into(),
            ));
        }
        if self.layout.breakpoint == 0 {
            return Err(ConfigError::Validation(
                "layout.breakpoint must be non-zero".into(),
            ));
        }
        if !(self.drawer.resistance > 0.0 && self.drawer.resistance <= 1.0) {
            return Err(ConfigError::Validation(
                "drawer.resistance must be in (0, 1]".into(),
            ));
        }
        if self.drawer.pull_threshold <= 0.0 {
            return Err(ConfigError::Validation(
                "drawer.pull_threshold must be positive".into(),
            ));
        }
        if self.viewer.swipe_threshold <= 0.0 {
            return Err(ConfigError::Validation(
                "viewer.swipe_threshold must be positive".into(),
            ));
        }
        if self.previews.max_edge == 0 {
            return Err(ConfigError::Validation(
                "previews.max_edge must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Manifest and category-tree locations.
///
/// A location beginning with `http://` or `https://` is fetched over HTTP;
/// anything else is read as a local file path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub gallery_endpoint: String,
    pub fallback: String,
    pub categories_endpoint: String,
    /// Prefix joined onto object keys to form public URLs.
    pub public_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            gallery_endpoint: "/api/gallery".to_string(),
            fallback: "gallery-index.json".to_string(),
            categories_endpoint: "/api/categories".to_string(),
            public_base_url: String::new(),
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub breakpoint: u32,
    pub narrow_columns: usize,
    pub wide_columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            breakpoint: 768,
            narrow_columns: 4,
            wide_columns: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    pub scroll_throttle_ms: u64,
    /// Extra pixels below the viewport that must be filled before loading stops.
    pub fill_margin: f64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: 120,
            fill_margin: 400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub swipe_threshold: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawerConfig {
    pub pull_threshold: f64,
    pub resistance: f64,
    /// Label of the catch-all tag button.
    pub all_label: String,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            pull_threshold: 80.0,
            resistance: 0.8,
            all_label: "All".to_string(),
        }
    }
}

/// Preview generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewsConfig {
    /// Bounding box edge; previews are never enlarged.
    pub max_edge: u32,
    /// Maximum number of parallel preview workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

impl Default for PreviewsConfig {
    fn default() -> Self {
        Self {
            max_edge: 400,
            max_processes: None,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &PreviewsConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Masonry Gal Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Data source
# ---------------------------------------------------------------------------
[source]
# Dynamic manifest endpoint. http(s) URLs are fetched, anything else is
# read as a local file.
gallery_endpoint = "/api/gallery"
# Static snapshot (same JSON shape) used when the endpoint fails.
fallback = "gallery-index.json"
# Category tree shown in the pull-down drawer.
categories_endpoint = "/api/categories"
# Prefix joined onto object keys to build image URLs.
public_base_url = ""
request_timeout_secs = 15

# ---------------------------------------------------------------------------
# Column layout
# ---------------------------------------------------------------------------
[layout]
# Viewports narrower than this use narrow_columns.
breakpoint = 768
narrow_columns = 4
wide_columns = 8

# ---------------------------------------------------------------------------
# Incremental loading
# ---------------------------------------------------------------------------
[loading]
# Scroll events closer together than this are ignored.
scroll_throttle_ms = 120
# Keep loading while rendered content is shorter than viewport + margin.
fill_margin = 400.0

# ---------------------------------------------------------------------------
# Viewer
# ---------------------------------------------------------------------------
[viewer]
# Horizontal swipe distance (px) that switches images.
swipe_threshold = 50.0

# ---------------------------------------------------------------------------
# Category drawer
# ---------------------------------------------------------------------------
[drawer]
# Resisted pull distance (px) past which the drawer opens.
pull_threshold = 80.0
# Pull resistance exponent: displayed = raw ^ resistance.
resistance = 0.8
all_label = "All"

# ---------------------------------------------------------------------------
# Preview generation
# ---------------------------------------------------------------------------
[previews]
# Previews fit inside max_edge x max_edge and are never enlarged.
max_edge = 400
# Maximum parallel workers. Omit to use all CPU cores.
# max_processes = 4
"##
}
