//! Manifest wire types shared by the builder, the data source and the loader.
//!
//! The JSON shape is fixed by the dynamic endpoint and the static snapshot,
//! which must be interchangeable:
//!
//! ```json
//! {
//!   "gallery": {
//!     "Landscapes": {
//!       "name": "Landscapes",
//!       "images": [
//!         { "name": "dawn.jpg", "original": "...", "preview": "...", "category": "Landscapes" }
//!       ],
//!       "count": 1
//!     }
//!   },
//!   "total_images": 1,
//!   "generated_at": "2026-01-01T00:00:00Z"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One image as listed in the manifest.
///
/// Identity is `original_url`: two descriptors with the same original are the
/// same image, whichever category listed them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub name: String,
    #[serde(rename = "original")]
    pub original_url: String,
    #[serde(rename = "preview")]
    pub preview_url: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub images: Vec<ImageDescriptor>,
    pub count: usize,
}

/// Full category → images listing. Regenerated wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GalleryManifest {
    #[serde(default)]
    pub gallery: BTreeMap<String, CategoryEntry>,
    #[serde(default)]
    pub total_images: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl GalleryManifest {
    /// The degraded result returned when every source failed.
    pub fn empty() -> Self {
        Self {
            gallery: BTreeMap::new(),
            total_images: 0,
            generated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gallery.values().all(|c| c.images.is_empty())
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.gallery.keys().map(String::as_str)
    }
}
