//! Builds a [`GalleryManifest`] from an object-store listing.
//!
//! This is what the dynamic gallery endpoint serves and what the `manifest`
//! command writes as the static fallback snapshot. Only keys that parse as
//! originals contribute (see [`keys::parse_original_key`]); previews and
//! non-image objects are ignored. Within a category, images are sorted by
//! file name.

use crate::keys::{self, OriginalKey};
use crate::store::{ObjectStore, StoreError, list_all};
use crate::types::{CategoryEntry, GalleryManifest, ImageDescriptor};
use std::collections::BTreeMap;

/// Build a manifest from raw object keys.
pub fn build_manifest<'a>(
    object_keys: impl IntoIterator<Item = &'a str>,
    base_url: &str,
) -> GalleryManifest {
    let mut gallery: BTreeMap<String, CategoryEntry> = BTreeMap::new();

    for key in object_keys {
        let Some(parsed) = keys::parse_original_key(key) else {
            continue;
        };
        let descriptor = descriptor_for(&parsed, key, base_url);
        gallery
            .entry(parsed.category.clone())
            .or_insert_with(|| CategoryEntry {
                name: parsed.category.clone(),
                images: Vec::new(),
                count: 0,
            })
            .images
            .push(descriptor);
    }

    let mut total_images = 0;
    for entry in gallery.values_mut() {
        entry.images.sort_by(|a, b| a.name.cmp(&b.name));
        entry.count = entry.images.len();
        total_images += entry.count;
    }

    GalleryManifest {
        gallery,
        total_images,
        generated_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}

/// List the whole store and build its manifest.
pub fn build_from_store(
    store: &impl ObjectStore,
    base_url: &str,
) -> Result<GalleryManifest, StoreError> {
    let all = list_all(store, "")?;
    let manifest = build_manifest(all.iter().map(String::as_str), base_url);
    log::info!(
        "manifest: {} images in {} categories",
        manifest.total_images,
        manifest.gallery.len()
    );
    Ok(manifest)
}

fn descriptor_for(parsed: &OriginalKey, raw_key: &str, base_url: &str) -> ImageDescriptor {
    ImageDescriptor {
        name: parsed.file_name.clone(),
        original_url: keys::public_url(base_url, raw_key),
        preview_url: keys::public_url(base_url, &parsed.preview_key()),
        category: parsed.category.clone(),
    }
}
