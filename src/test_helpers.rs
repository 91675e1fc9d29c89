//! Shared test utilities for the masonry-gal test suite.
//!
//! Provides manifest builders, scripted fetchers for the data source and the
//! loader, synthetic image bytes, and lookup helpers that panic with a clear
//! message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let manifest = manifest_of(&[("Birds", &["owl", "crow"]), ("Trees", &["oak"])]);
//! let mut loader = MasonryLoader::new(LoaderSettings::default(), Viewport::new(1920.0, 1080.0));
//! loader.filter_images("all", &manifest);
//! run_to_idle(&mut loader, &ScriptedFetcher::uniform(400, 600));
//!
//! let owl = find_placed(loader.columns(), "owl.jpg");
//! assert_eq!(owl.descriptor.category, "Birds");
//! ```

use crate::drawer::DrawerRow;
use crate::masonry::{FetchOutcome, ImageFetcher, MasonryLoader, PlacedImage, drive};
use crate::masonry::ColumnSet;
use crate::source::{ImageCatalog, ResourceFetcher, SourceError};
use crate::types::{CategoryEntry, GalleryManifest, ImageDescriptor};
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender};

pub const BASE_URL: &str = "https://cdn.example";

// =========================================================================
// Manifest builders
// =========================================================================

/// Descriptor for `<category>/<name>.jpg` under [`BASE_URL`].
pub fn descriptor(category: &str, name: &str) -> ImageDescriptor {
    ImageDescriptor {
        name: format!("{name}.jpg"),
        original_url: format!("{BASE_URL}/{category}/{name}.jpg"),
        preview_url: format!("{BASE_URL}/0_preview/{category}/{name}.webp"),
        category: category.to_string(),
    }
}

pub fn descriptors(category: &str, names: &[&str]) -> Vec<ImageDescriptor> {
    names.iter().map(|n| descriptor(category, n)).collect()
}

/// Manifest with the given categories and image names, in order.
pub fn manifest_of(categories: &[(&str, &[&str])]) -> GalleryManifest {
    let gallery: BTreeMap<String, CategoryEntry> = categories
        .iter()
        .map(|(name, images)| {
            (
                name.to_string(),
                CategoryEntry {
                    name: name.to_string(),
                    images: descriptors(name, images),
                    count: images.len(),
                },
            )
        })
        .collect();
    let total_images = gallery.values().map(|c| c.count).sum();
    GalleryManifest {
        gallery,
        total_images,
        generated_at: Some("2026-01-01T00:00:00+00:00".to_string()),
    }
}

/// One category holding `count` images named `img000`, `img001`, ...
pub fn manifest_with_count(category: &str, count: usize) -> GalleryManifest {
    let names: Vec<String> = (0..count).map(|i| format!("img{i:03}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    manifest_of(&[(category, refs.as_slice())])
}

/// Catalog that answers every tag with the same list.
pub struct FixedCatalog {
    images: Vec<ImageDescriptor>,
}

impl FixedCatalog {
    pub fn new(images: Vec<ImageDescriptor>) -> Self {
        Self { images }
    }
}

impl ImageCatalog for FixedCatalog {
    fn categories(&self) -> Vec<String> {
        let names: HashSet<&str> = self.images.iter().map(|i| i.category.as_str()).collect();
        names.into_iter().map(String::from).collect()
    }

    fn all_images(&self) -> Vec<ImageDescriptor> {
        self.images.clone()
    }

    fn images_for_category(&self, _name: &str) -> Vec<ImageDescriptor> {
        self.images.clone()
    }
}

// =========================================================================
// Resource fetchers for the data source
// =========================================================================

/// Always returns the same body.
pub struct StaticFetcher {
    body: Vec<u8>,
}

impl StaticFetcher {
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self {
            body: serde_json::to_vec(value).unwrap(),
        }
    }

    pub fn raw(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
        }
    }
}

impl ResourceFetcher for StaticFetcher {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Ok(self.body.clone())
    }

    fn location(&self) -> &str {
        "static"
    }
}

/// Always fails with an HTTP status.
pub struct FailingFetcher {
    status: u16,
}

impl FailingFetcher {
    pub fn status(status: u16) -> Self {
        Self { status }
    }
}

impl ResourceFetcher for FailingFetcher {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Status {
            location: "failing".to_string(),
            status: self.status,
        })
    }

    fn location(&self) -> &str {
        "failing"
    }
}

/// Plays back a script of responses; `None` entries fail. Fails once exhausted.
pub struct SequenceFetcher {
    script: Mutex<Vec<Option<Vec<u8>>>>,
}

impl SequenceFetcher {
    pub fn new(mut script: Vec<Option<Vec<u8>>>) -> Self {
        script.reverse();
        Self {
            script: Mutex::new(script),
        }
    }
}

impl ResourceFetcher for SequenceFetcher {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        match self.script.lock().unwrap().pop().flatten() {
            Some(body) => Ok(body),
            None => Err(SourceError::Status {
                location: "sequence".to_string(),
                status: 503,
            }),
        }
    }

    fn location(&self) -> &str {
        "sequence"
    }
}

/// Signals when a fetch starts and blocks until released.
pub struct GatedFetcher {
    body: Vec<u8>,
    started: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl GatedFetcher {
    pub fn new(body: Vec<u8>, started: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            body,
            started: Mutex::new(started),
            release: Mutex::new(release),
        }
    }
}

impl ResourceFetcher for GatedFetcher {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        self.started.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(self.body.clone())
    }

    fn location(&self) -> &str {
        "gated"
    }
}

// =========================================================================
// Image fetchers for the loader
// =========================================================================

/// Answers every image request with fixed dimensions, except for images
/// marked as failing, and records every URL it was asked for.
pub struct ScriptedFetcher {
    width: u32,
    height: u32,
    failing: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn uniform(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            failing: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fail both the preview and the original of `image`.
    pub fn failing(mut self, image: &ImageDescriptor) -> Self {
        self.failing.insert(image.preview_url.clone());
        self.failing.insert(image.original_url.clone());
        self
    }

    /// Fail only the preview of `image`.
    pub fn failing_preview(mut self, image: &ImageDescriptor) -> Self {
        self.failing.insert(image.preview_url.clone());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl ImageFetcher for ScriptedFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        self.requested.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            FetchOutcome::Failed(format!("scripted failure for {url}"))
        } else {
            FetchOutcome::Loaded {
                width: self.width,
                height: self.height,
            }
        }
    }
}

/// Serve requests until the loader is idle.
pub fn run_to_idle(loader: &mut MasonryLoader, fetcher: &impl ImageFetcher) {
    drive(loader, fetcher);
    assert!(!loader.is_loading(), "loader still loading after drive");
}

// =========================================================================
// Synthetic images
// =========================================================================

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_synthetic(width, height, image::ImageFormat::Jpeg)
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_synthetic(width, height, image::ImageFormat::WebP)
}

fn encode_synthetic(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

// =========================================================================
// Lookups, panicking with a clear message on miss
// =========================================================================

/// Find a placed image by file name. Panics if not found.
pub fn find_placed<'a>(columns: &'a ColumnSet, name: &str) -> &'a PlacedImage {
    columns
        .placed()
        .find(|p| p.descriptor.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = columns.placed().map(|p| p.descriptor.name.as_str()).collect();
            panic!("image '{name}' not placed. Placed: {names:?}")
        })
}

/// Find a drawer row by label. Panics if not found.
pub fn find_row<'a>(rows: &'a [DrawerRow], label: &str) -> &'a DrawerRow {
    rows.iter().find(|r| r.label == label).unwrap_or_else(|| {
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        panic!("row '{label}' not found. Available: {labels:?}")
    })
}

/// Labels of visible drawer rows, in order.
pub fn visible_labels(rows: &[DrawerRow]) -> Vec<&str> {
    rows.iter()
        .filter(|r| r.visible)
        .map(|r| r.label.as_str())
        .collect()
}
