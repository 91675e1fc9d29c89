//! Gallery data source.
//!
//! Loads the manifest from a primary location, fails over to a static snapshot
//! and, when both fail, degrades to an empty manifest instead of erroring. The
//! last good manifest is cached; a call to [`GallerySource::load`] made while
//! another load is in flight returns the cache immediately instead of queuing.
//!
//! Derived views ([`ImageCatalog`]) are computed from the cached manifest. The
//! source's views are shuffled on every call; the manifest's own views are
//! stable, which is what tests and the headless simulator want.

use crate::keys::PREVIEW_PREFIX;
use crate::types::{GalleryManifest, ImageDescriptor};
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Tag value that selects every category.
pub const ALL_TAG: &str = "all";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{location} responded with status {status}")]
    Status { location: String, status: u16 },
}

/// Something that can produce the raw bytes of a JSON resource.
pub trait ResourceFetcher: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, SourceError>;

    /// Human-readable location, for logs.
    fn location(&self) -> &str;
}

/// Fetches over HTTP with a blocking client. Non-2xx responses are errors.
pub struct HttpFetcher {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                location: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// Reads a local file, e.g. the static `gallery-index.json` snapshot.
pub struct FileFetcher {
    path: PathBuf,
    label: String,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

impl ResourceFetcher for FileFetcher {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Ok(std::fs::read(&self.path)?)
    }

    fn location(&self) -> &str {
        &self.label
    }
}

/// Pick a fetcher for a location: `http(s)://` URLs go over the network,
/// anything else is a file path.
pub fn fetcher_for(
    location: &str,
    timeout: Duration,
) -> Result<Box<dyn ResourceFetcher>, SourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpFetcher::new(location, timeout)?))
    } else {
        Ok(Box::new(FileFetcher::new(location)))
    }
}

/// Fetch and decode a JSON resource.
pub fn fetch_json<T: DeserializeOwned>(fetcher: &dyn ResourceFetcher) -> Result<T, SourceError> {
    let bytes = fetcher.fetch()?;
    Ok(serde_json::from_slice(&bytes)?)
}

// =============================================================================
// Derived views
// =============================================================================

/// Read access to the images of a gallery, grouped by category.
pub trait ImageCatalog {
    fn categories(&self) -> Vec<String>;

    /// Every image once, identified by original URL.
    fn all_images(&self) -> Vec<ImageDescriptor>;

    /// Images of one category. Unknown categories yield an empty list.
    fn images_for_category(&self, name: &str) -> Vec<ImageDescriptor>;

    /// `"all"` selects [`all_images`](Self::all_images), anything else a category.
    fn images_for_tag(&self, tag: &str) -> Vec<ImageDescriptor> {
        if tag == ALL_TAG {
            self.all_images()
        } else {
            self.images_for_category(tag)
        }
    }
}

/// Categories offered as filter tags: manifest keys minus the reserved
/// `all` and preview names, sorted.
pub fn tag_categories(catalog: &impl ImageCatalog) -> Vec<String> {
    let mut names: Vec<String> = catalog
        .categories()
        .into_iter()
        .filter(|c| c != ALL_TAG && c != PREVIEW_PREFIX)
        .collect();
    names.sort();
    names
}

/// Stable views: categories in key order, images in manifest order.
impl ImageCatalog for GalleryManifest {
    fn categories(&self) -> Vec<String> {
        self.gallery.keys().cloned().collect()
    }

    fn all_images(&self) -> Vec<ImageDescriptor> {
        let mut seen = HashSet::new();
        self.gallery
            .values()
            .flat_map(|c| c.images.iter())
            .filter(|img| seen.insert(img.original_url.clone()))
            .cloned()
            .collect()
    }

    fn images_for_category(&self, name: &str) -> Vec<ImageDescriptor> {
        self.gallery
            .get(name)
            .map(|c| c.images.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// GallerySource
// =============================================================================

/// Cached, single-flight manifest loader with a static fallback.
pub struct GallerySource {
    primary: Box<dyn ResourceFetcher>,
    fallback: Option<Box<dyn ResourceFetcher>>,
    cache: Mutex<Arc<GalleryManifest>>,
    loading: AtomicBool,
}

/// Clears the in-flight flag however `load` exits.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GallerySource {
    pub fn new(
        primary: Box<dyn ResourceFetcher>,
        fallback: Option<Box<dyn ResourceFetcher>>,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache: Mutex::new(Arc::new(GalleryManifest::default())),
            loading: AtomicBool::new(false),
        }
    }

    /// Build from the `[source]` config section.
    pub fn from_config(config: &crate::config::SourceConfig) -> Result<Self, SourceError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let primary = fetcher_for(&config.gallery_endpoint, timeout)?;
        let fallback = if config.fallback.is_empty() {
            None
        } else {
            Some(fetcher_for(&config.fallback, timeout)?)
        };
        Ok(Self::new(primary, fallback))
    }

    /// A source that serves a fixed manifest. Nothing is ever fetched.
    pub fn from_manifest(manifest: GalleryManifest) -> Self {
        let source = Self::new(Box::new(NoFetch), None);
        source.store(manifest);
        source
    }

    /// Load the manifest: primary, then fallback, then empty.
    ///
    /// A successful load replaces the cache. Total failure returns an empty
    /// manifest and leaves the cache untouched. Called while another load is
    /// running, returns the current cache.
    pub fn load(&self) -> Arc<GalleryManifest> {
        if self.loading.swap(true, Ordering::AcqRel) {
            log::debug!("manifest load already in flight, serving cache");
            return self.cached();
        }
        let _guard = LoadingGuard(&self.loading);

        match fetch_json::<GalleryManifest>(self.primary.as_ref()) {
            Ok(manifest) => return self.store(manifest),
            Err(e) => log::warn!("gallery endpoint {} failed: {e}", self.primary.location()),
        }

        if let Some(fallback) = &self.fallback {
            match fetch_json::<GalleryManifest>(fallback.as_ref()) {
                Ok(manifest) => {
                    log::info!("using static gallery snapshot {}", fallback.location());
                    return self.store(manifest);
                }
                Err(e) => log::warn!("gallery snapshot {} failed: {e}", fallback.location()),
            }
        }

        log::error!("no gallery source available, continuing with an empty gallery");
        Arc::new(GalleryManifest::empty())
    }

    /// The last successfully loaded manifest.
    pub fn cached(&self) -> Arc<GalleryManifest> {
        Arc::clone(&self.cache.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn total_images(&self) -> usize {
        self.cached().total_images
    }

    fn store(&self, manifest: GalleryManifest) -> Arc<GalleryManifest> {
        let manifest = Arc::new(manifest);
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&manifest);
        manifest
    }
}

/// Shuffled views over the cached manifest, reshuffled on every call.
impl ImageCatalog for GallerySource {
    fn categories(&self) -> Vec<String> {
        self.cached().categories()
    }

    fn all_images(&self) -> Vec<ImageDescriptor> {
        let manifest = self.cached();
        let mut rng = rand::rng();
        let mut categories: Vec<_> = manifest.gallery.values().collect();
        categories.shuffle(&mut rng);

        let mut seen = HashSet::new();
        let mut images = Vec::with_capacity(manifest.total_images);
        for category in categories {
            let mut batch: Vec<&ImageDescriptor> = category.images.iter().collect();
            batch.shuffle(&mut rng);
            images.extend(
                batch
                    .into_iter()
                    .filter(|img| seen.insert(img.original_url.clone()))
                    .cloned(),
            );
        }
        images
    }

    fn images_for_category(&self, name: &str) -> Vec<ImageDescriptor> {
        let mut images = self.cached().images_for_category(name);
        images.shuffle(&mut rand::rng());
        images
    }
}

struct NoFetch;

impl ResourceFetcher for NoFetch {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "fixed manifest source",
        )))
    }

    fn location(&self) -> &str {
        "fixed manifest"
    }
}
