//! Page-level wiring.
//!
//! [`Gallery`] owns one of each component and performs the hand-offs between
//! them: mounting loads the manifest, builds the tag bar and the drawer tree,
//! and starts the catch-all tag; tag selections from either the bar or the
//! drawer are forwarded to the loader.

use crate::config::GalleryConfig;
use crate::drawer::{self, Drawer};
use crate::masonry::{LoaderSettings, MasonryLoader, Viewport};
use crate::source::{
    ALL_TAG, GallerySource, ResourceFetcher, SourceError, fetcher_for, tag_categories,
};
use crate::tag_bar::TagBar;
use crate::types::GalleryManifest;
use std::sync::Arc;
use std::time::Duration;

pub struct Gallery {
    source: GallerySource,
    categories: Option<Box<dyn ResourceFetcher>>,
    all_label: String,
    tag_bar: TagBar,
    drawer: Drawer,
    loader: MasonryLoader,
}

impl Gallery {
    pub fn new(
        source: GallerySource,
        categories: Option<Box<dyn ResourceFetcher>>,
        config: &GalleryConfig,
        viewport: Viewport,
    ) -> Self {
        let all_label = config.drawer.all_label.clone();
        Self {
            tag_bar: TagBar::new::<&str>(&all_label, &[]),
            drawer: Drawer::new(drawer::CategoryTree::default(), &config.drawer),
            loader: MasonryLoader::new(LoaderSettings::from_config(config), viewport),
            source,
            categories,
            all_label,
        }
    }

    /// Build from config, with the manifest and category tree fetched from
    /// the configured locations. An empty `categories_endpoint` disables the
    /// category tree fetch.
    pub fn from_config(config: &GalleryConfig, viewport: Viewport) -> Result<Self, SourceError> {
        let source = GallerySource::from_config(&config.source)?;
        let categories = if config.source.categories_endpoint.is_empty() {
            None
        } else {
            let timeout = Duration::from_secs(config.source.request_timeout_secs);
            Some(fetcher_for(&config.source.categories_endpoint, timeout)?)
        };
        Ok(Self::new(source, categories, config, viewport))
    }

    /// Load the manifest, build the filter bar and drawer, and start showing
    /// every image.
    ///
    /// Returns what the load produced. The bar, drawer and loader all work
    /// from the source's cache, which a failed reload leaves in place.
    pub fn mount(&mut self) -> Arc<GalleryManifest> {
        let manifest = self.source.load();
        let shown = self.source.cached();
        let categories = tag_categories(&*shown);
        self.tag_bar = TagBar::new(&self.all_label, &categories);
        self.drawer
            .set_tree(drawer::load_tree(self.categories.as_deref(), &categories));
        self.drawer.set_active(ALL_TAG);
        self.loader.filter_images(ALL_TAG, &self.source);
        log::info!(
            "gallery mounted: {} images in {} categories",
            shown.total_images,
            categories.len()
        );
        manifest
    }

    /// Select a tag from the filter bar.
    ///
    /// Returns the bar's scroll target. A tag with no button is ignored.
    pub fn select_tag(&mut self, tag: &str) -> Option<f64> {
        let target = self.tag_bar.select_tag_by_value(tag)?;
        let value = self.tag_bar.active_tag().unwrap_or(ALL_TAG).to_string();
        self.drawer.set_active(&value);
        self.loader.filter_images(&value, &self.source);
        Some(target)
    }

    /// Select a tag from the drawer and close it.
    ///
    /// Drawer nodes need not have a matching bar button; the loader is
    /// filtered either way and the bar keeps its previous state on a miss.
    /// Returns whether the tap resolved to a tag.
    pub fn drawer_select(&mut self, tag: &str) -> bool {
        let Some(tag) = self.drawer.tap(tag) else {
            return false;
        };
        self.tag_bar.select_tag_by_value(&tag);
        self.loader.filter_images(&tag, &self.source);
        true
    }

    pub fn source(&self) -> &GallerySource {
        &self.source
    }

    pub fn tag_bar(&self) -> &TagBar {
        &self.tag_bar
    }

    pub fn tag_bar_mut(&mut self) -> &mut TagBar {
        &mut self.tag_bar
    }

    pub fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    pub fn drawer_mut(&mut self) -> &mut Drawer {
        &mut self.drawer
    }

    pub fn loader(&self) -> &MasonryLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut MasonryLoader {
        &mut self.loader
    }
}
