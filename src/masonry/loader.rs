//! Incremental masonry loader.
//!
//! The loader never performs I/O. It hands the host one [`FetchRequest`] at a
//! time through [`MasonryLoader::poll_request`], and the host reports the
//! result with [`MasonryLoader::complete`]. Every request carries a
//! [`Ticket`] stamped with the loader's generation; changing the tag bumps the
//! generation, so results for the previous tag are discarded when they arrive.
//!
//! ## Batch walk
//!
//! ```text
//! index = cursor
//! while batch wants more and index < list.len():
//!     skip if preview already loaded or original already rendered
//!     fetch preview ──ok──► place in shortest column
//!         └─fail─► fetch original once ──ok──► place
//!                      └─fail─► skip
//! ```
//!
//! After a batch the loader reveals the gallery (first batch of a tag) or
//! hides the loading indicator, warms the next batch's previews, and starts
//! another batch straight away when the rendered columns do not yet fill the
//! viewport plus a margin.

use super::columns::{ColumnSet, PlacedImage, aspect_contribution};
use super::scroll::{ScrollMetrics, ScrollThrottle, near_bottom};
use super::viewer::{Viewer, ViewerCommand, ViewerInput};
use super::viewport::{self, Viewport};
use crate::config::GalleryConfig;
use crate::source::ImageCatalog;
use crate::types::ImageDescriptor;
use std::collections::HashSet;
use std::time::Duration;
use web_time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    /// A batch started by a tag change or by viewport underfill.
    LoadingBatch,
    /// A batch started by scrolling near the bottom.
    ScrollLoading,
    ViewerOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Preview,
    Original,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    /// Position of the image in the active list.
    pub index: usize,
    pub attempt: Attempt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded { width: u32, height: u32 },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    /// Columns were rebuilt empty for a new tag.
    Reset { tag: String, columns: usize },
    ShowLoading,
    HideLoading,
    RevealGallery,
    Placed {
        column: usize,
        ordinal: usize,
        src: String,
    },
    Skipped { ordinal: usize, original_url: String },
    /// Warm these URLs; results never touch the columns.
    Preload(Vec<String>),
    /// The active list has been walked to the end.
    Exhausted,
    /// Columns were redistributed into a new count.
    Relayout { columns: usize },
}

/// Position in the active list and what has been loaded so far.
#[derive(Debug, Clone, Default)]
pub struct LoadCursor {
    pub current_index: usize,
    pub current_tag: String,
    /// Preview and original URLs of every placed image.
    pub loaded_urls: HashSet<String>,
}

impl LoadCursor {
    fn reset(&mut self, tag: &str) {
        self.current_index = 0;
        self.current_tag = tag.to_string();
        self.loaded_urls.clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Batch {
    remaining: usize,
    initial: bool,
    state: LoaderState,
}

/// Loader tunables, taken from [`GalleryConfig`].
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub layout: crate::config::LayoutConfig,
    pub scroll_throttle: Duration,
    pub fill_margin: f64,
    pub swipe_threshold: f64,
}

impl LoaderSettings {
    pub fn from_config(config: &GalleryConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            scroll_throttle: Duration::from_millis(config.loading.scroll_throttle_ms),
            fill_margin: config.loading.fill_margin,
            swipe_threshold: config.viewer.swipe_threshold,
        }
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default())
    }
}

pub struct MasonryLoader {
    settings: LoaderSettings,
    viewport: Viewport,
    columns: ColumnSet,
    cursor: LoadCursor,
    list: Vec<ImageDescriptor>,
    generation: u64,
    batch: Option<Batch>,
    pending: Option<FetchRequest>,
    in_flight: Option<Ticket>,
    exhausted: bool,
    throttle: ScrollThrottle,
    viewer: Viewer,
    events: Vec<LoaderEvent>,
}

impl MasonryLoader {
    pub fn new(settings: LoaderSettings, viewport: Viewport) -> Self {
        let columns = ColumnSet::new(viewport::column_count(&settings.layout, viewport.width));
        Self {
            throttle: ScrollThrottle::new(settings.scroll_throttle),
            viewer: Viewer::new(settings.swipe_threshold),
            settings,
            viewport,
            columns,
            cursor: LoadCursor::default(),
            list: Vec::new(),
            generation: 0,
            batch: None,
            pending: None,
            in_flight: None,
            exhausted: false,
            events: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> LoaderState {
        if self.viewer.is_open() {
            LoaderState::ViewerOpen
        } else {
            self.batch.map(|b| b.state).unwrap_or(LoaderState::Idle)
        }
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn cursor(&self) -> &LoadCursor {
        &self.cursor
    }

    /// The active filtered list, fixed for the lifetime of a tag.
    pub fn active_list(&self) -> &[ImageDescriptor] {
        &self.list
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.batch.is_some()
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LoaderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rendered height estimate: tallest column at the current column width.
    pub fn content_height(&self) -> f64 {
        let column_width = self.viewport.width / self.columns.len() as f64;
        self.columns.max_virtual_height() * column_width
    }

    fn needs_more_content(&self) -> bool {
        self.content_height() < self.viewport.height + self.settings.fill_margin
    }

    // =========================================================================
    // Host protocol
    // =========================================================================

    /// Take the next request to perform. At most one is outstanding.
    pub fn poll_request(&mut self) -> Option<FetchRequest> {
        let request = self.pending.take()?;
        self.in_flight = Some(request.ticket);
        Some(request)
    }

    /// Report the result of a request handed out by [`poll_request`](Self::poll_request).
    pub fn complete(&mut self, ticket: Ticket, outcome: FetchOutcome) {
        if ticket.generation != self.generation || self.in_flight != Some(ticket) {
            log::debug!(
                "discarding stale result for #{} (generation {})",
                ticket.index,
                ticket.generation
            );
            return;
        }
        self.in_flight = None;
        let Some(image) = self.list.get(ticket.index).cloned() else {
            return;
        };

        match outcome {
            FetchOutcome::Loaded { width, height } => {
                self.place_loaded(image, ticket, width, height);
            }
            FetchOutcome::Failed(reason) => match ticket.attempt {
                Attempt::Preview => {
                    log::warn!(
                        "preview {} failed ({reason}), retrying original",
                        image.preview_url
                    );
                    self.pending = Some(FetchRequest {
                        ticket: Ticket {
                            attempt: Attempt::Original,
                            ..ticket
                        },
                        url: image.original_url,
                    });
                    return;
                }
                Attempt::Original => {
                    log::warn!("original {} failed ({reason}), skipping", image.original_url);
                    self.events.push(LoaderEvent::Skipped {
                        ordinal: ticket.index,
                        original_url: image.original_url,
                    });
                }
            },
        }
        self.advance();
    }

    fn place_loaded(&mut self, image: ImageDescriptor, ticket: Ticket, width: u32, height: u32) {
        // another path may have rendered it while this fetch was out
        if self.columns.contains_original(&image.original_url) {
            log::debug!("{} already rendered", image.original_url);
            self.events.push(LoaderEvent::Skipped {
                ordinal: ticket.index,
                original_url: image.original_url,
            });
            return;
        }
        let src = match ticket.attempt {
            Attempt::Preview => image.preview_url.clone(),
            Attempt::Original => image.original_url.clone(),
        };
        self.cursor.loaded_urls.insert(image.preview_url.clone());
        self.cursor.loaded_urls.insert(image.original_url.clone());
        let column = self.columns.place(PlacedImage {
            descriptor: image,
            src: src.clone(),
            aspect: aspect_contribution(width, height),
            ordinal: ticket.index,
        });
        self.events.push(LoaderEvent::Placed {
            column,
            ordinal: ticket.index,
            src,
        });
        if let Some(batch) = self.batch.as_mut() {
            batch.remaining = batch.remaining.saturating_sub(1);
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Switch to `tag` and start loading it from the beginning.
    ///
    /// Outstanding fetches are invalidated, the de-duplication set and cursor
    /// are reset and the columns rebuilt empty. The filtered list is taken
    /// from `catalog` once and kept for the whole tag session. An open viewer
    /// is closed since its index referred to the old list.
    pub fn filter_images(&mut self, tag: &str, catalog: &impl ImageCatalog) {
        self.generation += 1;
        self.pending = None;
        self.in_flight = None;
        self.batch = None;
        self.exhausted = false;
        self.viewer.close();
        self.throttle.reset();

        self.cursor.reset(tag);
        self.list = catalog.images_for_tag(tag);
        let count = viewport::column_count(&self.settings.layout, self.viewport.width);
        self.columns = ColumnSet::new(count);
        log::info!("tag '{tag}': {} images in {count} columns", self.list.len());

        self.events.push(LoaderEvent::Reset {
            tag: tag.to_string(),
            columns: count,
        });
        self.start_batch(true, LoaderState::LoadingBatch);
    }

    /// Start the next batch unless one is running or the list is exhausted.
    /// Returns whether a batch started.
    pub fn load_next_images(&mut self) -> bool {
        self.start_batch(false, LoaderState::LoadingBatch)
    }

    /// Evaluate a scroll event. Returns whether it started a batch.
    pub fn on_scroll(&mut self, now: Instant, metrics: ScrollMetrics) -> bool {
        if !self.throttle.ready(now) || self.batch.is_some() || self.exhausted {
            return false;
        }
        if near_bottom(metrics, self.viewport) || self.needs_more_content() {
            self.start_batch(false, LoaderState::ScrollLoading)
        } else {
            false
        }
    }

    /// Apply a new viewport.
    ///
    /// Height-only changes just update the sizing. A width change that moves
    /// across the breakpoint redistributes every rendered image into the new
    /// column count in placement order.
    pub fn resize(&mut self, viewport: Viewport) {
        let width_changed = viewport.width != self.viewport.width;
        self.viewport = viewport;
        if !width_changed {
            return;
        }
        let count = viewport::column_count(&self.settings.layout, viewport.width);
        if count == self.columns.len() {
            return;
        }
        let dropped = self.columns.redistribute(count);
        if dropped > 0 {
            log::warn!("relayout dropped {dropped} duplicate images");
        }
        log::info!(
            "relayout into {count} columns ({} images)",
            self.columns.rendered_count()
        );
        self.events.push(LoaderEvent::Relayout { columns: count });
        if self.batch.is_none() && !self.exhausted && self.needs_more_content() {
            self.start_batch(false, LoaderState::LoadingBatch);
        }
    }

    // =========================================================================
    // Viewer
    // =========================================================================

    pub fn open_viewer(&mut self, original_url: &str) -> Vec<ViewerCommand> {
        self.viewer.open(&self.list, original_url)
    }

    pub fn viewer_input(&mut self, input: ViewerInput) -> Vec<ViewerCommand> {
        self.viewer.handle(input, &self.list)
    }

    // =========================================================================
    // Batch machinery
    // =========================================================================

    fn start_batch(&mut self, initial: bool, state: LoaderState) -> bool {
        if self.batch.is_some() || self.exhausted {
            return false;
        }
        let remaining = viewport::batch_remaining(
            self.viewport,
            self.columns.len(),
            self.columns.rendered_count(),
        );
        log::debug!(
            "batch from #{} for {remaining} images",
            self.cursor.current_index
        );
        if !initial {
            self.events.push(LoaderEvent::ShowLoading);
        }
        self.batch = Some(Batch {
            remaining,
            initial,
            state,
        });
        self.advance();
        true
    }

    /// Walk the list until a fetch is queued or the batch ends.
    fn advance(&mut self) {
        while let Some(batch) = self.batch {
            if batch.remaining == 0 || self.cursor.current_index >= self.list.len() {
                self.finish_batch();
                continue;
            }
            let index = self.cursor.current_index;
            self.cursor.current_index += 1;
            let image = &self.list[index];
            if self.cursor.loaded_urls.contains(&image.preview_url)
                || self.columns.contains_original(&image.original_url)
            {
                log::debug!("skipping duplicate {}", image.original_url);
                self.events.push(LoaderEvent::Skipped {
                    ordinal: index,
                    original_url: image.original_url.clone(),
                });
                continue;
            }
            self.pending = Some(FetchRequest {
                ticket: Ticket {
                    generation: self.generation,
                    index,
                    attempt: Attempt::Preview,
                },
                url: image.preview_url.clone(),
            });
            return;
        }
    }

    fn finish_batch(&mut self) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        if batch.initial {
            self.events.push(LoaderEvent::RevealGallery);
        } else {
            self.events.push(LoaderEvent::HideLoading);
        }

        if self.cursor.current_index >= self.list.len() {
            self.exhausted = true;
            log::info!(
                "all {} images of '{}' walked, {} rendered",
                self.list.len(),
                self.cursor.current_tag,
                self.columns.rendered_count()
            );
            self.events.push(LoaderEvent::Exhausted);
            return;
        }

        let preload = self.preload_urls();
        if !preload.is_empty() {
            self.events.push(LoaderEvent::Preload(preload));
        }
        if self.needs_more_content() {
            let remaining = viewport::batch_remaining(
                self.viewport,
                self.columns.len(),
                self.columns.rendered_count(),
            );
            log::debug!("viewport underfilled, continuing with {remaining} more");
            self.events.push(LoaderEvent::ShowLoading);
            self.batch = Some(Batch {
                remaining,
                initial: false,
                state: LoaderState::LoadingBatch,
            });
        }
    }

    fn preload_urls(&self) -> Vec<String> {
        let count = viewport::preload_count(self.viewport, self.columns.len());
        self.list[self.cursor.current_index..]
            .iter()
            .filter(|img| !self.cursor.loaded_urls.contains(&img.preview_url))
            .take(count)
            .map(|img| img.preview_url.clone())
            .collect()
    }
}
