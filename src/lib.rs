//! # Masonry Gal
//!
//! An incremental masonry photo gallery over object storage. Originals sit in
//! a bucket under `<category>/<file>`, downscaled previews under
//! `0_preview/<category>/<base>.webp`, and a JSON manifest groups them by
//! category. The page loads the manifest, offers the categories as filter
//! tags and streams images into the shortest of N columns as the user
//! scrolls.
//!
//! # Architecture: Sans-IO Core
//!
//! The loader at the heart of the gallery never performs I/O itself:
//!
//! ```text
//! host                         MasonryLoader
//! ────                         ─────────────
//! filter_images("Birds") ───►  reset cursor, bump generation
//! poll_request()         ◄───  FetchRequest { ticket, url }
//! load the image …
//! complete(ticket, size) ───►  place in shortest column, queue next request
//! drain_events()         ◄───  Placed / Skipped / RevealGallery / Preload …
//! ```
//!
//! A browser host answers requests from image `onload` callbacks; the CLI and
//! the tests answer them from a local bucket mirror with
//! [`masonry::drive`]. Because every request carries a generation-stamped
//! ticket, results that arrive after a tag switch are dropped on arrival
//! instead of needing cancellation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`masonry`] | The core: column placement, batch loading, scroll trigger, viewer |
//! | [`source`] | Gallery data source: manifest fetch with fallback, cache, tag views |
//! | [`tag_bar`] | Flat category filter bar |
//! | [`drawer`] | Pull-down category drawer: tree, search, gesture |
//! | [`gallery`] | Wires the data source, tag bar, drawer and loader together |
//! | [`render`] | HTML markup for the page, using Maud |
//! | [`manifest`] | Builds the manifest from an object-store listing |
//! | [`previews`] | Generates missing previews in parallel |
//! | [`imaging`] | Pure-Rust decode, resize and WebP encode |
//! | [`store`] | Object-store interface and a directory-backed implementation |
//! | [`keys`] | Object-key naming conventions |
//! | [`types`] | Manifest wire types |
//! | [`config`] | `config.toml` loading, layering over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Fetch in Flight
//!
//! Images within a batch load strictly one after another. Placement depends
//! on the column heights after the previous image, so loading in parallel
//! would either reorder the layout or require buffering. One outstanding
//! request keeps the layout deterministic for a given list and set of sizes.
//!
//! ## Virtual Heights
//!
//! Columns track the sum of height/width ratios, not pixels. The layout is
//! then independent of the column pixel width, and a relayout across the
//! breakpoint is just re-placing the same ratios into a different number of
//! columns.
//!
//! ## Degrade, Don't Fail
//!
//! The page must always render something. A dead manifest endpoint falls back
//! to the static snapshot, then to an empty gallery; a broken preview retries
//! the original once and is then skipped; unknown tags are ignored.

pub mod config;
pub mod drawer;
pub mod gallery;
pub mod imaging;
pub mod keys;
pub mod manifest;
pub mod masonry;
pub mod output;
pub mod previews;
pub mod render;
pub mod source;
pub mod store;
pub mod tag_bar;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
