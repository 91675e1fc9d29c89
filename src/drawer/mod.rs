//! Category drawer: the pull-down panel holding the full category tree.
//!
//! | Module | Role |
//! |---|---|
//! | [`tree`] | Category tree, endpoint parsing, searchable row rendering |
//! | [`gesture`] | Pull-to-open / push-to-close touch tracking |
//!
//! [`Drawer`] ties them together: it owns the tree, the search query and the
//! gesture, and resolves taps to tag selections.

pub mod gesture;
pub mod tree;

pub use gesture::{DrawerGesture, GestureOutcome, TouchZone};
pub use tree::{CategoryNode, CategoryTree, DrawerRow, RowKind, render_rows};

use crate::config::DrawerConfig;
use crate::source::ResourceFetcher;

/// Pick the tree to show.
///
/// The category endpoint wins when it answers with a non-empty tree. Otherwise
/// the manifest's categories become a flat tree, and with no categories at
/// all the placeholder tree is used.
pub fn load_tree<S: AsRef<str>>(
    endpoint: Option<&dyn ResourceFetcher>,
    manifest_categories: &[S],
) -> CategoryTree {
    if let Some(fetcher) = endpoint {
        match fetcher.fetch() {
            Ok(bytes) => match CategoryTree::parse_json(&bytes) {
                Ok(tree) if !tree.is_empty() => return tree,
                Ok(_) => log::info!("category tree at {} is empty", fetcher.location()),
                Err(e) => log::warn!("category tree at {} is invalid: {e}", fetcher.location()),
            },
            Err(e) => log::warn!("category tree at {} failed: {e}", fetcher.location()),
        }
    }
    if manifest_categories.is_empty() {
        CategoryTree::default_tree()
    } else {
        CategoryTree::from_categories(manifest_categories)
    }
}

#[derive(Debug, Clone)]
pub struct Drawer {
    tree: CategoryTree,
    query: String,
    active: Option<String>,
    gesture: DrawerGesture,
}

impl Drawer {
    pub fn new(tree: CategoryTree, config: &DrawerConfig) -> Self {
        Self {
            tree,
            query: String::new(),
            active: None,
            gesture: DrawerGesture::new(config.pull_threshold, config.resistance),
        }
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn set_tree(&mut self, tree: CategoryTree) {
        self.tree = tree;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_active(&mut self, tag: &str) {
        self.active = Some(tag.to_string());
    }

    pub fn is_open(&self) -> bool {
        self.gesture.is_open()
    }

    pub fn open(&mut self) {
        self.gesture.open();
    }

    /// Close and clear the search.
    pub fn close(&mut self) {
        self.gesture.close();
        self.query.clear();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn rows(&self) -> Vec<DrawerRow> {
        render_rows(&self.tree, &self.query, self.active.as_deref())
    }

    /// Resolve a tap on a row. The drawer closes and the tag is returned for
    /// the caller to apply; a tag that names no node is ignored.
    pub fn tap(&mut self, tag: &str) -> Option<String> {
        if !self.rows().iter().any(|r| r.tag == tag) {
            log::debug!("drawer tap on unknown tag '{tag}'");
            return None;
        }
        self.active = Some(tag.to_string());
        self.close();
        Some(tag.to_string())
    }

    pub fn touch_start(&mut self, y: f64, page_scroll_y: f64, zone: TouchZone) -> bool {
        self.gesture.touch_start(y, page_scroll_y, zone)
    }

    pub fn touch_move(&mut self, y: f64) -> Option<f64> {
        self.gesture.touch_move(y)
    }

    pub fn touch_end(&mut self) -> GestureOutcome {
        let outcome = self.gesture.touch_end();
        if outcome == GestureOutcome::Closed {
            self.query.clear();
        }
        outcome
    }
}
