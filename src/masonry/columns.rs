//! Column state for greedy shortest-column placement.
//!
//! Heights are virtual: each image adds its height/width ratio, so the layout
//! can be computed before any pixel width is known. Placing every image in the
//! currently shortest column keeps all columns within one image's
//! contribution of each other.

use crate::types::ImageDescriptor;
use std::collections::HashSet;

/// An image that has been placed in a column.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    pub descriptor: ImageDescriptor,
    /// The URL that actually loaded (preview, or original after a retry).
    pub src: String,
    /// Virtual height contributed to its column.
    pub aspect: f64,
    /// Index of the image in the active filtered list.
    pub ordinal: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub images: Vec<PlacedImage>,
    pub virtual_height: f64,
}

/// Virtual height of one image. Unknown or degenerate sizes count as square.
pub fn aspect_contribution(width: u32, height: u32) -> f64 {
    if width == 0 {
        return 1.0;
    }
    let ratio = f64::from(height) / f64::from(width);
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn new(count: usize) -> Self {
        Self {
            columns: vec![Column::default(); count.max(1)],
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered_count() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Index of the column with the smallest virtual height; leftmost wins ties.
    pub fn shortest(&self) -> usize {
        self.columns
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(best, best_h), (i, c)| {
                if c.virtual_height < best_h {
                    (i, c.virtual_height)
                } else {
                    (best, best_h)
                }
            })
            .0
    }

    /// Append to the shortest column and return its index.
    pub fn place(&mut self, image: PlacedImage) -> usize {
        let index = self.shortest();
        let column = &mut self.columns[index];
        column.virtual_height += image.aspect;
        column.images.push(image);
        index
    }

    pub fn contains_original(&self, original_url: &str) -> bool {
        self.placed().any(|p| p.descriptor.original_url == original_url)
    }

    pub fn rendered_count(&self) -> usize {
        self.columns.iter().map(|c| c.images.len()).sum()
    }

    pub fn virtual_heights(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.virtual_height).collect()
    }

    pub fn max_virtual_height(&self) -> f64 {
        self.columns
            .iter()
            .map(|c| c.virtual_height)
            .fold(0.0, f64::max)
    }

    pub fn placed(&self) -> impl Iterator<Item = &PlacedImage> {
        self.columns.iter().flat_map(|c| c.images.iter())
    }

    /// Rebuild into `count` columns.
    ///
    /// Images are de-duplicated by original URL, keeping the earliest
    /// placement, then re-placed greedily in placement-ordinal order. Returns
    /// the number of duplicates dropped.
    pub fn redistribute(&mut self, count: usize) -> usize {
        let mut images: Vec<PlacedImage> = self
            .columns
            .drain(..)
            .flat_map(|c| c.images.into_iter())
            .collect();
        images.sort_by_key(|p| p.ordinal);

        let before = images.len();
        let mut seen = HashSet::new();
        images.retain(|p| seen.insert(p.descriptor.original_url.clone()));
        let dropped = before - images.len();

        *self = Self::new(count);
        for image in images {
            self.place(image);
        }
        dropped
    }
}
