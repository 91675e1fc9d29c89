//! Viewport-dependent sizing rules.
//!
//! Column count comes from a single breakpoint. Everything else (how many
//! images a batch places, how far from the bottom a scroll triggers, how many
//! previews to warm) depends on a coarse device class derived from width.

use crate::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Width buckets: <600, <900, <1200, <1500, and wider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Phone,
    Tablet,
    Laptop,
    Desktop,
    Wide,
}

impl DeviceClass {
    pub fn for_width(width: f64) -> Self {
        if width < 600.0 {
            Self::Phone
        } else if width < 900.0 {
            Self::Tablet
        } else if width < 1200.0 {
            Self::Laptop
        } else if width < 1500.0 {
            Self::Desktop
        } else {
            Self::Wide
        }
    }

    /// Assumed rendered height of one image, in px.
    pub fn average_image_height(self) -> f64 {
        match self {
            Self::Phone => 180.0,
            Self::Tablet => 200.0,
            Self::Laptop => 220.0,
            Self::Desktop => 240.0,
            Self::Wide => 260.0,
        }
    }

    /// Rows loaded beyond what fills the viewport.
    pub fn margin_rows(self) -> usize {
        match self {
            Self::Phone => 3,
            Self::Tablet | Self::Laptop => 2,
            Self::Desktop | Self::Wide => 1,
        }
    }

    /// Fraction of the viewport height, measured up from the document
    /// bottom, inside which a scroll triggers the next batch.
    pub fn scroll_trigger_fraction(self) -> f64 {
        match self {
            Self::Phone => 0.8,
            Self::Tablet => 0.6,
            Self::Laptop => 0.5,
            Self::Desktop => 0.4,
            Self::Wide => 0.3,
        }
    }

    fn preload_row_height(self) -> f64 {
        match self {
            Self::Phone => 200.0,
            Self::Tablet => 250.0,
            Self::Laptop => 300.0,
            Self::Desktop => 350.0,
            Self::Wide => 400.0,
        }
    }

    fn preload_extra_rows(self) -> usize {
        match self {
            Self::Phone => 2,
            _ => 1,
        }
    }
}

pub fn column_count(layout: &LayoutConfig, viewport_width: f64) -> usize {
    if viewport_width < f64::from(layout.breakpoint) {
        layout.narrow_columns
    } else {
        layout.wide_columns
    }
}

/// Images a viewport wants rendered: enough rows to fill it plus margin rows.
pub fn batch_target(viewport: Viewport, columns: usize) -> usize {
    let class = DeviceClass::for_width(viewport.width);
    let rows = (viewport.height.max(0.0) / class.average_image_height()).ceil() as usize;
    (rows + class.margin_rows()) * columns
}

/// Images the next batch should place, never fewer than one row.
pub fn batch_remaining(viewport: Viewport, columns: usize, rendered: usize) -> usize {
    batch_target(viewport, columns)
        .saturating_sub(rendered)
        .max(columns)
}

/// Previews to warm after a batch, clamped to 2..=8 rows.
pub fn preload_count(viewport: Viewport, columns: usize) -> usize {
    let class = DeviceClass::for_width(viewport.width);
    let rows = (viewport.height.max(0.0) / class.preload_row_height()).ceil() as usize;
    (columns * (rows + class.preload_extra_rows())).clamp(columns * 2, columns * 8)
}

/// Distance from the document bottom at which scrolling loads more.
pub fn scroll_threshold(viewport: Viewport) -> f64 {
    viewport.height * DeviceClass::for_width(viewport.width).scroll_trigger_fraction()
}
