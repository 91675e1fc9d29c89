//! Pull-to-open gesture for the drawer.
//!
//! Closed: a downward drag that starts with the page scrolled to the top pulls
//! the drawer down. Open: an upward drag that starts in a close zone pushes it
//! back up. While dragging, the displayed offset is the raw distance raised to
//! the resistance exponent; on release the resisted distance is compared with
//! the threshold.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchZone {
    /// Anywhere on the page behind the drawer.
    Page,
    /// The drawer's pull handle or backdrop.
    CloseZone,
    /// Inside the drawer's scrollable content.
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No drag was being tracked.
    Ignored,
    Opened,
    Closed,
    /// Released short of the threshold; the drawer returns to where it was.
    SnappedBack,
}

#[derive(Debug, Clone)]
pub struct DrawerGesture {
    threshold: f64,
    resistance: f64,
    open: bool,
    start_y: Option<f64>,
    offset: f64,
}

impl DrawerGesture {
    pub fn new(threshold: f64, resistance: f64) -> Self {
        Self {
            threshold,
            resistance,
            open: false,
            start_y: None,
            offset: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dragging(&self) -> bool {
        self.start_y.is_some()
    }

    /// Current resisted offset; positive pulls down, negative pushes up.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Begin tracking if the touch may move the drawer. Returns whether it does.
    pub fn touch_start(&mut self, y: f64, page_scroll_y: f64, zone: TouchZone) -> bool {
        let eligible = if self.open {
            zone == TouchZone::CloseZone
        } else {
            page_scroll_y <= 0.0 && zone != TouchZone::Panel
        };
        self.start_y = eligible.then_some(y);
        self.offset = 0.0;
        eligible
    }

    /// Update the drag. Returns the offset to display, if tracking.
    pub fn touch_move(&mut self, y: f64) -> Option<f64> {
        let start = self.start_y?;
        let diff = y - start;
        self.offset = if !self.open && diff > 0.0 {
            self.resist(diff)
        } else if self.open && diff < 0.0 {
            -self.resist(-diff)
        } else {
            0.0
        };
        Some(self.offset)
    }

    pub fn touch_end(&mut self) -> GestureOutcome {
        if self.start_y.take().is_none() {
            return GestureOutcome::Ignored;
        }
        let pulled = self.offset.abs();
        self.offset = 0.0;
        if pulled > self.threshold {
            self.open = !self.open;
            if self.open {
                GestureOutcome::Opened
            } else {
                GestureOutcome::Closed
            }
        } else {
            GestureOutcome::SnappedBack
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.start_y = None;
        self.offset = 0.0;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.start_y = None;
        self.offset = 0.0;
    }

    fn resist(&self, distance: f64) -> f64 {
        distance.powf(self.resistance)
    }
}
