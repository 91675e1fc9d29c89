//! Category filter bar.
//!
//! A flat, horizontally scrolling row of tag buttons: the catch-all button
//! first, then one per category. Exactly one button is active at a time.
//! Button geometry is supplied by the host after layout via
//! [`TagBar::set_layout`]; until then every button sits at offset zero.

use crate::source::ALL_TAG;

#[derive(Debug, Clone, PartialEq)]
pub struct TagButton {
    /// Tag handed to the loader.
    pub value: String,
    pub label: String,
    pub left: f64,
    pub width: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TagBar {
    buttons: Vec<TagButton>,
    container_width: f64,
    scroll_left: f64,
}

impl TagBar {
    /// Build the row. `categories` should already be filtered and sorted
    /// (see [`crate::source::tag_categories`]). The catch-all button starts active.
    pub fn new<S: AsRef<str>>(all_label: &str, categories: &[S]) -> Self {
        let mut buttons = vec![TagButton {
            value: ALL_TAG.to_string(),
            label: all_label.to_string(),
            left: 0.0,
            width: 0.0,
            active: true,
        }];
        buttons.extend(categories.iter().map(|c| TagButton {
            value: c.as_ref().to_string(),
            label: c.as_ref().to_string(),
            left: 0.0,
            width: 0.0,
            active: false,
        }));
        Self {
            buttons,
            container_width: 0.0,
            scroll_left: 0.0,
        }
    }

    pub fn buttons(&self) -> &[TagButton] {
        &self.buttons
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.buttons
            .iter()
            .find(|b| b.active)
            .map(|b| b.value.as_str())
    }

    /// Record measured button widths (in button order) and the gap between them.
    pub fn set_layout(&mut self, container_width: f64, widths: &[f64], gap: f64) {
        self.container_width = container_width;
        let mut left = 0.0;
        for (button, &width) in self.buttons.iter_mut().zip(widths) {
            button.left = left;
            button.width = width;
            left += width + gap;
        }
        self.scroll_left = self.scroll_left.clamp(0.0, self.max_scroll());
    }

    /// Activate the button whose value or label equals `tag` and scroll it to
    /// the middle of the bar.
    ///
    /// Returns the smooth-scroll target, which may fall outside the
    /// scrollable range; the host clamps it. Returns `None` without touching
    /// any state when no button matches.
    pub fn select_tag_by_value(&mut self, tag: &str) -> Option<f64> {
        let index = self
            .buttons
            .iter()
            .position(|b| b.value == tag || b.label == tag)?;
        for (i, button) in self.buttons.iter_mut().enumerate() {
            button.active = i == index;
        }
        let target = self.center_offset(index)?;
        self.scroll_left = target.clamp(0.0, self.max_scroll());
        Some(target)
    }

    /// Scroll offset that centers button `index` in the container.
    fn center_offset(&self, index: usize) -> Option<f64> {
        let button = self.buttons.get(index)?;
        Some(button.left - self.container_width / 2.0 + button.width / 2.0)
    }

    /// Redirect vertical wheel movement into horizontal scrolling.
    /// Returns the new scroll offset.
    pub fn on_wheel(&mut self, delta_y: f64) -> f64 {
        self.scroll_left = (self.scroll_left + delta_y).clamp(0.0, self.max_scroll());
        self.scroll_left
    }

    fn content_width(&self) -> f64 {
        self.buttons
            .last()
            .map(|b| b.left + b.width)
            .unwrap_or(0.0)
    }

    fn max_scroll(&self) -> f64 {
        (self.content_width() - self.container_width).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> TagBar {
        let mut bar = TagBar::new("All", &["Birds", "Cities", "Trees"]);
        // 4 buttons, 100px each, 10px gap: lefts 0, 110, 220, 330; content 430
        bar.set_layout(200.0, &[100.0; 4], 10.0);
        bar
    }

    fn active_labels(bar: &TagBar) -> Vec<&str> {
        bar.buttons()
            .iter()
            .filter(|b| b.active)
            .map(|b| b.label.as_str())
            .collect()
    }

    #[test]
    fn catch_all_comes_first_and_starts_active() {
        let bar = TagBar::new("Everything", &["Birds"]);
        assert_eq!(bar.buttons()[0].value, "all");
        assert_eq!(bar.buttons()[0].label, "Everything");
        assert_eq!(bar.active_tag(), Some("all"));
    }

    #[test]
    fn select_returns_centering_target() {
        let mut bar = bar();
        // 220 - 100 + 50
        assert_eq!(bar.select_tag_by_value("Cities"), Some(170.0));
        assert_eq!(bar.active_tag(), Some("Cities"));
        assert_eq!(bar.scroll_left(), 170.0);
    }

    #[test]
    fn active_state_is_exclusive() {
        let mut bar = bar();
        bar.select_tag_by_value("Birds");
        bar.select_tag_by_value("Trees");
        assert_eq!(active_labels(&bar), vec!["Trees"]);
    }

    #[test]
    fn select_matches_label_too() {
        let mut bar = bar();
        bar.select_tag_by_value("Cities");
        assert!(bar.select_tag_by_value("All").is_some());
        assert_eq!(bar.active_tag(), Some("all"));
    }

    #[test]
    fn target_before_start_is_reported_but_scroll_clamps() {
        let mut bar = bar();
        bar.select_tag_by_value("Birds");
        // 0 - 100 + 50
        assert_eq!(bar.select_tag_by_value("all"), Some(-50.0));
        assert_eq!(bar.scroll_left(), 0.0);
    }

    #[test]
    fn unknown_tag_is_noop() {
        let mut bar = bar();
        bar.select_tag_by_value("Birds");
        let before = bar.scroll_left();
        assert_eq!(bar.select_tag_by_value("Mountains"), None);
        assert_eq!(bar.active_tag(), Some("Birds"));
        assert_eq!(bar.scroll_left(), before);
    }

    #[test]
    fn center_offset_out_of_range_is_none() {
        let bar = bar();
        assert_eq!(bar.center_offset(2), Some(170.0));
        assert_eq!(bar.center_offset(4), None);
        assert_eq!(TagBar::new::<&str>("All", &[]).center_offset(1), None);
    }

    #[test]
    fn wheel_scrolls_horizontally_within_bounds() {
        let mut bar = bar();
        assert_eq!(bar.on_wheel(120.0), 120.0);
        // max scroll is 430 - 200
        assert_eq!(bar.on_wheel(1000.0), 230.0);
        assert_eq!(bar.on_wheel(-5000.0), 0.0);
    }

    #[test]
    fn wheel_without_overflow_stays_put() {
        let mut bar = TagBar::new("All", &["Birds"]);
        bar.set_layout(800.0, &[60.0, 60.0], 8.0);
        assert_eq!(bar.on_wheel(100.0), 0.0);
    }
}
