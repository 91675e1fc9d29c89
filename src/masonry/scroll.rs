//! Scroll trigger and throttle.

use super::viewport::{Viewport, scroll_threshold};
use std::time::Duration;
use web_time::Instant;

/// What the host reports on a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub document_height: f64,
}

/// True when the bottom of the viewport is within the class-dependent
/// threshold of the document end.
pub fn near_bottom(metrics: ScrollMetrics, viewport: Viewport) -> bool {
    metrics.scroll_y + viewport.height > metrics.document_height - scroll_threshold(viewport)
}

/// Drops evaluations closer together than the configured interval.
#[derive(Debug, Clone)]
pub struct ScrollThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ScrollThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true and records `now` when enough time has passed.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_drops_events_inside_interval() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(120));
        let t0 = Instant::now();
        assert!(throttle.ready(t0));
        assert!(!throttle.ready(t0 + Duration::from_millis(50)));
        assert!(!throttle.ready(t0 + Duration::from_millis(119)));
        assert!(throttle.ready(t0 + Duration::from_millis(120)));
        assert!(!throttle.ready(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn throttle_reset_allows_immediate_event() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(120));
        let t0 = Instant::now();
        assert!(throttle.ready(t0));
        throttle.reset();
        assert!(throttle.ready(t0));
    }

    #[test]
    fn near_bottom_uses_device_threshold() {
        // wide desktop: threshold = 0.3 * 1000 = 300
        let vp = Viewport::new(1920.0, 1000.0);
        let far = ScrollMetrics {
            scroll_y: 0.0,
            document_height: 5000.0,
        };
        assert!(!near_bottom(far, vp));
        let close = ScrollMetrics {
            scroll_y: 3750.0,
            document_height: 5000.0,
        };
        assert!(near_bottom(close, vp));
    }
}
