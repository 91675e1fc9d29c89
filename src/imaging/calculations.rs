//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` down to fit inside a `max_edge` square, keeping the aspect
/// ratio. Images that already fit are returned unchanged (never enlarged).
/// No dimension is ever rounded down to zero.
///
/// # Examples
/// ```
/// # use masonry_gal::imaging::fit_inside;
/// // landscape: long edge becomes 400
/// assert_eq!(fit_inside((4000, 3000), 400), (400, 300));
///
/// // portrait
/// assert_eq!(fit_inside((1080, 1920), 400), (225, 400));
///
/// // small images stay as they are
/// assert_eq!(fit_inside((320, 200), 400), (320, 200));
/// ```
pub fn fit_inside(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    let long = w.max(h);
    if long <= max_edge || long == 0 {
        return (w, h);
    }
    let scale = f64::from(max_edge) / f64::from(long);
    let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    if w >= h {
        (max_edge, scaled(h))
    } else {
        (scaled(w), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_fits_long_edge() {
        assert_eq!(fit_inside((4000, 3000), 400), (400, 300));
    }

    #[test]
    fn portrait_fits_long_edge() {
        assert_eq!(fit_inside((3000, 4000), 400), (300, 400));
    }

    #[test]
    fn square_fits_exactly() {
        assert_eq!(fit_inside((1000, 1000), 400), (400, 400));
    }

    #[test]
    fn no_enlargement() {
        assert_eq!(fit_inside((200, 100), 400), (200, 100));
        assert_eq!(fit_inside((400, 400), 400), (400, 400));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_inside((10_000, 5), 400), (400, 1));
    }

    #[test]
    fn rounding() {
        // 1920x1080 → 400 x 225
        assert_eq!(fit_inside((1920, 1080), 400), (400, 225));
        // 1000x333 → 400 x 133.2 → 133
        assert_eq!(fit_inside((1000, 333), 400), (400, 133));
    }

    #[test]
    fn zero_size_passes_through() {
        assert_eq!(fit_inside((0, 0), 400), (0, 0));
    }
}
