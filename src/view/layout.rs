/// CSS size for the canvas so it fills the window without changing its
/// aspect ratio. Returns `(width, height)` in CSS pixels.
pub fn fit_canvas(window_width: f64, window_height: f64, canvas_width: f64, canvas_height: f64) -> (f64, f64) {
    if window_width <= 0.0 || window_height <= 0.0 || canvas_width <= 0.0 || canvas_height <= 0.0 {
        return (canvas_width.max(0.0), canvas_height.max(0.0));
    }
    let window_ratio = window_width / window_height;
    let ratio = canvas_width / canvas_height;
    if window_ratio < ratio {
        // narrower than the canvas: bars above and below
        (window_width, window_width / ratio)
    } else {
        (window_height * ratio, window_height)
    }
}

/// Logical canvas coordinates of a point given in CSS pixels relative to the
/// canvas' top-left corner.
pub fn css_to_canvas(css: (f64, f64), css_size: (f64, f64), canvas_size: (f64, f64)) -> (f64, f64) {
    let sx = if css_size.0 > 0.0 { canvas_size.0 / css_size.0 } else { 1.0 };
    let sy = if css_size.1 > 0.0 { canvas_size.1 / css_size.1 } else { 1.0 };
    (css.0 * sx, css.1 * sy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tall_window_matches_width() {
        assert_eq!(fit_canvas(960.0, 1000.0, 1920.0, 1080.0), (960.0, 540.0));
    }

    #[test]
    fn test_wide_window_matches_height() {
        assert_eq!(fit_canvas(3000.0, 540.0, 1920.0, 1080.0), (960.0, 540.0));
    }

    #[test]
    fn test_same_ratio_fills_window() {
        assert_eq!(fit_canvas(1280.0, 720.0, 1920.0, 1080.0), (1280.0, 720.0));
    }

    #[test]
    fn test_degenerate_window_keeps_canvas_size() {
        assert_eq!(fit_canvas(0.0, 720.0, 1920.0, 1080.0), (1920.0, 1080.0));
    }

    #[test]
    fn test_css_to_canvas_scales() {
        assert_eq!(css_to_canvas((480.0, 270.0), (960.0, 540.0), (1920.0, 1080.0)), (960.0, 540.0));
    }
}
