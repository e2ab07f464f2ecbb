//! Viewport membership tests and the sticky-position formula
//!
//! All positions are on the virtual vertical axis. `horizontal` is the width
//! of the horizontal gaps already passed, which pushes every later element
//! further down that axis.

use crate::child::{Bounding, StickyBounding};

/// Scroll context a membership test is evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub current: f64,
    pub horizontal: f64,
    pub window_height: f64,
}

/// Any part of the element overlaps the viewport
pub fn in_view(bounding: Bounding, probe: Probe) -> bool {
    let init = (bounding.top + probe.horizontal).ceil();
    let last = (init + bounding.height).ceil();
    probe.current + probe.window_height > init && probe.current < last
}

/// The viewport overlaps the element widened by `scroll_offset` on both ends
pub fn in_scroll(bounding: Bounding, scroll_offset: f64, probe: Probe) -> bool {
    let init = (bounding.top + probe.horizontal).ceil();
    let last = (init + bounding.height).ceil();
    probe.current + probe.window_height > init - scroll_offset
        && probe.current < last + scroll_offset
}

/// Like `in_view`, with the element start pushed down by `offset × height`
///
/// Without an offset this is `in_view`.
pub fn in_offset(bounding: Bounding, offset: Option<f64>, probe: Probe) -> bool {
    let offset = match offset {
        Some(o) if o != 0.0 => o,
        _ => return in_view(bounding, probe),
    };
    let init = (bounding.top + probe.horizontal + offset * bounding.height).ceil();
    let last = (init + bounding.height).ceil();
    probe.current + probe.window_height > init && probe.current < last
}

/// Vertical translation of a sticky child
///
/// Follows the scroll until `top`, holds at `top` for the span of its
/// content, then follows again.
pub fn sticky_position(current: f64, sticky: StickyBounding) -> f64 {
    let release = sticky.bottom - sticky.height;
    if current < sticky.top {
        current
    } else if current < release {
        sticky.top
    } else {
        sticky.top + (current - release)
    }
}

/// Vertical progress of an element through the screen, in [0, 1]
pub fn scroll_progress_y(y: f64, bounding: Bounding, screen_height: f64) -> f64 {
    let span = bounding.height + screen_height;
    if span <= 0.0 {
        return 0.0;
    }
    ((y - (bounding.top - screen_height)) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(current: f64) -> Probe {
        Probe {
            current,
            horizontal: 0.0,
            window_height: 800.0,
        }
    }

    const BOX: Bounding = Bounding {
        top: 1000.0,
        height: 400.0,
    };

    #[test]
    fn test_sticky_boundaries() {
        let sticky = StickyBounding {
            top: 100.0,
            bottom: 500.0,
            height: 80.0,
        };
        assert_eq!(sticky_position(50.0, sticky), 50.0);
        assert_eq!(sticky_position(150.0, sticky), 100.0);
        assert_eq!(sticky_position(419.0, sticky), 100.0);
        assert_eq!(sticky_position(420.0, sticky), 100.0);
        assert_eq!(sticky_position(450.0, sticky), 130.0);
    }

    #[test]
    fn test_in_view_edges() {
        // Viewport bottom exactly at the element top is not yet in view
        assert!(!in_view(BOX, probe(200.0)));
        assert!(in_view(BOX, probe(201.0)));
        assert!(in_view(BOX, probe(1399.0)));
        assert!(!in_view(BOX, probe(1400.0)));
    }

    #[test]
    fn test_horizontal_offset_pushes_elements_down() {
        let mut p = probe(700.0);
        assert!(in_view(BOX, p));
        p.horizontal = 500.0;
        assert!(!in_view(BOX, p));
    }

    #[test]
    fn test_in_scroll_adds_margin() {
        assert!(!in_view(BOX, probe(150.0)));
        assert!(in_scroll(BOX, 100.0, probe(150.0)));
        assert!(in_scroll(BOX, 100.0, probe(1450.0)));
        assert!(!in_scroll(BOX, 100.0, probe(1500.0)));
    }

    #[test]
    fn test_in_offset() {
        // Half the element must pass the viewport bottom
        assert!(in_view(BOX, probe(300.0)));
        assert!(!in_offset(BOX, Some(0.5), probe(300.0)));
        assert!(in_offset(BOX, Some(0.5), probe(401.0)));
        assert_eq!(in_offset(BOX, None, probe(300.0)), in_view(BOX, probe(300.0)));
    }

    #[test]
    fn test_scroll_progress_y_clamped() {
        assert_eq!(scroll_progress_y(0.0, BOX, 800.0), 0.0);
        assert_eq!(scroll_progress_y(5000.0, BOX, 800.0), 1.0);
        assert!((scroll_progress_y(800.0, BOX, 800.0) - 600.0 / 1200.0).abs() < 1e-9);
    }
}
