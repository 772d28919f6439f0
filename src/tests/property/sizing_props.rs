//! Property-based tests for composer sizing
//!
//! Tests invariants:
//! - Width always lies within [min, max]
//! - Text narrower than the minimum pins the width to the minimum
//! - Text wider than the maximum pins the width to the maximum
//! - Height never exceeds the cap, and scrolling is on exactly when the
//!   natural height is above it

use proptest::prelude::*;

use crate::core::sizing::{compute_box_size, scroll_height, CellMetrics, Overflow, SizingBounds};

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9 ]{0,80}", 0..20).prop_map(|lines| lines.join("\n"))
}

fn arb_metrics() -> impl Strategy<Value = CellMetrics> {
    (4u32..20, 8u32..40).prop_map(|(w, h)| CellMetrics::new(w, h))
}

proptest! {
    /// Property: width is clamped to the bounds
    #[test]
    fn prop_width_within_bounds(
        text in arb_text(),
        placeholder in "[a-z ]{0,40}",
        metrics in arb_metrics(),
    ) {
        let bounds = SizingBounds::default();
        let size = compute_box_size(&text, &placeholder, &metrics, &bounds);
        prop_assert!(size.width >= bounds.min_width);
        prop_assert!(size.width <= bounds.max_width);
    }

    /// Property: text narrower than the minimum gives exactly the minimum
    #[test]
    fn prop_narrow_text_is_min_width(text in "[a-z]{1,50}") {
        // 50 columns * 8 px + 20 padding = 420 < 500
        let size = compute_box_size(&text, "", &CellMetrics::new(8, 16), &SizingBounds::default());
        prop_assert_eq!(size.width, 500);
    }

    /// Property: text wider than the maximum gives exactly the maximum
    #[test]
    fn prop_wide_text_is_max_width(text in "[a-z]{123,400}") {
        // 123 columns * 8 px + 20 padding = 1004 > 1000
        let size = compute_box_size(&text, "", &CellMetrics::new(8, 16), &SizingBounds::default());
        prop_assert_eq!(size.width, 1000);
    }

    /// Property: height is capped and overflow tracks the natural height
    #[test]
    fn prop_height_cap_and_overflow(text in arb_text(), metrics in arb_metrics()) {
        let bounds = SizingBounds::default();
        let size = compute_box_size(&text, "", &metrics, &bounds);
        let natural = scroll_height(&text, size.width - bounds.padding, &metrics);

        prop_assert!(size.height <= bounds.max_height);
        if natural > bounds.max_height {
            prop_assert_eq!(size.overflow, Overflow::Scroll);
            prop_assert_eq!(size.height, bounds.max_height);
        } else {
            prop_assert_eq!(size.overflow, Overflow::Hidden);
            prop_assert_eq!(size.height, natural);
        }
    }

    /// Property: the placeholder never affects height
    #[test]
    fn prop_placeholder_does_not_add_height(placeholder in "[a-z ]{0,300}") {
        let metrics = CellMetrics::new(8, 16);
        let size = compute_box_size("", &placeholder, &metrics, &SizingBounds::default());
        prop_assert_eq!(size.height, metrics.height_px);
    }
}
