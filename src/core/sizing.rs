//! Composer sizing.
//!
//! Computes the on-screen box for the message composer from its pending
//! text: width follows the rendered text width (clamped), height follows the
//! wrapped content height (capped, scrolling past the cap).
//!
//! All values are in pixels. The terminal front-end converts them to cells
//! through [`CellMetrics`].

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use super::wrap::wrap_text;

// ============================================================================
// Types
// ============================================================================

/// Measures how text renders in the composer's font.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels. Multi-line text measures as its
    /// widest line.
    fn text_width(&self, text: &str) -> u32;

    /// Height of one rendered line in pixels.
    fn line_height(&self) -> u32;

    /// Width of a single character cell in pixels, used to turn a pixel
    /// width back into a wrap column count.
    fn cell_width(&self) -> u32;
}

/// Pixel size of one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub width_px: u32,
    pub height_px: u32,
}

impl CellMetrics {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px: width_px.max(1),
            height_px: height_px.max(1),
        }
    }

    /// Query the terminal for its pixel geometry.
    ///
    /// Many terminals report zero pixel dimensions; `fallback` is used then.
    pub fn detect(fallback: CellMetrics) -> Self {
        match crossterm::terminal::window_size() {
            Ok(size) if size.width > 0 && size.height > 0 && size.columns > 0 && size.rows > 0 => {
                let metrics = Self::new(
                    u32::from(size.width) / u32::from(size.columns),
                    u32::from(size.height) / u32::from(size.rows),
                );
                log::debug!("Terminal cell metrics: {metrics:?}");
                metrics
            }
            Ok(_) => fallback,
            Err(e) => {
                log::debug!("window_size unavailable ({e}), using configured cell metrics");
                fallback
            }
        }
    }

    /// Pixel width to whole columns, rounding up.
    pub fn px_to_columns(&self, px: u32) -> u16 {
        let cols = px.div_ceil(self.width_px);
        u16::try_from(cols).unwrap_or(u16::MAX)
    }

    /// Pixel height to whole rows, rounding down, never less than one.
    pub fn px_to_rows(&self, px: u32) -> u16 {
        let rows = (px / self.height_px).max(1);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

impl TextMeasure for CellMetrics {
    fn text_width(&self, text: &str) -> u32 {
        let widest = text.split('\n').map(UnicodeWidthStr::width).max().unwrap_or(0);
        u32::try_from(widest)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.width_px)
    }

    fn line_height(&self) -> u32 {
        self.height_px
    }

    fn cell_width(&self) -> u32 {
        self.width_px
    }
}

/// Size limits for the composer box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingBounds {
    pub min_width: u32,
    pub max_width: u32,
    /// Added to the measured text width.
    pub padding: u32,
    /// Height beyond which the composer scrolls internally.
    pub max_height: u32,
}

impl Default for SizingBounds {
    fn default() -> Self {
        Self {
            min_width: 500,
            max_width: 1000,
            padding: 20,
            max_height: 200,
        }
    }
}

/// Whether the composer shows all of its content or scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Hidden,
    Scroll,
}

/// Computed composer box, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
    pub overflow: Overflow,
}

// ============================================================================
// Computation
// ============================================================================

/// Compute the composer box for `text`.
///
/// An empty `text` is measured through `placeholder` so the box never
/// shrinks below the placeholder's width. Height always follows `text`.
pub fn compute_box_size(
    text: &str,
    placeholder: &str,
    measure: &impl TextMeasure,
    bounds: &SizingBounds,
) -> BoxSize {
    let measured = if text.is_empty() { placeholder } else { text };
    let max_width = bounds.max_width.max(bounds.min_width);
    let width = measure
        .text_width(measured)
        .saturating_add(bounds.padding)
        .clamp(bounds.min_width, max_width);

    let natural = scroll_height(text, width.saturating_sub(bounds.padding), measure);
    if natural > bounds.max_height {
        BoxSize {
            width,
            height: bounds.max_height,
            overflow: Overflow::Scroll,
        }
    } else {
        BoxSize {
            width,
            height: natural,
            overflow: Overflow::Hidden,
        }
    }
}

/// Natural content height of `text` wrapped to `inner_width` pixels.
pub fn scroll_height(text: &str, inner_width: u32, measure: &impl TextMeasure) -> u32 {
    let columns = (inner_width / measure.cell_width().max(1)).max(1) as usize;
    let lines = wrap_text(text, columns).len().max(1);
    u32::try_from(lines)
        .unwrap_or(u32::MAX)
        .saturating_mul(measure.line_height())
}
