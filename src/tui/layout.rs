//! Root layout: message list, composer row (composer + send button), status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Width of the send button including its border.
pub const SEND_BUTTON_WIDTH: u16 = 8;
/// Height of the send button including its border.
pub const SEND_BUTTON_HEIGHT: u16 = 3;
/// Gap between composer and send button.
const BUTTON_GAP: u16 = 1;

/// Computed layout regions for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub messages: Rect,
    pub composer: Rect,
    pub send_button: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    /// Compute regions for a composer whose text area wants
    /// `composer_cols` × `composer_rows` cells (borders excluded).
    ///
    /// The composer row is centered and clipped to the terminal; the message
    /// list always keeps at least one row.
    pub fn compute(area: Rect, composer_cols: u16, composer_rows: u16) -> Self {
        let band_height = composer_rows
            .saturating_add(2)
            .max(SEND_BUTTON_HEIGHT)
            .min(area.height.saturating_sub(2).max(1));

        let rows = Layout::vertical([
            Constraint::Min(1),              // Messages
            Constraint::Length(band_height), // Composer + send button
            Constraint::Length(1),           // Status bar
        ])
        .split(area);

        let messages = rows[0];
        let band = rows[1];
        let status = rows[2];

        let button_room = SEND_BUTTON_WIDTH + BUTTON_GAP;
        let box_width = composer_cols
            .saturating_add(2)
            .min(band.width.saturating_sub(button_room));
        let total = (box_width + button_room).min(band.width);
        let x = band.x + (band.width - total) / 2;

        let composer = Rect::new(x, band.y, box_width, band.height);
        let button_height = SEND_BUTTON_HEIGHT.min(band.height);
        let send_button = Rect::new(
            x + box_width + BUTTON_GAP.min(band.width.saturating_sub(box_width)),
            band.y + band.height - button_height,
            SEND_BUTTON_WIDTH.min(band.width.saturating_sub(box_width + BUTTON_GAP)),
            button_height,
        );

        AppLayout {
            messages,
            composer,
            send_button,
            status,
        }
    }
}

/// Whether the cell at (`column`, `row`) lies inside `rect`.
pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
