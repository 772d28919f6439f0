//! Auto-sizing message composer.
//!
//! Every edit re-runs [`compute_box_size`]; the pixel box is converted to
//! cells for layout. Past the height cap the composer scrolls to keep the
//! cursor line in view.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::sizing::{compute_box_size, BoxSize, CellMetrics, Overflow, SizingBounds};
use crate::core::wrap::{wrap_ranges, wrap_text};
use crate::tui::theme;

use super::input_buffer::InputBuffer;

/// What a key press did to the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerOutcome {
    /// Text or cursor changed.
    Edited,
    /// Enter without Shift: the caller should submit.
    Submit,
    /// Not a composer key.
    Ignored,
}

pub struct Composer {
    input: InputBuffer,
    placeholder: String,
    bounds: SizingBounds,
    metrics: CellMetrics,
    size: BoxSize,
}

impl Composer {
    pub fn new(placeholder: impl Into<String>, bounds: SizingBounds, metrics: CellMetrics) -> Self {
        let mut composer = Self {
            input: InputBuffer::new(),
            placeholder: placeholder.into(),
            bounds,
            metrics,
            size: BoxSize {
                width: bounds.min_width,
                height: metrics.height_px,
                overflow: Overflow::Hidden,
            },
        };
        composer.resize();
        composer
    }

    /// Recompute the box from the current text.
    pub fn resize(&mut self) {
        self.size = compute_box_size(
            self.input.text(),
            &self.placeholder,
            &self.metrics,
            &self.bounds,
        );
    }

    pub fn size(&self) -> BoxSize {
        self.size
    }

    /// Text area size in cells (borders excluded).
    pub fn cells(&self) -> (u16, u16) {
        (
            self.metrics.px_to_columns(self.size.width),
            self.metrics.px_to_rows(self.size.height),
        )
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn has_message(&self) -> bool {
        !self.input.is_empty()
    }

    /// Trimmed text if there is any, clearing the composer and resizing.
    /// Whitespace-only text is left untouched.
    pub fn take_message(&mut self) -> Option<String> {
        let message = self.input.text().trim();
        if message.is_empty() {
            return None;
        }
        let message = message.to_string();
        self.input.clear();
        self.resize();
        Some(message)
    }

    pub fn insert_str(&mut self, text: &str) {
        // Terminals paste with CR line endings
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.input.insert_str(&normalized);
        self.resize();
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> ComposerOutcome {
        let outcome = match (modifiers, code) {
            (m, KeyCode::Enter)
                if m.contains(KeyModifiers::SHIFT) || m.contains(KeyModifiers::ALT) =>
            {
                self.input.insert_char('\n');
                ComposerOutcome::Edited
            }
            (_, KeyCode::Enter) => return ComposerOutcome::Submit,
            (KeyModifiers::CONTROL, KeyCode::Char('j')) => {
                self.input.insert_char('\n');
                ComposerOutcome::Edited
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.input.clear();
                ComposerOutcome::Edited
            }
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.input.move_home();
                ComposerOutcome::Edited
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.input.move_end();
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.input.insert_char(c);
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                self.input.backspace();
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                self.input.delete();
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.input.move_left();
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.input.move_right();
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE, KeyCode::Home) => {
                self.input.move_home();
                ComposerOutcome::Edited
            }
            (KeyModifiers::NONE, KeyCode::End) => {
                self.input.move_end();
                ComposerOutcome::Edited
            }
            _ => ComposerOutcome::Ignored,
        };
        if outcome == ComposerOutcome::Edited {
            self.resize();
        }
        outcome
    }

    /// Cursor position as (line, column) within the wrapped text.
    ///
    /// The cursor sits on the last wrapped line starting at or before it. A
    /// cursor past the last column of a full line moves to the start of the
    /// row below.
    fn cursor_cell(&self, width: usize) -> (usize, usize) {
        let text = self.input.text();
        let cursor = self.input.cursor_position();
        let ranges = wrap_ranges(text, width);
        let line = ranges
            .iter()
            .rposition(|range| range.start <= cursor)
            .unwrap_or(0);
        let column = ranges
            .get(line)
            .map(|range| UnicodeWidthStr::width(&text[range.start..cursor.min(range.end)]))
            .unwrap_or(0);
        if column >= width.max(1) {
            (line + 1, 0)
        } else {
            (line, column)
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, busy: bool) {
        let title = if busy { " Message (waiting for reply) " } else { " Message " };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_focused())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let height = inner.height as usize;

        if self.input.text().is_empty() {
            let lines: Vec<Line> = wrap_text(&self.placeholder, width)
                .into_iter()
                .take(height)
                .map(|l| Line::styled(l, theme::muted()))
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
            frame.set_cursor_position(Position::new(inner.x, inner.y));
            return;
        }

        let all_lines = wrap_text(self.input.text(), width);
        let (cursor_line, cursor_col) = self.cursor_cell(width);
        let offset = cursor_line.saturating_sub(height - 1);

        let visible: Vec<Line> = all_lines
            .iter()
            .skip(offset)
            .take(height)
            .map(|l| Line::styled(l.clone(), Style::default().fg(theme::TEXT)))
            .collect();
        frame.render_widget(Paragraph::new(visible), inner);

        if self.size.overflow == Overflow::Scroll || all_lines.len() > height {
            let mut scrollbar_state = ScrollbarState::new(all_lines.len())
                .position(offset)
                .viewport_content_length(height);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut scrollbar_state,
            );
        }

        frame.set_cursor_position(Position::new(
            inner.x + cursor_col as u16,
            inner.y + (cursor_line - offset) as u16,
        ));
    }
}
