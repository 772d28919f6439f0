//! Scrolling list of chat bubbles.
//!
//! Bubbles are append-only; a bot bubble grows as reply fragments arrive.
//! The list follows new content until the user scrolls away and resumes
//! once they are back at the bottom.

use std::cell::Cell;

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};
use uuid::Uuid;

use crate::core::wrap::wrap_text;
use crate::tui::theme;

const STREAMING_CURSOR: &str = "▍";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: Uuid,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Local>,
    /// Still receiving fragments.
    pub streaming: bool,
    /// Error reply rendered in the error color.
    pub is_error: bool,
}

impl Bubble {
    fn new(author: Author, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text,
            created_at: Local::now(),
            streaming: false,
            is_error: false,
        }
    }

    fn header(&self, bot_name: &str) -> Line<'static> {
        let (label, color) = match self.author {
            Author::User => ("You", theme::USER),
            Author::Bot if self.is_error => (bot_name, theme::ERROR),
            Author::Bot => (bot_name, theme::BOT),
        };
        Line::from(vec![
            Span::styled(format!("── {label} ──"), theme::bubble_header(color)),
            Span::styled(
                format!(" {}", self.created_at.format("%H:%M")),
                Style::default().fg(theme::TEXT_DIM),
            ),
        ])
    }

    fn lines(&self, bot_name: &str, width: usize) -> Vec<Line<'static>> {
        let body_style = if self.is_error {
            Style::default().fg(theme::ERROR)
        } else {
            Style::default().fg(theme::TEXT)
        };

        let mut out = vec![self.header(bot_name)];
        if !self.text.is_empty() {
            out.extend(
                wrap_text(&self.text, width)
                    .into_iter()
                    .map(|l| Line::styled(l, body_style)),
            );
        }
        if self.streaming {
            let cursor = Span::styled(STREAMING_CURSOR, Style::default().fg(theme::TEXT_MUTED));
            match out.last_mut() {
                Some(last) if !self.text.is_empty() => last.spans.push(cursor),
                _ => out.push(Line::from(cursor)),
            }
        }
        out.push(Line::raw(""));
        out
    }
}

pub struct MessageList {
    bubbles: Vec<Bubble>,
    bot_name: String,
    scroll_offset: usize,
    auto_scroll: bool,
    /// Largest offset seen at the last render, so scrolling clamps to
    /// what is actually on screen.
    last_max_scroll: Cell<usize>,
}

impl MessageList {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bubbles: Vec::new(),
            bot_name: bot_name.into(),
            scroll_offset: 0,
            auto_scroll: true,
            last_max_scroll: Cell::new(0),
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> Uuid {
        self.push(Bubble::new(Author::User, text.into()))
    }

    /// Open an empty bot bubble that will receive fragments.
    pub fn open_bot(&mut self) -> Uuid {
        let mut bubble = Bubble::new(Author::Bot, String::new());
        bubble.streaming = true;
        self.push(bubble)
    }

    /// Add a complete bot bubble.
    pub fn push_bot_text(&mut self, text: impl Into<String>, is_error: bool) -> Uuid {
        let mut bubble = Bubble::new(Author::Bot, text.into());
        bubble.is_error = is_error;
        self.push(bubble)
    }

    /// Append a fragment to bubble `id`. Returns false if it does not exist.
    pub fn append(&mut self, id: Uuid, fragment: &str) -> bool {
        let Some(bubble) = self.find_mut(id) else {
            return false;
        };
        bubble.text.push_str(fragment);
        self.follow();
        true
    }

    /// Stop the streaming cursor on bubble `id`.
    pub fn finish(&mut self, id: Uuid) {
        if let Some(bubble) = self.find_mut(id) {
            bubble.streaming = false;
        }
    }

    fn push(&mut self, bubble: Bubble) -> Uuid {
        let id = bubble.id;
        self.bubbles.push(bubble);
        self.follow();
        id
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().rev().find(|b| b.id == id)
    }

    fn follow(&mut self) {
        if self.auto_scroll {
            self.scroll_to_bottom();
        }
    }

    // ── Scrolling ────────────────────────────────────────────────────

    pub fn is_following(&self) -> bool {
        self.auto_scroll
    }

    pub fn scroll_up(&mut self, n: usize) {
        let current = if self.auto_scroll {
            self.last_max_scroll.get()
        } else {
            self.scroll_offset
        };
        self.scroll_offset = current.saturating_sub(n);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, n: usize) {
        if self.auto_scroll {
            return;
        }
        self.scroll_offset = self.scroll_offset.saturating_add(n);
        if self.scroll_offset >= self.last_max_scroll.get() {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.last_max_scroll.get();
        self.auto_scroll = true;
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_default())
            .title(format!(" Chat with {} ", self.bot_name));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.bubbles.is_empty() {
            let welcome = Paragraph::new(vec![
                Line::raw(""),
                Line::styled(
                    format!("  You are chatting with {}", self.bot_name),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::raw(""),
                Line::styled(
                    "  Type a message and press Enter to send.",
                    theme::muted(),
                ),
                Line::styled(
                    "  Shift+Enter adds a new line.",
                    theme::muted(),
                ),
            ]);
            frame.render_widget(welcome, inner);
            return;
        }

        // One column is kept free for the scrollbar
        let text_width = inner.width.saturating_sub(1).max(1) as usize;
        let all_lines: Vec<Line> = self
            .bubbles
            .iter()
            .flat_map(|b| b.lines(&self.bot_name, text_width))
            .collect();

        let visible_height = inner.height as usize;
        let total = all_lines.len();

        let max_scroll = total.saturating_sub(visible_height);
        self.last_max_scroll.set(max_scroll);
        let effective_scroll = if self.auto_scroll {
            max_scroll
        } else {
            self.scroll_offset.min(max_scroll)
        };

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(effective_scroll)
            .take(visible_height)
            .collect();
        frame.render_widget(Paragraph::new(visible), inner);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(total)
                .position(effective_scroll)
                .viewport_content_length(visible_height);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut scrollbar_state,
            );
        }

        if !self.auto_scroll && effective_scroll < max_scroll {
            let indicator = Line::styled(
                " ↓ new messages below ",
                Style::default()
                    .fg(theme::BG_BASE)
                    .bg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            );
            let indicator_area = Rect::new(
                inner.x + inner.width.saturating_sub(24),
                inner.y + inner.height.saturating_sub(1),
                24.min(inner.width),
                1,
            );
            frame.render_widget(Paragraph::new(indicator), indicator_area);
        }
    }
}
