//! Color theme for the chat widget.
//!
//! All color constants are RGB truecolor. Widgets import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ─────────────────────────────────────────────────────────────────

/// Teal — focused borders, bot bubbles.
pub const PRIMARY: Color = Color::Rgb(0x00, 0x80, 0x80);
/// Light teal — streaming indicator, hints.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x00, 0x96, 0x88);
/// Coral — send button, calls to action.
pub const ACCENT: Color = Color::Rgb(0xFF, 0x7F, 0x50);

/// Charcoal — base background.
pub const BG_BASE: Color = Color::Rgb(0x0A, 0x19, 0x19);

/// Primary text.
pub const TEXT: Color = Color::Rgb(0xE0, 0xE0, 0xE0);
/// Muted text — placeholder, secondary labels.
pub const TEXT_MUTED: Color = Color::Rgb(0x80, 0x80, 0x80);
/// Dim text — key hints.
pub const TEXT_DIM: Color = Color::Rgb(0x50, 0x50, 0x50);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

/// User bubble header.
pub const USER: Color = Color::Rgb(0x66, 0xBB, 0x6A);
/// Bot bubble header.
pub const BOT: Color = PRIMARY_LIGHT;

// ── Style helpers ───────────────────────────────────────────────────────────

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

/// Key hint style (e.g., "Enter:send").
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Send button, idle.
pub fn send_button() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Send button while a reply is streaming.
pub fn send_button_busy() -> Style {
    Style::default().fg(TEXT_MUTED).bg(TEXT_DIM)
}

/// Bubble header for the given author color.
pub fn bubble_header(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
