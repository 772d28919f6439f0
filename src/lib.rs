//! chatbot-tui - terminal chat client for a streaming chatbot endpoint
//!
//! Auto-sizing composer, newline-delimited JSON reply streaming, and a
//! scrolling message list.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
