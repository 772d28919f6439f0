//! Chat view: message list, composer and send button.
//!
//! Owns the single in-flight exchange. Reply events carry the request id
//! that produced them; events for any other request are dropped.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Alignment,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::core::client::ReplyEvent;

use super::super::events::{NotificationLevel, RequestId};
use super::super::layout::AppLayout;
use super::super::services::Services;
use super::super::theme;
use super::super::widgets::composer::{Composer, ComposerOutcome};
use super::super::widgets::message_list::MessageList;

/// The exchange currently waiting on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReply {
    request: RequestId,
    /// Bot bubble, once the server accepted the request.
    bubble: Option<Uuid>,
}

pub struct ChatState {
    composer: Composer,
    messages: MessageList,
    pending: Option<PendingReply>,
}

impl ChatState {
    pub fn new(composer: Composer, bot_name: impl Into<String>) -> Self {
        Self {
            composer,
            messages: MessageList::new(bot_name),
            pending: None,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageList {
        &mut self.messages
    }

    pub fn is_streaming(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.map(|p| p.request)
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Take the trimmed composer text as a new user bubble.
    ///
    /// Empty or whitespace-only input yields `None` and changes nothing.
    pub fn take_submission(&mut self) -> Option<String> {
        let message = self.composer.take_message()?;
        self.messages.push_user(message.as_str());
        self.messages.scroll_to_bottom();
        Some(message)
    }

    /// Submit the composer text and start one exchange.
    ///
    /// Refused while another reply is in flight; the text stays put.
    pub fn submit(&mut self, services: &Services) -> Option<RequestId> {
        if self.pending.is_some() {
            if self.composer.has_message() {
                services.notify(
                    "Still waiting for the previous reply",
                    NotificationLevel::Warning,
                );
            }
            return None;
        }

        let message = self.take_submission()?;
        let request = Uuid::new_v4();
        log::info!("Submitting message {request} ({} chars)", message.len());

        self.pending = Some(PendingReply {
            request,
            bubble: None,
        });
        services.dispatch(request, message);
        Some(request)
    }

    // ── Reply handling (called by AppState) ──────────────────────────

    pub fn on_reply(&mut self, request: RequestId, event: ReplyEvent) {
        let Some(pending) = self.pending.as_mut().filter(|p| p.request == request) else {
            log::debug!("Dropping reply event for stale request {request}");
            return;
        };

        match event {
            ReplyEvent::Opened => {
                pending.bubble = Some(self.messages.open_bot());
            }
            ReplyEvent::Fragment(text) => {
                let bubble = *pending.bubble.get_or_insert_with(|| self.messages.open_bot());
                self.messages.append(bubble, &text);
            }
            ReplyEvent::Rejected(text) => {
                pending.bubble = Some(self.messages.push_bot_text(text, true));
            }
            ReplyEvent::Finished => {
                if let Some(bubble) = pending.bubble {
                    self.messages.finish(bubble);
                }
                self.pending = None;
            }
        }
    }

    /// Close out a request that failed at the transport level. Returns
    /// whether it was the one in flight.
    pub fn on_reply_failed(&mut self, request: RequestId) -> bool {
        match self.pending {
            Some(pending) if pending.request == request => {
                if let Some(bubble) = pending.bubble {
                    self.messages.finish(bubble);
                }
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Returns true if the key was consumed.
    pub fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &Services,
    ) -> bool {
        match self.composer.handle_key(code, modifiers) {
            ComposerOutcome::Submit => {
                self.submit(services);
                true
            }
            ComposerOutcome::Edited => true,
            ComposerOutcome::Ignored => false,
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, layout: &AppLayout) {
        self.messages.render(frame, layout.messages);
        self.composer
            .render(frame, layout.composer, self.is_streaming());
        self.render_send_button(frame, layout);
    }

    fn render_send_button(&self, frame: &mut Frame, layout: &AppLayout) {
        let area = layout.send_button;
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (style, border) = if self.is_streaming() {
            (theme::send_button_busy(), theme::border_default())
        } else {
            (theme::send_button(), theme::border_focused())
        };

        let button = Paragraph::new(Line::styled("Send", style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border));
        frame.render_widget(button, area);
    }
}
