use std::io;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, Notification, NotificationLevel};
use super::layout::{contains, AppLayout};
use super::services::Services;
use super::theme;
use super::views::chat::ChatState;

/// Lines moved per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Chat view state.
    pub chat: ChatState,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Terminal area of the last drawn frame, for mouse hit testing.
    viewport: Rect,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        chat: ChatState,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        services: Services,
    ) -> Self {
        Self {
            running: true,
            chat,
            notifications: Vec::new(),
            notification_counter: 0,
            viewport: Rect::default(),
            event_rx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        while self.running {
            // Render
            let frame = terminal.draw(|frame| self.render(frame))?;
            self.viewport = frame.area;

            // Select next event
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::Input(crossterm_event) => {
                if let Some(action) = self.map_input_to_action(&crossterm_event) {
                    self.handle_action(action);
                    return;
                }
                self.dispatch_view_input(&crossterm_event);
            }
            AppEvent::Reply { request, event } => {
                self.chat.on_reply(request, event);
            }
            AppEvent::ReplyFailed { request, error } => {
                if self.chat.on_reply_failed(request) {
                    self.push_notification(
                        format!("Chat request failed: {error}"),
                        NotificationLevel::Warning,
                    );
                }
            }
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    /// Hand input the global bindings did not claim to the chat view.
    fn dispatch_view_input(&mut self, event: &Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => {
                self.chat.handle_key(*code, *modifiers, &self.services);
            }
            Event::Paste(text) => self.chat.handle_paste(text),
            _ => {}
        }
    }

    fn map_input_to_action(&self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.map_key(key),
            Event::Mouse(mouse) => self.map_mouse(mouse),
            _ => None,
        }
    }

    fn map_key(&self, key: &KeyEvent) -> Option<Action> {
        let page = self.page_size();
        match (key.modifiers, key.code) {
            // Ctrl+C / Esc → quit
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            (_, KeyCode::Esc) => Some(Action::Quit),
            // Ctrl+S → send button
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(Action::Submit),
            (KeyModifiers::CONTROL, KeyCode::Home) => Some(Action::ScrollTop),
            (KeyModifiers::CONTROL, KeyCode::End) => Some(Action::ScrollBottom),
            (_, KeyCode::PageUp) => Some(Action::ScrollUp(page)),
            (_, KeyCode::PageDown) => Some(Action::ScrollDown(page)),
            _ => None,
        }
    }

    fn map_mouse(&self, mouse: &MouseEvent) -> Option<Action> {
        let layout = self.layout(self.viewport);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left)
                if contains(layout.send_button, mouse.column, mouse.row) =>
            {
                Some(Action::Submit)
            }
            MouseEventKind::ScrollUp if contains(layout.messages, mouse.column, mouse.row) => {
                Some(Action::ScrollUp(WHEEL_STEP))
            }
            MouseEventKind::ScrollDown if contains(layout.messages, mouse.column, mouse.row) => {
                Some(Action::ScrollDown(WHEEL_STEP))
            }
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Submit => {
                self.chat.submit(&self.services);
            }
            Action::ScrollUp(n) => self.chat.messages_mut().scroll_up(n),
            Action::ScrollDown(n) => self.chat.messages_mut().scroll_down(n),
            Action::ScrollTop => self.chat.messages_mut().scroll_to_top(),
            Action::ScrollBottom => self.chat.messages_mut().scroll_to_bottom(),
        }
    }

    /// Message list rows minus borders.
    fn page_size(&self) -> usize {
        let rows = self.layout(self.viewport).messages.height.saturating_sub(2);
        usize::from(rows.max(1))
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        let mut notification = Notification::new(message, level);
        notification.id = self.notification_counter;
        self.notifications.push(notification);

        while self.notifications.len() > 3 {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn layout(&self, area: Rect) -> AppLayout {
        let (cols, rows) = self.chat.composer().cells();
        AppLayout::compute(area, cols, rows)
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = self.layout(area);

        self.chat.render(frame, &layout);
        self.render_status_bar(frame, layout.status);
        self.render_notifications(frame, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let reply_status = if self.chat.is_streaming() {
            Span::styled("streaming", Style::default().fg(theme::PRIMARY_LIGHT))
        } else {
            Span::styled("ready", Style::default().fg(theme::TEXT_MUTED))
        };

        let status = Line::from(vec![
            Span::styled(" chatbot-tui ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled(
                self.services.bot_name().to_string(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            reply_status,
            Span::raw(" │ "),
            Span::styled("Enter", theme::key_hint()),
            Span::raw(":send "),
            Span::styled("Shift+Enter", theme::key_hint()),
            Span::raw(":newline "),
            Span::styled("PgUp/PgDn", theme::key_hint()),
            Span::raw(":scroll "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = (self.notifications.len() as u16).min(area.height.saturating_sub(1));
        let x = area.width.saturating_sub(max_width + 1);
        let y = 1.min(area.height.saturating_sub(height));

        let notification_area = Rect::new(x, y, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).bold()),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }
}
