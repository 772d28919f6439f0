use uuid::Uuid;

use crate::core::client::ReplyEvent;

/// Identifies one submitted message and the reply it produced.
pub type RequestId = Uuid;

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick for notification TTLs.
    Tick,
    /// Raw terminal input (keyboard/mouse/paste/resize).
    Input(crossterm::event::Event),
    /// Progress of the exchange started by `request`.
    Reply {
        request: RequestId,
        event: ReplyEvent,
    },
    /// The exchange started by `request` failed at the transport level.
    ReplyFailed { request: RequestId, error: String },
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// High-level actions resolved from input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Submit,
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollTop,
    ScrollBottom,
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            id: 0,
            message: message.into(),
            level,
            ttl_ticks: 100,
        }
    }
}
