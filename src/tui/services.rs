use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::core::client::ChatClient;

use super::events::{AppEvent, Notification, NotificationLevel, RequestId};

/// Handle to the chat backend, passed by reference to views.
///
/// Work runs on spawned tasks; results come back through `event_tx`.
pub struct Services {
    pub client: ChatClient,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    pub fn new(client: ChatClient, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { client, event_tx }
    }

    pub fn bot_name(&self) -> &str {
        self.client.endpoint().bot()
    }

    pub fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let _ = self
            .event_tx
            .send(AppEvent::Notification(Notification::new(message, level)));
    }

    /// Run one exchange in the background, forwarding its events tagged
    /// with `request`.
    pub fn dispatch(&self, request: RequestId, message: String) -> JoinHandle<()> {
        let client = self.client.clone();
        let tx = self.event_tx.clone();

        let span = tracing::info_span!("chat_request", %request);
        tokio::spawn(
            async move {
                let result = client
                    .converse(&message, |event| {
                        let _ = tx.send(AppEvent::Reply { request, event });
                    })
                    .await;

                if let Err(e) = result {
                    log::error!("Chat request {request} failed: {e}");
                    let _ = tx.send(AppEvent::ReplyFailed {
                        request,
                        error: e.to_string(),
                    });
                }
            }
            .instrument(span),
        )
    }
}
