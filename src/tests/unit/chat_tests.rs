//! Chat View Tests
//!
//! Drives `ChatState` against a mocked chat endpoint:
//! - Submission creates one user bubble and one request
//! - Streamed fragments land in one bot bubble
//! - Empty input sends nothing
//! - Submissions are refused while a reply is in flight
//! - Error statuses and transport failures

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::client::{ChatClient, ChatEndpoint, ReplyEvent};
use crate::core::sizing::{CellMetrics, SizingBounds};
use crate::tui::events::{AppEvent, NotificationLevel, RequestId};
use crate::tui::services::Services;
use crate::tui::views::chat::ChatState;
use crate::tui::widgets::composer::Composer;
use crate::tui::widgets::message_list::Author;

fn setup(server_uri: &str) -> (ChatState, Services, mpsc::UnboundedReceiver<AppEvent>) {
    let endpoint =
        ChatEndpoint::from_page_url(&format!("{server_uri}/chat/chatbot2"), "/api/chat/{bot}")
            .unwrap();
    let client = ChatClient::new(endpoint, Client::new(), None);
    let (tx, rx) = mpsc::unbounded_channel();
    let services = Services::new(client, tx);
    let composer = Composer::new("Type here", SizingBounds::default(), CellMetrics::default());
    let chat = ChatState::new(composer, services.bot_name().to_string());
    (chat, services, rx)
}

/// Feed reply events into `chat` until `request` completes. Returns the
/// other events seen on the way, plus the transport error if it failed.
async fn drive(
    chat: &mut ChatState,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    request: RequestId,
) -> (Vec<AppEvent>, Option<String>) {
    let mut others = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for reply")
            .expect("channel closed");
        match event {
            AppEvent::Reply { request: r, event } => {
                let done = r == request && event == ReplyEvent::Finished;
                chat.on_reply(r, event);
                if done {
                    return (others, None);
                }
            }
            AppEvent::ReplyFailed { request: r, error } => {
                assert!(chat.on_reply_failed(r));
                return (others, Some(error));
            }
            other => others.push(other),
        }
    }
}

#[tokio::test]
async fn test_submit_streams_into_bot_bubble() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/chatbot2"))
        .and(body_json(json!({ "message": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"{\"content\":\"Hel\"}\n{\"content\":\"lo!\"}".to_vec(),
            "application/x-ndjson",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut chat, services, mut rx) = setup(&mock_server.uri());
    chat.handle_paste("  hello  ");

    let request = chat.submit(&services).expect("request started");
    assert!(chat.is_streaming());
    assert_eq!(chat.composer().text(), "");

    let (others, error) = drive(&mut chat, &mut rx, request).await;
    assert!(others.is_empty());
    assert!(error.is_none());
    assert!(!chat.is_streaming());

    let bubbles = chat.messages().bubbles();
    assert_eq!(bubbles.len(), 2);
    assert_eq!(bubbles[0].author, Author::User);
    assert_eq!(bubbles[0].text, "hello");
    assert_eq!(bubbles[1].author, Author::Bot);
    assert_eq!(bubbles[1].text, "Hello!");
    assert!(!bubbles[1].streaming);
}

#[tokio::test]
async fn test_whitespace_submission_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (mut chat, services, _rx) = setup(&mock_server.uri());
    chat.handle_paste("   \n  ");

    assert!(chat.submit(&services).is_none());
    assert!(chat.messages().is_empty());
    assert!(!chat.is_streaming());
}

#[tokio::test]
async fn test_second_submission_refused_while_in_flight() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"{\"content\":\"first\"}\n".to_vec(), "application/x-ndjson")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut chat, services, mut rx) = setup(&mock_server.uri());
    chat.handle_paste("one");
    let request = chat.submit(&services).expect("request started");

    chat.handle_paste("two");
    assert!(chat.submit(&services).is_none());
    assert_eq!(chat.composer().text(), "two");
    assert_eq!(chat.messages().len(), 1);

    let (others, _) = drive(&mut chat, &mut rx, request).await;
    assert!(others.iter().any(|e| matches!(
        e,
        AppEvent::Notification(n) if n.level == NotificationLevel::Warning
    )));

    assert!(!chat.is_streaming());
    assert_eq!(chat.composer().text(), "two");
    assert_eq!(chat.messages().bubbles()[1].text, "first");
}

#[tokio::test]
async fn test_error_status_becomes_bot_bubble() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "error": "rate limited" })),
        )
        .mount(&mock_server)
        .await;

    let (mut chat, services, mut rx) = setup(&mock_server.uri());
    chat.handle_paste("hi");
    let request = chat.submit(&services).expect("request started");
    drive(&mut chat, &mut rx, request).await;

    let bot = &chat.messages().bubbles()[1];
    assert_eq!(bot.text, "Error: rate limited");
    assert!(bot.is_error);
}

#[tokio::test]
async fn test_transport_failure_adds_no_bubble() {
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let (mut chat, services, mut rx) = setup(&uri);
    chat.handle_paste("anyone there?");
    let request = chat.submit(&services).expect("request started");

    let (_, error) = drive(&mut chat, &mut rx, request).await;
    assert!(error.is_some());
    assert!(!chat.is_streaming());
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages().bubbles()[0].author, Author::User);
}
