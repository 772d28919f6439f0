//! Chat Client Unit Tests
//!
//! Tests for the HTTP side of one exchange:
//! - Request formatting (method, path, JSON body, headers)
//! - Streaming NDJSON replies
//! - Error status rendering
//! - Single-object `answer` replies
//! - Transport failures

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::ServerConfig;
use crate::core::client::{ChatClient, ChatEndpoint, ChatError, ReplyEvent};

fn client_for(server_uri: &str, cookie: Option<String>) -> ChatClient {
    let endpoint =
        ChatEndpoint::from_page_url(&format!("{server_uri}/chat/chatbot1"), "/api/chat/{bot}")
            .unwrap();
    ChatClient::new(endpoint, Client::new(), cookie)
}

async fn converse(client: &ChatClient, message: &str) -> (Vec<ReplyEvent>, Result<(), ChatError>) {
    let mut events = Vec::new();
    let result = client.converse(message, |e| events.push(e)).await;
    (events, result)
}

fn ndjson(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson")
}

// =============================================================================
// Request Formatting Tests
// =============================================================================

#[tokio::test]
async fn test_posts_json_message_to_bot_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/chatbot1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "message": "hello there" })))
        .respond_with(ndjson(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, result) = converse(&client, "hello there").await;

    assert!(result.is_ok());
    assert_eq!(events, vec![ReplyEvent::Opened, ReplyEvent::Finished]);
}

#[tokio::test]
async fn test_session_cookie_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ndjson("{\"content\":\"ok\"}\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Some("session=abc123".to_string()));
    let (events, result) = converse(&client, "hi").await;

    assert!(result.is_ok());
    assert!(events.contains(&ReplyEvent::Fragment("ok".into())));
}

#[test]
fn test_from_config_resolves_endpoint() {
    let config = ServerConfig {
        page_url: "http://localhost:8005/chat/chatbot4".to_string(),
        ..ServerConfig::default()
    };
    let client = ChatClient::from_config(&config).unwrap();
    assert_eq!(client.endpoint().bot(), "chatbot4");
    assert_eq!(
        client.endpoint().url().as_str(),
        "http://localhost:8005/api/chat/chatbot4"
    );
}

#[test]
fn test_from_config_rejects_bare_origin() {
    let config = ServerConfig {
        page_url: "http://localhost:8005".to_string(),
        ..ServerConfig::default()
    };
    assert!(matches!(
        ChatClient::from_config(&config),
        Err(ChatError::MissingBot(_))
    ));
}

// =============================================================================
// Streaming Response Tests
// =============================================================================

#[tokio::test]
async fn test_streamed_fragments_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ndjson("{\"content\":\"Hel\"}\n{\"content\":\"lo\"}\n"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, result) = converse(&client, "hi").await;

    assert!(result.is_ok());
    assert_eq!(
        events,
        vec![
            ReplyEvent::Opened,
            ReplyEvent::Fragment("Hel".into()),
            ReplyEvent::Fragment("lo".into()),
            ReplyEvent::Finished,
        ]
    );
}

#[tokio::test]
async fn test_final_record_without_newline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ndjson("{\"content\":\"a\"}\n{\"content\":\"b\"}"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, _) = converse(&client, "hi").await;

    assert_eq!(
        events,
        vec![
            ReplyEvent::Opened,
            ReplyEvent::Fragment("a".into()),
            ReplyEvent::Fragment("b".into()),
            ReplyEvent::Finished,
        ]
    );
}

#[tokio::test]
async fn test_malformed_line_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ndjson("{bad json\n{\"content\":\"fine\"}\n"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, result) = converse(&client, "hi").await;

    assert!(result.is_ok());
    assert_eq!(
        events,
        vec![
            ReplyEvent::Opened,
            ReplyEvent::Fragment("fine".into()),
            ReplyEvent::Finished,
        ]
    );
}

#[tokio::test]
async fn test_single_answer_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "Full reply" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, _) = converse(&client, "hi").await;

    assert_eq!(
        events,
        vec![
            ReplyEvent::Opened,
            ReplyEvent::Fragment("Full reply".into()),
            ReplyEvent::Finished,
        ]
    );
}

// =============================================================================
// Error Status Tests
// =============================================================================

#[tokio::test]
async fn test_error_status_renders_error_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "error": "rate limited" })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, result) = converse(&client, "hi").await;

    assert!(result.is_ok());
    assert_eq!(
        events,
        vec![
            ReplyEvent::Rejected("Error: rate limited".into()),
            ReplyEvent::Finished,
        ]
    );
}

#[tokio::test]
async fn test_error_status_body_is_not_streamed() {
    let mock_server = MockServer::start().await;

    // A record-shaped error body must not turn into a fragment
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_raw(
            b"{\"content\":\"should not appear\"}\n".to_vec(),
            "application/x-ndjson",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), None);
    let (events, _) = converse(&client, "hi").await;

    assert_eq!(
        events,
        vec![
            ReplyEvent::Rejected("Error: Service Unavailable".into()),
            ReplyEvent::Finished,
        ]
    );
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

#[tokio::test]
async fn test_connection_refused_is_error() {
    // Reserve a port, then free it so nothing is listening
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = client_for(&uri, None);
    let (events, result) = converse(&client, "hi").await;

    assert!(matches!(result, Err(ChatError::Http(_))));
    assert!(events.is_empty());
}
