//! Chat HTTP Client
//!
//! Sends one user message to the bot's chat endpoint and feeds the reply
//! back as [`ReplyEvent`]s: either a rendered error (non-success status) or
//! the fragments of a newline-delimited JSON stream.

use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ServerConfig;

use super::streaming::{DecodedLine, NdjsonDecoder};

// ============================================================================
// Errors
// ============================================================================

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Page URL has no bot segment: {0}")]
    MissingBot(String),
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Progress of one exchange, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    /// Success status received; the bot bubble opens empty.
    Opened,
    /// Text to append to the bot bubble.
    Fragment(String),
    /// Non-success status; the text is the whole bot bubble.
    Rejected(String),
    /// Exchange complete.
    Finished,
}

/// Response after the status check, before the body is consumed.
pub enum ChatResponse {
    Rejected(String),
    Streaming(reqwest::Response),
}

// ============================================================================
// Endpoint
// ============================================================================

/// Chat endpoint resolved from a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEndpoint {
    bot: String,
    url: Url,
}

impl ChatEndpoint {
    /// The bot identifier is the last non-empty path segment of `page_url`;
    /// it replaces `{bot}` in `template`, which is resolved against the
    /// page URL.
    pub fn from_page_url(page_url: &str, template: &str) -> Result<Self> {
        let page = Url::parse(page_url)?;
        let bot = page
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .ok_or_else(|| ChatError::MissingBot(page_url.to_string()))?;
        let url = page.join(&template.replace("{bot}", &bot))?;
        Ok(Self { bot, url })
    }

    pub fn bot(&self) -> &str {
        &self.bot
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: ChatEndpoint,
    session_cookie: Option<String>,
}

impl ChatClient {
    pub fn new(endpoint: ChatEndpoint, http: Client, session_cookie: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            session_cookie,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let endpoint = ChatEndpoint::from_page_url(&config.page_url, &config.endpoint_template)?;

        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        log::info!(
            "Chat client for bot '{}' at {}",
            endpoint.bot(),
            endpoint.url()
        );
        Ok(Self::new(endpoint, http, config.session_cookie.clone()))
    }

    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }

    /// Post `message` and check the status before touching the body.
    pub async fn send(&self, message: &str) -> Result<ChatResponse> {
        let mut request = self
            .http
            .post(self.endpoint.url().clone())
            .json(&MessageBody { message });

        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie);
        }

        log::debug!("POST {} ({} chars)", self.endpoint.url(), message.len());
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await?;
            log::warn!("Chat endpoint returned {status}");
            return Ok(ChatResponse::Rejected(rejection_text(status, &body)));
        }

        Ok(ChatResponse::Streaming(response))
    }

    /// Run one full exchange, reporting progress through `on_event`.
    ///
    /// Transport failures end the exchange with an error; anything already
    /// reported stays reported.
    pub async fn converse<F>(&self, message: &str, mut on_event: F) -> Result<()>
    where
        F: FnMut(ReplyEvent),
    {
        match self.send(message).await? {
            ChatResponse::Rejected(text) => on_event(ReplyEvent::Rejected(text)),
            ChatResponse::Streaming(response) => {
                on_event(ReplyEvent::Opened);
                pump_stream(response.bytes_stream(), &mut on_event).await?;
            }
        }
        on_event(ReplyEvent::Finished);
        Ok(())
    }
}

/// Bot bubble text for a non-success response.
pub fn rejection_text(status: StatusCode, body: &[u8]) -> String {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or(status.as_str())
                .to_string()
        });
    format!("Error: {message}")
}

// ============================================================================
// Stream pump
// ============================================================================

/// Decode a byte stream of NDJSON records into [`ReplyEvent::Fragment`]s.
///
/// Malformed records are logged and skipped. A read error stops the pump;
/// fragments already reported stay reported.
pub async fn pump_stream<S, E, F>(stream: S, mut on_event: F) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<ChatError>,
    F: FnMut(ReplyEvent),
{
    futures_util::pin_mut!(stream);
    let mut decoder = NdjsonDecoder::new();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(Into::into)?;
        for line in decoder.feed(&bytes) {
            emit(line, &mut on_event);
        }
    }

    if let Some(line) = decoder.finish() {
        emit(line, &mut on_event);
    }
    Ok(())
}

fn emit(line: DecodedLine, on_event: &mut impl FnMut(ReplyEvent)) {
    match line {
        DecodedLine::Record(record) => {
            let fragment = record.fragment();
            if !fragment.is_empty() {
                on_event(ReplyEvent::Fragment(fragment.to_string()));
            }
        }
        DecodedLine::Malformed { line, error } => {
            log::warn!("Skipping malformed stream record {line:?}: {error}");
        }
    }
}
