//! Unit Tests
//!
//! HTTP-level tests for the chat client (wiremock) and end-to-end tests of
//! the chat view driving a mocked endpoint.

mod chat_tests;
mod client_tests;
