//! HTTP transport seam for the client.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`,
//! hands it to a `Transport`, and parses the `HttpResponse` it gets back. The
//! transport is owned by each client instance rather than shared through a
//! process-wide default, and tests swap in their own implementation to feed
//! canned responses without a network.

use std::time::Duration;

use crate::error::ApiError;

/// A GET request described as plain data.
///
/// `url` already carries the query string, including the access token, so
/// this value must not be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// `body` holds the raw bytes and is `None` when the server sent no body at
/// all. Decoding, including the UTF-8 check, is left to the client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Vec<u8>>,
}

/// Executes a single HTTP GET round-trip.
///
/// Implementations report network failures as `ApiError::Transport` and
/// failures while reading a 200 body as `ApiError::BodyRead`. Non-2xx
/// statuses are data, not errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Builds an agent that returns 4xx/5xx responses as data so the client
    /// can interpret the status itself.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.call()?;

        let status = response.status().as_u16();
        // The whole body is read; ureq's default cap would cut off large pages.
        let body = match response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
        {
            Ok(bytes) => bytes,
            // Only a 200 body is ever decoded.
            Err(_) if status != 200 => Vec::new(),
            Err(e) => return Err(ApiError::BodyRead(e.into_io())),
        };

        Ok(HttpResponse {
            status,
            body: Some(body),
        })
    }
}
