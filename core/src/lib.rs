//! Blocking read client for the ThreatExchange graph API.
//!
//! # Overview
//! Queries threat descriptors, malware analyses, malware families and the
//! member directory. Every fetch performs one authenticated HTTP GET, decodes
//! the JSON body into typed records and returns them together with the raw
//! body text.
//!
//! # Design
//! - `ThreatExchangeClient` is immutable after construction and owns its
//!   transport; share it freely across threads.
//! - Requests are built (`build_*`), executed through a `Transport`, and
//!   parsed (`parse_response`), so the I/O boundary is explicit.
//! - Nothing is retried, cached or paged automatically. Page cursors are
//!   handed back to the caller, who feeds them into the next `Query`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod query;
pub mod types;

pub use client::{ClientBuilder, ThreatExchangeClient};
pub use config::{ClientConfig, Credentials, DEFAULT_API_VERSION, DEFAULT_URL};
pub use error::{ApiError, Result};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use logger::{Logger, TracingLogger};
pub use query::{Query, Resource};
pub use types::{
    Cursors, Fetched, IndicatorResult, MalwareFamiliesResults, MalwareFamilyResult,
    MalwareResult, MalwareResults, Owner, OwnersResults, Page, Paging, ThreatDescriptor,
    ThreatDescriptorResults,
};
