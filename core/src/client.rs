//! Blocking client for the ThreatExchange graph API.
//!
//! # Design
//! `ThreatExchangeClient` holds only immutable state: credentials, config,
//! an optional logger, and its own transport. Each query is split into
//! `build_*` (produces an `HttpRequest`), one transport round-trip, and
//! `parse_response` (consumes the `HttpResponse`). The build and parse halves
//! are public so they can be checked without a network.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::{ClientConfig, Credentials};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::logger::Logger;
use crate::query::{build_url, Query, Resource};
use crate::types::{
    Fetched, MalwareFamiliesResults, MalwareFamilyResult, MalwareResult, MalwareResults,
    OwnersResults, ThreatDescriptor, ThreatDescriptorResults,
};

/// Read-only client for threat descriptors, malware and the member directory.
///
/// Safe to share between threads; nothing is mutated after construction.
#[derive(Clone)]
pub struct ThreatExchangeClient {
    credentials: Credentials,
    config: ClientConfig,
    logger: Option<Arc<dyn Logger>>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ThreatExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreatExchangeClient")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl ThreatExchangeClient {
    /// Client for the production endpoint. Credentials are not checked here.
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        logger: Option<Arc<dyn Logger>>,
    ) -> Result<Self, ApiError> {
        let mut builder = Self::builder(app_id, app_secret);
        if let Some(logger) = logger {
            builder = builder.logger(logger);
        }
        builder.build()
    }

    pub fn builder(app_id: impl Into<String>, app_secret: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(Credentials::new(app_id, app_secret))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Threat descriptors, optionally restricted to one indicator type
    /// (e.g. `"IP_ADDRESS"`).
    pub fn fetch_threat_indicators(
        &self,
        resource_type: &str,
        query: &Query,
    ) -> Result<Fetched<ThreatDescriptorResults>, ApiError> {
        self.query(Resource::ThreatDescriptors, resource_type, query)
    }

    pub fn fetch_malware_analyses(
        &self,
        query: &Query,
    ) -> Result<Fetched<MalwareResults>, ApiError> {
        self.query(Resource::MalwareAnalyses, "", query)
    }

    pub fn fetch_malware_families(
        &self,
        query: &Query,
    ) -> Result<Fetched<MalwareFamiliesResults>, ApiError> {
        self.query(Resource::MalwareFamilies, "", query)
    }

    /// The member directory. Takes no filters.
    pub fn fetch_members(&self) -> Result<Fetched<OwnersResults>, ApiError> {
        self.query(Resource::ThreatExchangeMembers, "", &Query::new())
    }

    /// A single graph object by numeric id, restricted to `fields`.
    pub fn fetch_object<T: DeserializeOwned>(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<Fetched<T>, ApiError> {
        let request = self.build_object_request(id, fields)?;
        self.execute(id, &request)
    }

    pub fn fetch_threat_descriptor(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<Fetched<ThreatDescriptor>, ApiError> {
        self.fetch_object(id, fields)
    }

    pub fn fetch_malware_analysis(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<Fetched<MalwareResult>, ApiError> {
        self.fetch_object(id, fields)
    }

    pub fn fetch_malware_family(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<Fetched<MalwareFamilyResult>, ApiError> {
        self.fetch_object(id, fields)
    }

    /// Request for `GET {base}/{version}/{resource}/?access_token=..&..`.
    pub fn build_list_request(
        &self,
        resource: Resource,
        resource_type: &str,
        query: &Query,
    ) -> Result<HttpRequest, ApiError> {
        let pairs = query.to_pairs(&self.credentials, resource_type);
        let url = build_url(
            &self.config.base_url,
            &[self.config.api_version.as_str(), resource.as_str(), ""],
            &pairs,
        )
        .inspect_err(|e| self.report(format_args!("Could not build url for {resource}: {e}")))?;
        Ok(json_get(url.into()))
    }

    /// Request for `GET {base}/{version}/{id}?access_token=..&fields=..`.
    pub fn build_object_request(&self, id: &str, fields: &[&str]) -> Result<HttpRequest, ApiError> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ApiError::InvalidArgument(format!("{id:?} is not a numeric id")));
        }
        if fields.is_empty() {
            return Err(ApiError::InvalidArgument("fields is empty".to_string()));
        }
        let pairs = vec![
            ("access_token".to_string(), self.credentials.access_token()),
            ("fields".to_string(), fields.join(",")),
        ];
        let url = build_url(&self.config.base_url, &[self.config.api_version.as_str(), id], &pairs)
            .inspect_err(|e| self.report(format_args!("Could not build url for object {id}: {e}")))?;
        Ok(json_get(url.into()))
    }

    /// Checks body presence, then status, then decodes.
    ///
    /// The returned `raw` is the same text the value was decoded from.
    pub fn parse_response<T: DeserializeOwned>(
        &self,
        resource: &str,
        response: HttpResponse,
    ) -> Result<Fetched<T>, ApiError> {
        let Some(body) = response.body else {
            self.report(format_args!("Empty body for query on {resource}"));
            return Err(ApiError::EmptyResponseBody {
                resource: resource.to_string(),
            });
        };
        if response.status != 200 {
            self.report(format_args!("Wrong http return code, got : {}", response.status));
            return Err(ApiError::UnexpectedStatus {
                status: response.status,
            });
        }
        let body = match String::from_utf8(body) {
            Ok(body) => body,
            Err(e) => {
                let source = <serde_json::Error as serde::de::Error>::custom(e.utf8_error());
                let body = String::from_utf8_lossy(e.as_bytes()).into_owned();
                return Err(self.decode_error(resource, body, source));
            }
        };
        match serde_json::from_str(&body) {
            Ok(value) => Ok(Fetched { value, raw: body }),
            Err(source) => Err(self.decode_error(resource, body, source)),
        }
    }

    fn decode_error(&self, resource: &str, body: String, source: serde_json::Error) -> ApiError {
        self.report(format_args!(
            "Could not decode response body : {body}, for resource : {resource}"
        ));
        ApiError::JsonDecode {
            resource: resource.to_string(),
            body,
            source,
        }
    }

    fn query<T: DeserializeOwned>(
        &self,
        resource: Resource,
        resource_type: &str,
        query: &Query,
    ) -> Result<Fetched<T>, ApiError> {
        let request = self.build_list_request(resource, resource_type, query)?;
        self.execute(resource.as_str(), &request)
    }

    fn execute<T: DeserializeOwned>(
        &self,
        resource: &str,
        request: &HttpRequest,
    ) -> Result<Fetched<T>, ApiError> {
        tracing::debug!(resource, "sending query");
        let response = self.transport.execute(request).inspect_err(|e| {
            if matches!(e, ApiError::BodyRead(_)) {
                self.report(format_args!("Could not read response body : {e}"));
            }
        })?;
        tracing::debug!(resource, status = response.status, "received response");
        self.parse_response(resource, response)
    }

    fn report(&self, message: std::fmt::Arguments<'_>) {
        if let Some(logger) = &self.logger {
            logger.log(&message.to_string());
        }
    }
}

fn json_get(url: String) -> HttpRequest {
    HttpRequest {
        url,
        headers: vec![("accept".to_string(), "application/json".to_string())],
    }
}

/// Assembles a `ThreatExchangeClient` with non-default parts.
pub struct ClientBuilder {
    credentials: Credentials,
    config: ClientConfig,
    logger: Option<Arc<dyn Logger>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            config: ClientConfig::default(),
            logger: None,
            transport: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replaces the default `UreqTransport`. The config timeout is then
    /// the transport's concern.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<ThreatExchangeClient, ApiError> {
        self.config.validate()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::new(self.config.timeout)),
        };
        Ok(ThreatExchangeClient {
            credentials: self.credentials,
            config: self.config,
            logger: self.logger,
            transport,
        })
    }
}
