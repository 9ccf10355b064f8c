//! Query filters and URL assembly.
//!
//! # Design
//! Fixed filters are emitted only when they carry a value: an empty string or
//! a non-positive limit leaves the parameter out of the URL entirely. Extra
//! parameters follow the fixed ones in insertion order. A key that collides
//! with a fixed parameter is sent twice, and the server decides which wins.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::config::Credentials;
use crate::error::ApiError;

/// A named collection on the graph API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    ThreatDescriptors,
    MalwareAnalyses,
    MalwareFamilies,
    ThreatExchangeMembers,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::ThreatDescriptors => "threat_descriptors",
            Resource::MalwareAnalyses => "malware_analyses",
            Resource::MalwareFamilies => "malware_families",
            Resource::ThreatExchangeMembers => "threat_exchange_members",
        }
    }
}

impl FromStr for Resource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threat_descriptors" => Ok(Resource::ThreatDescriptors),
            "malware_analyses" => Ok(Resource::MalwareAnalyses),
            "malware_families" => Ok(Resource::MalwareFamilies),
            "threat_exchange_members" => Ok(Resource::ThreatExchangeMembers),
            other => Err(ApiError::InvalidArgument(format!("unknown resource: {other}"))),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for a list query.
///
/// ```
/// use threatexchange::Query;
///
/// let query = Query::new()
///     .text("proxy")
///     .since("1391813489")
///     .until("1391856689")
///     .limit(500)
///     .param("strict_text", "true");
/// assert_eq!(query.limit_value(), 500);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    text: String,
    since: String,
    until: String,
    limit: i64,
    extra: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Start of the time range, as accepted by the API (unix time or date).
    pub fn since(mut self, start: impl Into<String>) -> Self {
        self.since = start.into();
        self
    }

    /// End of the time range.
    pub fn until(mut self, end: impl Into<String>) -> Self {
        self.until = end.into();
        self
    }

    /// Maximum number of records. Zero or less lets the server pick.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extra
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resume after a cursor taken from a previous page.
    pub fn after(self, cursor: impl Into<String>) -> Self {
        self.param("after", cursor)
    }

    pub fn before(self, cursor: impl Into<String>) -> Self {
        self.param("before", cursor)
    }

    pub fn limit_value(&self) -> i64 {
        self.limit
    }

    pub fn extra_params(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Query-string pairs in emission order, access token first.
    pub(crate) fn to_pairs(
        &self,
        credentials: &Credentials,
        resource_type: &str,
    ) -> Vec<(String, String)> {
        let mut pairs = vec![("access_token".to_string(), credentials.access_token())];
        let optional = [
            ("since", self.since.as_str()),
            ("until", self.until.as_str()),
            ("type", resource_type),
            ("text", self.text.as_str()),
        ];
        for (key, value) in optional {
            if !value.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
        if self.limit > 0 {
            pairs.push(("limit".to_string(), self.limit.to_string()));
        }
        pairs.extend(self.extra.iter().cloned());
        pairs
    }
}

/// Appends `segments` to the base URL's path and sets the query string.
///
/// Each segment is percent-encoded on its own, so a segment never introduces
/// extra path levels.
pub(crate) fn build_url(
    base: &str,
    segments: &[&str],
    pairs: &[(String, String)],
) -> Result<Url, ApiError> {
    let construction_error = |reason: &str| ApiError::UrlConstruction {
        base: base.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(base).map_err(|e| construction_error(&e.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| construction_error("base url cannot carry a path"))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url)
}
