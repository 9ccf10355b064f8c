//! Client configuration and credentials.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

/// Production graph API endpoint.
pub const DEFAULT_URL: &str = "https://graph.facebook.com";

/// API version segment prepended to every resource path.
pub const DEFAULT_API_VERSION: &str = "v2.5";

pub const ENV_APP_ID: &str = "THREATEXCHANGE_APP_ID";
pub const ENV_APP_SECRET: &str = "THREATEXCHANGE_APP_SECRET";
pub const ENV_BASE_URL: &str = "THREATEXCHANGE_BASE_URL";
pub const ENV_API_VERSION: &str = "THREATEXCHANGE_API_VERSION";
pub const ENV_TIMEOUT_SECS: &str = "THREATEXCHANGE_TIMEOUT_SECS";

/// Application credentials. Their validity is only known once the server
/// accepts or rejects a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_id: String,
    app_secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(require_env(ENV_APP_ID)?, require_env(ENV_APP_SECRET)?))
    }

    /// The `access_token` query value: `<app id>|<app secret>`.
    pub fn access_token(&self) -> String {
        format!("{}|{}", self.app_id, self.app_secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Where and how the client talks to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    /// Deadline for a whole request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by any of the `THREATEXCHANGE_*` variables that
    /// are set.
    pub fn from_env() -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Ok(version) = std::env::var(ENV_API_VERSION) {
            config.api_version = version;
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            config.timeout = Some(parse_timeout(&raw)?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.base_url.trim().is_empty() {
            return Err(ApiError::Configuration("base url is empty".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(ApiError::Configuration("api version is empty".to_string()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ApiError::Configuration("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String, ApiError> {
    std::env::var(name).map_err(|_| ApiError::Configuration(format!("{name} is not set")))
}

fn parse_timeout(raw: &str) -> Result<Duration, ApiError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ApiError::Configuration(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}")))
}
