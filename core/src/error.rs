//! Error types for the ThreatExchange client.
//!
//! # Design
//! Each variant maps to one failure point of a query: building the URL,
//! the network round-trip, the status check, reading the body, and decoding
//! it. Every error is terminal for the call that produced it. The client
//! never retries, so callers match on the variant to decide what to do next.

/// Errors returned by `ThreatExchangeClient`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The client configuration or credentials are unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A caller-supplied argument was rejected before any I/O happened.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The query URL could not be assembled from the configured base endpoint.
    #[error("could not build url from {base}: {reason}")]
    UrlConstruction { base: String, reason: String },

    /// The HTTP round-trip failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The server answered without a body.
    #[error("empty body for query on {resource}")]
    EmptyResponseBody { resource: String },

    /// The server answered with a status other than 200.
    #[error("wrong http return code, got: {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be read to completion.
    #[error("could not read response body: {0}")]
    BodyRead(#[source] std::io::Error),

    /// The body is not valid JSON for the expected result shape.
    #[error("could not decode response body for resource {resource}: {source}")]
    JsonDecode {
        resource: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn unexpected_status_displays_code() {
        let err = ApiError::UnexpectedStatus { status: 403 };
        assert_eq!(err.to_string(), "wrong http return code, got: 403");
    }

    #[test]
    fn json_decode_names_resource_and_chains_source() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ApiError::JsonDecode {
            resource: "malware_families".to_string(),
            body: "{oops".to_string(),
            source,
        };
        assert!(err.to_string().contains("malware_families"));
        assert!(err.source().is_some());
    }

    #[test]
    fn transport_and_body_read_keep_their_cause() {
        let err = ApiError::from(ureq::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        )));
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.source().is_some());

        let err = ApiError::BodyRead(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        let cause = err.source().unwrap().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(cause.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}
