//! Error types for Argus API calls.

use thiserror::Error;

/// Errors that can occur when calling the Argus API.
///
/// "Recording not found" is deliberately not an error: the download endpoint
/// signals it through a well-formed envelope and the pipeline treats it as a
/// valid, expected outcome.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure with no HTTP response (DNS, connect, timeout).
    #[error("network error calling {endpoint}: {source}")]
    Network {
        /// The endpoint path that failed.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} calling {endpoint}")]
    Http {
        /// The endpoint path that failed.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        /// The endpoint path that returned the body.
        endpoint: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A well-formed response carrying a non-1 application status code.
    #[error("{endpoint} returned application error {code}: {message}")]
    Application {
        /// The endpoint path that reported the error.
        endpoint: String,
        /// The `codStatus` value from the response.
        code: i64,
        /// The `descStatus` message from the response.
        message: String,
    },
}

impl ApiError {
    /// Creates a network error.
    pub fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates an application-level error.
    pub fn application(
        endpoint: impl Into<String>,
        code: i64,
        message: impl Into<String>,
    ) -> Self {
        Self::Application {
            endpoint: endpoint.into(),
            code,
            message: message.into(),
        }
    }

    /// The observed HTTP status code, when the server answered at all.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Status label used in failure diagnostics (`"N/A"` when no response).
    #[must_use]
    pub fn status_label(&self) -> String {
        self.http_status()
            .map_or_else(|| "N/A".to_string(), |s| s.to_string())
    }
}
