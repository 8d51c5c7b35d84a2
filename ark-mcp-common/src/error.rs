//! Error types for the common library.
//!
//! This module provides a unified error hierarchy using `thiserror` for the
//! failure causes a generation call can hit before its outcome is folded into
//! a result envelope.
//!
//! # Error Categories
//!
//! - `ConfigError`: Invalid configuration, raised at startup only
//! - `Error::MissingCredential`: No API key supplied or configured
//! - `Error::Api`: Vendor API errors (includes endpoint and status)
//! - `Error::Timeout`: Request exceeded its time budget
//! - `Error::MalformedResponse`: 2xx response with an unexpected shape

use thiserror::Error;

/// Unified error type for the common library.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was passed and none is configured
    #[error("API key not provided. Set the ARK_API_KEY environment variable or pass api_key")]
    MissingCredential,

    /// API errors with endpoint and HTTP status context
    ///
    /// A status code of 0 means the request never produced a response
    /// (connection refused, DNS failure, TLS error).
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// Request timeout errors
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The API answered with success but the body did not have the expected shape
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse {
        /// The API endpoint that was called
        endpoint: String,
        /// What was missing or unparseable
        message: String,
    },
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use ark_mcp_common::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://ark.cn-beijing.volces.com/api/v3/images/generations",
    ///     500,
    ///     "Internal server error"
    /// );
    /// assert!(err.to_string().contains("volces.com"));
    /// assert!(err.to_string().contains("500"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    ///
    /// # Example
    ///
    /// ```
    /// use ark_mcp_common::error::Error;
    ///
    /// let err = Error::timeout(120);
    /// assert!(err.to_string().contains("120 seconds"));
    /// ```
    pub fn timeout(seconds: u64) -> Self {
        Error::Timeout(seconds)
    }

    /// Create a new malformed response error.
    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Classify a failed `reqwest` send.
    ///
    /// Timeouts become `Error::Timeout` carrying the budget that was applied;
    /// everything else becomes an `Error::Api` with status 0, or the response
    /// status when reqwest attached one.
    pub fn from_request(endpoint: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            return Error::timeout(timeout_secs);
        }
        let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
        Error::api(endpoint, status_code, format!("Request failed: {}", err))
    }
}

/// Configuration errors.
///
/// Every variable has a default, so the only failure is a value that is set
/// but unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result of a generation step before it is folded into an envelope.
pub type Result<T> = std::result::Result<T, Error>;
