//! Error types for the post client.
//!
//! # Design
//! Each failure class the call wrapper has to tell apart gets its own
//! variant: network, protocol (non-2xx), decode, and interceptor failures.
//! `NotFound` stays separate from `HttpError` because a missing post is the
//! common case for an out-of-range id. Configuration problems live in
//! `ConfigError` since they surface at construction, never per call.

use thiserror::Error;

/// What went wrong at the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Connect,
    Timeout,
    Io,
    Other,
}

/// Errors produced while performing one API operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange never produced a response. `message` is `None` when the
    /// underlying failure carried no description.
    #[error("network error ({kind:?}): {}", .message.as_deref().unwrap_or("no details"))]
    Network {
        kind: NetworkErrorKind,
        message: Option<String>,
    },

    /// The server returned 404.
    #[error("HTTP 404: resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// An interceptor rejected the request or response.
    #[error("interceptor {name} failed: {message}")]
    Interceptor { name: &'static str, message: String },
}

impl ApiError {
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        ApiError::Network {
            kind,
            message: Some(message.into()),
        }
    }

    /// A network failure with nothing but its kind, e.g. a bare timeout.
    pub fn bare_network(kind: NetworkErrorKind) -> Self {
        ApiError::Network {
            kind,
            message: None,
        }
    }

    /// Human-readable description, or `None` when the error carries none.
    pub fn message(&self) -> Option<String> {
        match self {
            ApiError::Network { message: None, .. } => None,
            ApiError::Network {
                message: Some(m), ..
            } if m.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    /// HTTP status code, for protocol errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        )
    }
}

/// Invalid transport configuration. Fatal at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must not be negative (got {value_ms} ms)")]
    NegativeTimeout { field: &'static str, value_ms: i64 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
