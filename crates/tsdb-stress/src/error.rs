//! Error types for the load generator

use thiserror::Error;

/// Failure to complete a submission.
///
/// A server answering with a non-success status is not represented here;
/// the batch transport logs such rejections and still returns `Ok`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Endpoint {0} resolved to no address")]
    Resolve(String),

    #[error("No server configured")]
    NoEndpoint,
}

/// Startup configuration errors. Any of these prevents workers from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At least one server is required")]
    NoServers,

    #[error("Protocol not recognized: {0}")]
    UnknownProtocol(String),

    #[error("{0} must be greater than zero")]
    InvalidCount(&'static str),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
