//! Error types for the registrar
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for registrar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the registrar
#[derive(Error, Debug)]
pub enum Error {
    /// Metadata source errors (a single failed query)
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// No address could be obtained from any metadata path
    #[error("No address available: {0}")]
    AddressUnavailable(String),

    /// Every ancestor of the host was tried and none is a hosted zone
    #[error("Unable to find a hosted zone for {host}")]
    ZoneNotFound {
        /// The host that was being registered
        host: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// XML encoding/decoding errors
    #[error("XML error: {0}")]
    Xml(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create an "address unavailable" error
    pub fn address_unavailable(msg: impl Into<String>) -> Self {
        Self::AddressUnavailable(msg.into())
    }

    /// Create a "zone not found" error for a host
    pub fn zone_not_found(host: impl Into<String>) -> Self {
        Self::ZoneNotFound { host: host.into() }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an XML error
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole registration run
    ///
    /// Only two conditions are fatal: no address could be resolved, and
    /// the zone walk ran out of labels. Everything else is either absorbed
    /// by the zone walk or only reported.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AddressUnavailable(_) | Self::ZoneNotFound { .. })
    }
}
