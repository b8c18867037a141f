//! Error types for the market data client

use thiserror::Error;

/// Errors that can occur when fetching data from a provider
///
/// Every variant is recovered inside [`crate::MarketDataClient`] by advancing
/// the provider rotation; none of them reach callers of the public API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be parsed into the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider returned a non-success status or failure envelope
    #[error("Provider API error: {0}")]
    ApiError(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl ProviderError {
    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates an ApiError
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Maps a reqwest send error, distinguishing timeouts from other
    /// network failures
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}
