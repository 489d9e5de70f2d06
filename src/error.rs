//! Error types for premiumbot
//!
//! This module defines the error types used throughout the service.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Provider Error Classification
// ============================================================================

/// Structured provider error classification.
///
/// Categorizes model-provider HTTP failures so that an outer retry layer can
/// decide what to do without string matching.
#[derive(Debug)]
pub enum ProviderError {
    /// 401: Invalid API key or authentication failure
    Auth(String),
    /// 429: Rate limit or quota exceeded
    RateLimit(String),
    /// 402: Payment required or billing issue
    Billing(String),
    /// 500/502/503/504: Server-side errors
    ServerError(String),
    /// 400: Bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404: Model not found or endpoint not available
    ModelNotFound(String),
    /// Connection or read timeout
    Timeout(String),
    /// Connection refused, reset, or dropped before a response arrived
    Network(String),
    /// Catch-all for unrecognized errors
    Unknown(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            ProviderError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            ProviderError::Billing(msg) => write!(f, "Billing error: {}", msg),
            ProviderError::ServerError(msg) => write!(f, "Server error: {}", msg),
            ProviderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProviderError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ProviderError::Network(msg) => write!(f, "Network error: {}", msg),
            ProviderError::Unknown(msg) => write!(f, "Unknown provider error: {}", msg),
        }
    }
}

impl ProviderError {
    /// Returns `true` if this error is transient and the request may be retried.
    ///
    /// Retryable errors: RateLimit, ServerError, Timeout, Network.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimit(_)
                | ProviderError::ServerError(_)
                | ProviderError::Timeout(_)
                | ProviderError::Network(_)
        )
    }

    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Auth(_) => Some(401),
            ProviderError::RateLimit(_) => Some(429),
            ProviderError::Billing(_) => Some(402),
            ProviderError::ServerError(_) => Some(500),
            ProviderError::InvalidRequest(_) => Some(400),
            ProviderError::ModelNotFound(_) => Some(404),
            ProviderError::Timeout(_) | ProviderError::Network(_) => None,
            ProviderError::Unknown(_) => None,
        }
    }
}

impl From<ProviderError> for BotError {
    fn from(err: ProviderError) -> Self {
        BotError::ProviderTyped(err)
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for premiumbot operations.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration errors (missing credential, bad value, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Untyped provider failures (transport errors, undecodable bodies)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Structured provider error with an HTTP classification.
    #[error("Provider error: {0}")]
    ProviderTyped(ProviderError),

    /// Tool execution errors (malformed arguments, unknown tool name)
    #[error("Tool error: {0}")]
    Tool(String),

    /// Session errors (unknown id, history not ready for a turn)
    #[error("Session error: {0}")]
    Session(String),

    /// The premium reference table could not be loaded
    #[error("Premium table error: {0}")]
    Table(String),

    /// A single turn requested more tool rounds than allowed
    #[error("Turn exceeded {limit} tool iterations without a final answer")]
    IterationLimit { limit: usize },

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// A specialized `Result` type for premiumbot operations.
pub type Result<T> = std::result::Result<T, BotError>;
