use crate::response::Response;
use thiserror::Error;

/// Main error type for HubSpot API operations
#[derive(Debug, Error)]
pub enum HubspotError {
    /// A required configuration field was missing when a request needed it
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A `:name` placeholder was left in the path after substitution
    #[error("missing interpolation: {0}")]
    MissingInterpolation(String),

    /// A parameter value did not fit the rule selected by its key
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The API answered with `errorType: RATE_LIMIT`
    #[error("rate limited (status {}): {}", .response.status(), .response.text())]
    RateLimited { response: Response },

    /// Any other non-success response
    #[error("request failed (status {}): {}", .response.status(), .response.text())]
    Request { response: Response },

    /// The bearer token provider failed to produce a token
    #[error("access token error: {0}")]
    Token(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// A header value could not be built (bad characters in a token)
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl HubspotError {
    /// Create a configuration error naming the missing field
    pub fn missing_config(field: &str) -> Self {
        HubspotError::Configuration(format!("{} is not configured", field))
    }

    /// The response carried by request and rate-limit errors
    pub fn response(&self) -> Option<&Response> {
        match self {
            HubspotError::RateLimited { response } | HubspotError::Request { response } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// Check if this error signals rate limiting
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, HubspotError::RateLimited { .. })
    }

    /// Get the HTTP status code if this error carries a response
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(Response::status)
    }
}

/// Result type for HubSpot operations
pub type Result<T> = std::result::Result<T, HubspotError>;
