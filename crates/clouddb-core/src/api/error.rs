//! Error type for the REST client
//!
//! Every non-2xx response is classified by status code so callers can react
//! without string matching.

use thiserror::Error;

/// Errors returned by [`CloudDatabasesClient`](super::CloudDatabasesClient)
#[derive(Error, Debug)]
pub enum CloudError {
    /// 400
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// 401
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// 403
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// 404
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 409
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// 412, usually a stale `If-Match` on allowlist replace
    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },

    /// 429
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// 500
    #[error("Internal server error: {message}")]
    InternalServerError { message: String },

    /// 502, 503, 504
    #[error("Service unavailable ({code}): {message}")]
    ServiceUnavailable { code: u16, message: String },

    /// Any other unexpected status code
    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    /// Token exchange with the IAM endpoint failed
    #[error("Token request failed: {0}")]
    TokenError(String),

    /// Could not reach the service
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Request timed out in transport
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Transport-level failure not covered above
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client misconfiguration (bad URL, missing API key)
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

/// Result type for REST client operations
pub type Result<T> = std::result::Result<T, CloudError>;

impl From<reqwest::Error> for CloudError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CloudError::Timeout(err.to_string())
        } else if err.is_connect() {
            CloudError::ConnectionError(err.to_string())
        } else if err.is_decode() {
            CloudError::ParseError(err.to_string())
        } else {
            CloudError::Request(err)
        }
    }
}

impl CloudError {
    /// Build an error from an HTTP status code and response message
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            400 => CloudError::BadRequest { message },
            401 => CloudError::AuthenticationFailed { message },
            403 => CloudError::Forbidden { message },
            404 => CloudError::NotFound { message },
            409 => CloudError::Conflict { message },
            412 => CloudError::PreconditionFailed { message },
            429 => CloudError::RateLimited { message },
            500 => CloudError::InternalServerError { message },
            502..=504 => CloudError::ServiceUnavailable { code, message },
            _ => CloudError::ApiError { code, message },
        }
    }

    /// HTTP status code, when the error came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CloudError::BadRequest { .. } => Some(400),
            CloudError::AuthenticationFailed { .. } => Some(401),
            CloudError::Forbidden { .. } => Some(403),
            CloudError::NotFound { .. } => Some(404),
            CloudError::Conflict { .. } => Some(409),
            CloudError::PreconditionFailed { .. } => Some(412),
            CloudError::RateLimited { .. } => Some(429),
            CloudError::InternalServerError { .. } => Some(500),
            CloudError::ServiceUnavailable { code, .. } | CloudError::ApiError { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CloudError::AuthenticationFailed { .. }
                | CloudError::Forbidden { .. }
                | CloudError::TokenError(_)
        )
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|c| c >= 500)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CloudError::Timeout(_))
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CloudError::RateLimited { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CloudError::Conflict { .. } | CloudError::PreconditionFailed { .. }
        )
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, CloudError::BadRequest { .. })
    }

    /// Rate limits, 5xx and transport hiccups may succeed if repeated
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limited()
            || self.is_server_error()
            || self.is_timeout()
            || matches!(self, CloudError::ConnectionError(_))
    }
}
