//! Error types for the portfolio chat Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a chat request.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Access token missing or mismatched
    #[error("Acceso no autorizado")]
    Unauthorized,

    /// Validation error
    #[error("{0}")]
    Validation(String),

    /// Knowledge document could not be fetched
    #[error("Knowledge fetch error: {0}")]
    UpstreamKnowledge(String),

    /// Model invocation failed
    #[error("Model error: {0}")]
    UpstreamModel(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Unauthorized => 401,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("x".to_string()).status_code(), 400);
        assert_eq!(Error::Unauthorized.status_code(), 401);
        assert_eq!(Error::UpstreamModel("x".to_string()).status_code(), 500);
        assert_eq!(Error::Config("x".to_string()).status_code(), 500);
    }
}
