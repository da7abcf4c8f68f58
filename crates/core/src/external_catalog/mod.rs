//! External course catalog integration.
//!
//! The catalog is queried once per ingestion with a lower-cased search term.
//! Results come back as [`Course`] records without a search term; the
//! ingestion flow stamps the term before persisting them.

mod coursera;

pub use coursera::CourseraClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::course::Course;

/// Errors that can occur when interacting with the external catalog.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// HTTP request failed (connect error, timeout, broken body).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimited,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl CatalogClientError {
    /// Whether the same request could plausibly succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::ParseError(_) => false,
        }
    }
}

/// Trait for external course catalogs.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Search the catalog. The query is lower-cased before it is sent.
    async fn search_courses(&self, query: &str) -> Result<Vec<Course>, CatalogClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_transience_by_status() {
        let server_error = CatalogClientError::ApiError {
            status: 503,
            message: "unavailable".to_string(),
        };
        let client_error = CatalogClientError::ApiError {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(server_error.is_transient());
        assert!(!client_error.is_transient());
    }

    #[test]
    fn test_rate_limit_is_transient_parse_is_not() {
        assert!(CatalogClientError::RateLimited.is_transient());
        assert!(!CatalogClientError::ParseError("eof".to_string()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = CatalogClientError::ApiError {
            status: 404,
            message: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - nope");
    }
}
