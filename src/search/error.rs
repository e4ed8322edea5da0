//! Errors surfaced by the search orchestrator

/// Failures of a search call.
///
/// Fan-out searches only ever fail with [`SearchError::InvalidRequest`];
/// individual provider failures are contained and logged.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request itself is malformed (e.g. empty query).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested provider is not registered.
    #[error("search provider '{0}' is not available or not configured")]
    UnknownProvider(String),

    /// The explicitly requested provider failed.
    #[error("search provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },
}

impl SearchError {
    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::UnknownProvider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::UnknownProvider("bing".to_string());
        assert!(err.to_string().contains("'bing'"));
        assert!(err.is_client_error());

        let err = SearchError::Provider {
            provider: "google".to_string(),
            message: "HTTP error 500".to_string(),
        };
        assert!(err.to_string().contains("HTTP error 500"));
        assert!(!err.is_client_error());
    }
}
