use thiserror::Error;

/// Errors that can occur while talking to the recipe backend or driving the orchestrator
#[derive(Error, Debug)]
pub enum SearchError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Server returned status {status} for {endpoint}")]
    StatusError { status: u16, endpoint: String },

    /// The response body was not a `{ "recipes": [...] }` object
    #[error("Malformed response body: {0}")]
    DecodeError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Client builder misconfiguration
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// The orchestrator event loop is no longer running
    #[error("Orchestrator has shut down")]
    Closed,
}

impl SearchError {
    /// Whether this is a failure of one of the backend calls, as opposed to a
    /// local setup problem.
    pub fn is_network_or_server(&self) -> bool {
        matches!(
            self,
            SearchError::RequestError(_)
                | SearchError::StatusError { .. }
                | SearchError::DecodeError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = SearchError::StatusError {
            status: 503,
            endpoint: "/recipes".to_string(),
        };
        assert_eq!(err.to_string(), "Server returned status 503 for /recipes");
        assert!(err.is_network_or_server());
    }

    #[test]
    fn test_local_errors_are_not_network_errors() {
        assert!(!SearchError::Closed.is_network_or_server());
        assert!(!SearchError::BuilderError("missing".to_string()).is_network_or_server());
    }
}
