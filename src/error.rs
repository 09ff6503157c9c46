use thiserror::Error;

/// Shown when a failure carries no message of its own
pub const GENERIC_FETCH_FAILURE: &str = "Could not load reviews. Please try again later.";

/// A data source could not produce reviews for a subject
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Unavailable(String),

    #[error("no reviews found for {0}")]
    NotFound(String),

    #[error("review service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode reviews: {0}")]
    Decode(String),

    #[error("failed to read reviews: {0}")]
    Io(String),
}

impl FetchError {
    /// Message surfaced in the failed state
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FETCH_FAILURE.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_passthrough() {
        let err = FetchError::Unavailable("Failed to fetch reviews for this app.".to_string());
        assert_eq!(err.user_message(), "Failed to fetch reviews for this app.");
    }

    #[test]
    fn test_user_message_fallback() {
        let err = FetchError::Unavailable(String::new());
        assert_eq!(err.user_message(), GENERIC_FETCH_FAILURE);
    }

    #[test]
    fn test_status_message() {
        let err = FetchError::Status {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.user_message(), "review service returned 503: maintenance");
    }
}
