use thiserror::Error;

/// Authentication failures surfaced by the client and controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The backend refused the username/password pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request never produced a usable response.
    #[error("Network error: {0}")]
    Network(String),

    /// The stored token is no longer accepted.
    #[error("Session expired")]
    SessionExpired,

    /// The persisted session could not be decoded.
    #[error("Malformed stored session data: {0}")]
    MalformedStoredData(String),

    /// The backend answered with an unexpected status.
    #[error("Request rejected with HTTP {0}")]
    Rejected(u16),

    /// A newer request or a logout made this response obsolete.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl AuthError {
    pub(crate) fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Network("request timed out".to_string())
        } else if e.is_decode() {
            AuthError::Network(format!("invalid response body: {e}"))
        } else {
            AuthError::Network(e.to_string())
        }
    }
}
