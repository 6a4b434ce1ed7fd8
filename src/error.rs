//! Error taxonomy for the control layer
//!
//! The calling agent matches on stringified errors to decide whether to
//! re-authenticate, so the `SessionExpired` message must keep its
//! "session expired" / "401/403" markers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Authentication was rejected by the device (HTTP 401 during login).
    #[error("invalid credentials: device rejected the login (401)")]
    InvalidCredentials,

    /// The session cookies are no longer accepted (401/403 or a redirect to
    /// the login page). Never retried here; the caller re-authenticates.
    #[error("session expired: device returned 401/403 or redirected to login")]
    SessionExpired,

    /// Timeout, connection refused, DNS failure, or any non-2xx status that
    /// is not an expiry signal. Retry policy belongs to the caller.
    #[error("transport error: {0}")]
    Transport(String),

    /// A caller-supplied value violates a field constraint. Resolved inside
    /// the adapter before any network write.
    #[error("validation error: {0}")]
    Validation(String),

    /// The write POST failed after validation passed.
    #[error("submission error: {0}")]
    Submission(String),
}

impl Error {
    /// True when the caller should re-authenticate and reissue the operation.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Error::Transport(format!("connection failed: {err}"))
        } else {
            Error::Transport(err.to_string())
        }
    }
}
