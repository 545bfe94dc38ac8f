// ── Core error types ──
//
// User-facing errors from upwatch-core. Consumers never match on HTTP
// status codes or JSON parse failures directly: the
// `From<upwatch_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach monitoring server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Token storage error: {message}")]
    TokenStore { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Site not found: {identifier}")]
    SiteNotFound { identifier: String },

    #[error("{message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    /// The server's error text, shown to the user as-is.
    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when logging in again is the fix.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::NotLoggedIn | Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<upwatch_api::Error> for CoreError {
    fn from(err: upwatch_api::Error) -> Self {
        match err {
            upwatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            upwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            upwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            upwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            upwatch_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            upwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response from server: {message}"))
            }
        }
    }
}
