//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use upwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to monitoring server at {url}")]
    #[diagnostic(
        code(upwatch::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(upwatch::auth_failed),
        help("Log in again with: upwatch login --profile {profile}")
    )]
    AuthFailed { profile: String, message: String },

    #[error("Not logged in to profile '{profile}'")]
    #[diagnostic(
        code(upwatch::not_logged_in),
        help("Run: upwatch login\nOr pass a token with --token / UPWATCH_TOKEN.")
    )]
    NotLoggedIn { profile: String },

    #[error("No password available for profile '{profile}'")]
    #[diagnostic(
        code(upwatch::no_credentials),
        help(
            "Store one with: upwatch config set-password\n\
             Or set UPWATCH_PASSWORD, or pipe it in with --password-stdin."
        )
    )]
    NoCredentials { profile: String },

    #[error("Could not store the session token: {message}")]
    #[diagnostic(
        code(upwatch::token_store),
        help("Switch storage with: upwatch config set token_store file")
    )]
    TokenStore { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Site '{identifier}' not found")]
    #[diagnostic(
        code(upwatch::not_found),
        help("Run: upwatch sites list to see monitored sites")
    )]
    SiteNotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────

    /// Server-provided (or fallback) error text, shown as-is.
    #[error("{message}")]
    #[diagnostic(code(upwatch::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(upwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(upwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: upwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(upwatch::no_config),
        help(
            "Create a profile with: upwatch config init\n\
             Or pass --server / UPWATCH_SERVER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(upwatch::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(upwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(upwatch::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Internal ────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(upwatch::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotLoggedIn { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::SiteNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Convert a core error, naming the profile in auth-related help.
    pub fn from_core(err: CoreError, profile: &str) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: profile.into(),
                message,
            },
            CoreError::NotLoggedIn => CliError::NotLoggedIn {
                profile: profile.into(),
            },
            other => other.into(),
        }
    }
}

impl From<upwatch_config::ConfigError> for CliError {
    fn from(err: upwatch_config::ConfigError) -> Self {
        match err {
            upwatch_config::ConfigError::Validation { field, reason } => {
                CliError::Validation { field, reason }
            }
            upwatch_config::ConfigError::NoCredentials { profile } => {
                CliError::NoCredentials { profile }
            }
            upwatch_config::ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },

            CoreError::NotLoggedIn => CliError::NotLoggedIn {
                profile: "default".into(),
            },

            CoreError::TokenStore { message } => CliError::TokenStore { message },

            CoreError::SiteNotFound { identifier } => CliError::SiteNotFound { identifier },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let auth = CliError::from_core(
            CoreError::AuthenticationFailed {
                message: "invalid or expired token".into(),
            },
            "work",
        );
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert!(matches!(auth, CliError::AuthFailed { ref profile, .. } if profile == "work"));

        let missing: CliError = CoreError::SiteNotFound {
            identifier: "shop".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let invalid: CliError = CoreError::ValidationFailed {
            message: "enter both a name and a URL".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);

        let api: CliError = CoreError::Api {
            message: "failed to delete site".into(),
            status: Some(500),
        }
        .into();
        assert_eq!(api.exit_code(), exit_code::GENERAL);
        assert_eq!(api.to_string(), "failed to delete site");
    }
}
