//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Fill in the active profile name on auth errors raised deeper down.
pub fn with_profile(err: CliError, profile_name: &str) -> CliError {
    match err {
        CliError::AuthFailed { message, .. } => CliError::AuthFailed {
            profile: profile_name.into(),
            message,
        },
        CliError::NotLoggedIn { .. } => CliError::NotLoggedIn {
            profile: profile_name.into(),
        },
        other => other,
    }
}
