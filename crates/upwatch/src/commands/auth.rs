//! Login / logout handlers.

use std::io::{BufRead, IsTerminal};

use dialoguer::Input;
use secrecy::SecretString;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

pub async fn login(target: &Target, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let username = match args
        .username
        .or_else(|| upwatch_config::resolve_username(&target.profile))
    {
        Some(username) => username,
        None => prompt_username()?,
    };

    let password = if args.password_stdin {
        read_password_stdin()?
    } else {
        resolve_or_prompt_password(target)?
    };

    target.dashboard.login(&username, &password).await?;

    output::notice(
        &format!(
            "✓ Logged in to {} as {}",
            target.dashboard.config().url,
            username.trim()
        ),
        global.quiet,
    );
    Ok(())
}

pub async fn logout(target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    target.dashboard.logout().await?;
    output::notice(
        &format!("✓ Logged out of profile '{}'", target.profile_name),
        global.quiet,
    );
    Ok(())
}

// ── Credential input ────────────────────────────────────────────────

fn prompt_username() -> Result<String, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "username".into(),
            reason: "pass --username or set it on the profile".into(),
        });
    }
    Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)
}

/// First line of stdin, without the trailing newline.
fn read_password_stdin() -> Result<SecretString, CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(password))
}

fn resolve_or_prompt_password(target: &Target) -> Result<SecretString, CliError> {
    match upwatch_config::resolve_password(&target.profile, &target.profile_name) {
        Ok(password) => Ok(password),
        Err(_) if std::io::stdin().is_terminal() => {
            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            Ok(SecretString::from(password))
        }
        Err(e) => Err(e.into()),
    }
}
