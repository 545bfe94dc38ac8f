//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile, TokenStoreKind};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const SETTABLE_KEYS: &str =
    "server, username, password_env, token_store, ca_cert, insecure, timeout, refresh_interval";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "refresh_interval = {}", cfg.defaults.refresh_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        let store = match p.token_store {
            TokenStoreKind::File => "file",
            TokenStoreKind::Keyring => "keyring",
        };
        let _ = writeln!(out, "token_store = \"{store}\"");
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.refresh_interval {
            let _ = writeln!(out, "refresh_interval = {interval}");
        }
    }

    out.trim_end().to_owned()
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

fn parse_number(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Prompt for a password and store it in the keyring or return it for
/// plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_password_storage(profile_name: &str) -> Result<Option<String>, CliError> {
    let pass = rpassword::prompt_password("Password (empty to log in interactively): ")
        .map_err(prompt_err)?;
    if pass.is_empty() {
        return Ok(None);
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        upwatch_config::store_password(profile_name, &SecretString::from(pass))?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(pass))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("upwatch -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Server URL
            let server: String = Input::new()
                .with_prompt("Server URL")
                .default("http://localhost:3000".into())
                .validate_with(|input: &String| {
                    upwatch_config::parse_server_url(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Username
            let username: String = Input::new()
                .with_prompt("Username")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let username = Some(username.trim().to_owned()).filter(|u| !u.is_empty());

            // 4. Password
            let password = prompt_password_storage(&profile_name)?;

            // 5. Token storage
            let token_choices = &[
                "File next to the config (default)",
                "System keyring",
            ];
            let token_store = match Select::new()
                .with_prompt("Where to keep the session token?")
                .items(token_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => TokenStoreKind::File,
                _ => TokenStoreKind::Keyring,
            };

            // 6. Build profile and config
            let profile = Profile {
                server: server.trim().to_owned(),
                username,
                password,
                token_store,
                ..Profile::default()
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };

            // 7. Write config
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: upwatch login");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("****".into());
                }
            }
            let out = output::render_single(global.output_format(), &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "server" => {
                    upwatch_config::parse_server_url(&value)?;
                    profile.server = value.trim().to_owned();
                }
                "username" => profile.username = Some(value),
                "password_env" | "password-env" => profile.password_env = Some(value),
                "token_store" | "token-store" => {
                    profile.token_store = match value.as_str() {
                        "file" => TokenStoreKind::File,
                        "keyring" => TokenStoreKind::Keyring,
                        _ => {
                            return Err(CliError::Validation {
                                field: "token_store".into(),
                                reason: "must be 'file' or 'keyring'".into(),
                            });
                        }
                    };
                }
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "timeout" => profile.timeout = Some(parse_number("timeout", &value)?),
                "refresh_interval" | "refresh-interval" => {
                    profile.refresh_interval = Some(parse_number("refresh_interval", &value)?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
                    });
                }
            }

            save_config(&cfg)?;
            output::notice(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.active_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: upwatch config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            upwatch_config::store_password(&profile_name, &SecretString::from(secret))?;

            output::notice(
                &format!("✓ Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_config_masks_password() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                server: "http://localhost:3000".into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg);
        assert!(text.contains("[profiles.home]"));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("token_store = \"file\""));
    }
}
