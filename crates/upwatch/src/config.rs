//! CLI configuration: thin wrapper around `upwatch_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --token, etc.).

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;
use upwatch_core::{
    AuthToken, Dashboard, DashboardConfig, MemoryTokenStore, TlsVerification, TokenStore,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use upwatch_config::{
    Config, Defaults, Profile, TokenStoreKind, config_path, load_config_or_default, save_config,
};

/// Everything a server-bound command needs.
pub struct Target {
    pub profile_name: String,
    pub profile: Profile,
    pub dashboard: Dashboard,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Fill `--output` / `--color` from the config's `[defaults]` when the
/// flags are absent. Unrecognised values fall back to table / auto.
pub fn apply_display_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = parse_setting(&defaults.output, "defaults.output");
    }
    if global.color.is_none() {
        global.color = parse_setting(&defaults.color, "defaults.color");
    }
}

fn parse_setting<T: ValueEnum>(value: &str, key: &str) -> Option<T> {
    let parsed = T::from_str(value, true).ok();
    if parsed.is_none() {
        warn!(key, value, "ignoring unrecognised config value");
    }
    parsed
}

/// Build the dashboard for the active profile with flag overrides applied.
pub fn resolve_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // No profile -- a server flag alone is enough
        None if global.server.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }

    let dashboard_config = resolve_dashboard_config(&profile, &cfg.defaults, global)?;

    let tokens: Arc<dyn TokenStore> = match global.token {
        Some(ref token) => Arc::new(MemoryTokenStore::with_token(AuthToken::new(token.clone()))),
        None => upwatch_config::token_store_for(&profile, &profile_name, &config_path()),
    };

    let dashboard = Dashboard::new(dashboard_config, tokens)
        .map_err(|e| CliError::from_core(e, &profile_name))?;

    Ok(Target {
        profile_name,
        profile,
        dashboard,
    })
}

/// Translate a `Profile` + global flags into a `DashboardConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DashboardConfig, CliError> {
    let mut config = upwatch_config::profile_to_dashboard_config(profile, defaults)?;

    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    // One-shot invocations never poll.
    config.refresh_interval = Duration::ZERO;

    Ok(config)
}
