//! Shared configuration for the upwatch CLI and TUI.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), token
//! persistence, and translation to `upwatch_core::DashboardConfig`. Both
//! binaries depend on this crate; the CLI adds `GlobalOpts`-aware wrappers
//! on top.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use upwatch_core::{AuthToken, CoreError, DashboardConfig, TlsVerification, TokenStore};

/// Keyring service name for passwords and tokens.
pub const KEYRING_SERVICE: &str = "upwatch";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between background refreshes in the TUI. 0 disables.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    30
}

/// Where a profile keeps its session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// `tokens/{profile}.token` next to the config file.
    #[default]
    File,
    /// System keyring, entry `{profile}/token`.
    Keyring,
}

/// A named server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://status.example.com").
    pub server: String,

    /// Login name.
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    #[serde(default)]
    pub token_store: TokenStoreKind,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override background refresh interval.
    pub refresh_interval: Option<u64>,
}

impl Config {
    /// Name of the profile to use when none is given.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path. `UPWATCH_CONFIG` wins over XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("UPWATCH_CONFIG").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "upwatch", "upwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("upwatch");
    p
}

/// Directory holding file-backed session tokens.
pub fn tokens_dir(config_file: &Path) -> PathBuf {
    config_file
        .parent()
        .map_or_else(|| PathBuf::from("tokens"), |dir| dir.join("tokens"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path. Missing files yield the defaults.
///
/// Nested keys come from double-underscore env vars, e.g.
/// `UPWATCH_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("UPWATCH_")
                .ignore(&["config", "profile", "server", "token", "password", "username"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Username from the profile, then `UPWATCH_USERNAME`.
pub fn resolve_username(profile: &Profile) -> Option<String> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("UPWATCH_USERNAME").ok())
        .filter(|u| !u.trim().is_empty())
}

/// Resolve the login password without CLI flags.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(pw) = std::env::var("UPWATCH_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

// ── Token stores ────────────────────────────────────────────────────

/// Session token kept in the system keyring.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    user: String,
}

impl KeyringTokenStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            user: format!("{profile_name}/token"),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CoreError> {
        keyring::Entry::new(KEYRING_SERVICE, &self.user).map_err(token_error)
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, CoreError> {
        match self.entry()?.get_password() {
            Ok(token) if !token.is_empty() => Ok(Some(AuthToken::new(token))),
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(token_error(e)),
        }
    }

    fn save(&self, token: &AuthToken) -> Result<(), CoreError> {
        self.entry()?.set_password(token.expose()).map_err(token_error)
    }

    fn clear(&self) -> Result<(), CoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(token_error(e)),
        }
    }
}

/// Session token kept in a file readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `tokens/{profile}.token` beside the given config file.
    pub fn for_profile(config_file: &Path, profile_name: &str) -> Self {
        Self::new(tokens_dir(config_file).join(format!("{profile_name}.token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| AuthToken::new(token)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(token_error(e)),
        }
    }

    fn save(&self, token: &AuthToken) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(token_error)?;
        }
        write_private(&self.path, token.expose()).map_err(token_error)
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(token_error(e)),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

fn token_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::TokenStore {
        message: err.to_string(),
    }
}

/// The token store a profile is configured for.
pub fn token_store_for(
    profile: &Profile,
    profile_name: &str,
    config_file: &Path,
) -> Arc<dyn TokenStore> {
    match profile.token_store {
        TokenStoreKind::File => Arc::new(FileTokenStore::for_profile(config_file, profile_name)),
        TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new(profile_name)),
    }
}

// ── Dashboard config ────────────────────────────────────────────────

/// Build a `DashboardConfig` from a profile and the global defaults, no
/// CLI flag overrides.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let url = parse_server_url(&profile.server)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(DashboardConfig {
        url,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        refresh_interval: Duration::from_secs(
            profile.refresh_interval.unwrap_or(defaults.refresh_interval),
        ),
    })
}

/// Parse a server URL; only http and https are accepted.
pub fn parse_server_url(raw: &str) -> Result<url::Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: "server".into(),
        reason,
    };
    let url: url::Url = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid URL: {raw}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}' in {raw}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_overrides_defaults() {
        let profile = Profile {
            server: "https://status.example.com".into(),
            timeout: Some(5),
            refresh_interval: Some(0),
            ..Profile::default()
        };
        let cfg = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert!(cfg.refresh_interval.is_zero());
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn insecure_beats_ca_cert() {
        let profile = Profile {
            server: "https://10.0.0.2".into(),
            insecure: Some(true),
            ca_cert: Some("/etc/ca.pem".into()),
            ..Profile::default()
        };
        let cfg = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_non_http_server() {
        assert!(parse_server_url("ftp://example.com").is_err());
        assert!(parse_server_url("not a url").is_err());
        assert!(parse_server_url(" http://localhost:3000 ").is_ok());
    }

    #[test]
    fn tokens_live_beside_config() {
        let store = FileTokenStore::for_profile(Path::new("/cfg/upwatch/config.toml"), "work");
        assert_eq!(store.path(), Path::new("/cfg/upwatch/tokens/work.token"));
    }
}
