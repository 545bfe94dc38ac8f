// ── Runtime connection configuration ──
//
// These types describe *how* to reach a monitoring server. They carry
// connection tuning only, never credentials, and never touch disk.
// The CLI/TUI constructs a `DashboardConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use upwatch_api::transport::{TlsMode, TransportConfig};

/// Default interval between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single monitoring server.
///
/// Built by CLI/TUI, passed to `Dashboard` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Server base URL (e.g., `https://status.example.com`). The API lives
    /// under `{url}/api/`.
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often the background task refreshes the store. Zero disables it.
    pub refresh_interval: Duration,
}

impl DashboardConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
