// upwatch-api: Async Rust client for the upwatch uptime-monitoring REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod sites;
pub mod status;
pub mod transport;

pub use auth::AuthToken;
pub use client::UptimeClient;
pub use error::Error;
pub use models::{NewSite, SiteRecord, StatusSummary};
pub use transport::{TlsMode, TransportConfig};
