// Wire models for the monitoring API.
//
// These mirror the server's JSON verbatim. Timestamps stay as strings here;
// `upwatch-core` decides how to interpret them.

use serde::{Deserialize, Deserializer, Serialize};

/// A monitored site as returned by `GET /api/sites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: u64,
    pub name: String,
    pub url: String,
    /// Last check result. The server stores a `TINYINT(1)`, so this arrives
    /// as `true`/`false`, `1`/`0`, or `null` for never-checked sites.
    #[serde(default, deserialize_with = "bool_like")]
    pub last_status: Option<bool>,
    /// `"YYYY-MM-DD HH:MM:SS"` (naive UTC) or `null`.
    #[serde(default)]
    pub last_checked: Option<String>,
    /// Set when the site transitioned to down; cleared when it recovers.
    #[serde(default)]
    pub down_since: Option<String>,
}

/// Aggregate counts from `GET /api/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: u64,
    pub down: u64,
}

impl StatusSummary {
    /// Sites whose last check succeeded.
    pub fn up(&self) -> u64 {
        self.total.saturating_sub(self.down)
    }
}

/// Request body for `POST /api/sites`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSite {
    pub name: String,
    pub url: String,
}

/// `POST /api/login` success body.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

/// Error body shape used by every endpoint: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn bool_like<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BoolLike> = Option::deserialize(deserializer)?;
    Ok(raw.map(|v| match v {
        BoolLike::Bool(b) => b,
        BoolLike::Int(n) => n != 0,
        BoolLike::Text(s) => matches!(s.trim(), "1" | "true" | "True" | "TRUE"),
    }))
}
