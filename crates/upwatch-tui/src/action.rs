//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use upwatch_core::{SessionState, Site, SiteId, StatusSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast shown in the bottom-right corner for a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Destructive operations that wait for a y/n answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSite { id: SiteId, name: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteSite { name, .. } => write!(f, "Stop monitoring {name}?"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data events (from the data bridge) ────────────────────────
    SitesUpdated(Arc<Vec<Arc<Site>>>),
    SummaryUpdated(Option<StatusSummary>),
    LastRefreshUpdated(Option<DateTime<Utc>>),
    SessionChanged(SessionState),

    // ── Session ───────────────────────────────────────────────────
    SubmitLogin {
        username: String,
        password: Arc<SecretString>,
    },
    LoginSucceeded,
    LoginFailed(String),
    Logout,

    // ── Sites ─────────────────────────────────────────────────────
    RequestRefresh,
    SubmitAddSite { name: String, url: String },
    SiteAdded(String),
    AddSiteFailed(String),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notification),
}
