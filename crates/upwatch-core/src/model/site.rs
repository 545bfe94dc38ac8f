// ── Site domain types ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::timestamp::Timestamp;

/// Placeholder rendered for absent timestamps.
pub const PLACEHOLDER: &str = "-";

// ── SiteId ──────────────────────────────────────────────────────────

/// Server-assigned numeric site identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(u64);

impl SiteId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for SiteId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ── SiteStatus ──────────────────────────────────────────────────────

/// Two-state health. A site that was never checked counts as down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SiteStatus {
    Up,
    Down,
}

impl SiteStatus {
    pub fn from_last_status(last_status: Option<bool>) -> Self {
        if last_status == Some(true) {
            Self::Up
        } else {
            Self::Down
        }
    }
}

// ── Site ────────────────────────────────────────────────────────────

/// A monitored site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub url: String,
    pub status: SiteStatus,
    pub last_checked: Option<Timestamp>,
    /// Only meaningful while the site is down.
    pub down_since: Option<Timestamp>,
}

impl Site {
    pub fn is_up(&self) -> bool {
        self.status == SiteStatus::Up
    }

    /// Last check time, or `-` when the site was never checked.
    pub fn last_checked_label(&self) -> String {
        self.last_checked
            .as_ref()
            .map_or_else(|| PLACEHOLDER.to_owned(), ToString::to_string)
    }

    /// Outage start, or `-` when the site is up or the server sent nothing.
    pub fn down_since_label(&self) -> String {
        self.visible_down_since()
            .map_or_else(|| PLACEHOLDER.to_owned(), ToString::to_string)
    }

    /// How long the current outage has lasted, when the start time parsed.
    pub fn down_for(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        let since = self.visible_down_since()?.at()?;
        let elapsed = now - since;
        (elapsed >= TimeDelta::zero()).then_some(elapsed)
    }

    fn visible_down_since(&self) -> Option<&Timestamp> {
        if self.is_up() {
            None
        } else {
            self.down_since.as_ref()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn site(status: SiteStatus, down_since: Option<&str>) -> Site {
        Site {
            id: SiteId::new(7),
            name: "Shop".into(),
            url: "https://shop.example".into(),
            status,
            last_checked: None,
            down_since: down_since.map(Timestamp::parse),
        }
    }

    #[test]
    fn status_from_last_status() {
        assert_eq!(SiteStatus::from_last_status(Some(true)), SiteStatus::Up);
        assert_eq!(SiteStatus::from_last_status(Some(false)), SiteStatus::Down);
        assert_eq!(SiteStatus::from_last_status(None), SiteStatus::Down);
    }

    #[test]
    fn status_display_and_parse() {
        assert_eq!(SiteStatus::Up.to_string(), "UP");
        assert_eq!(SiteStatus::Down.to_string(), "DOWN");
        assert_eq!("down".parse::<SiteStatus>().unwrap(), SiteStatus::Down);
    }

    #[test]
    fn labels_use_placeholder() {
        let s = site(SiteStatus::Down, None);
        assert_eq!(s.last_checked_label(), "-");
        assert_eq!(s.down_since_label(), "-");
    }

    #[test]
    fn down_since_hidden_while_up() {
        let s = site(SiteStatus::Up, Some("2025-03-01 09:41:00"));
        assert_eq!(s.down_since_label(), "-");
        assert!(s.down_for(Utc::now()).is_none());
    }

    #[test]
    fn down_for_measures_outage() {
        let s = site(SiteStatus::Down, Some("2025-03-01 09:41:00"));
        let now = Timestamp::parse("2025-03-01 10:11:00").at().unwrap();
        assert_eq!(s.down_for(now), Some(TimeDelta::minutes(30)));
        assert_eq!(s.down_since_label(), "2025-03-01 09:41:00");
    }

    #[test]
    fn site_id_parses_with_whitespace() {
        assert_eq!(" 42 ".parse::<SiteId>().unwrap(), SiteId::new(42));
        assert!("shop".parse::<SiteId>().is_err());
    }
}
