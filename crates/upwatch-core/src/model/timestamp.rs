// ── Server timestamps ──
//
// The server sends timestamps as naive `YYYY-MM-DD HH:MM:SS` strings,
// but proxies and other deployments may hand back RFC 3339 or HTTP-date
// forms. We keep the raw text and parse what we can.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

const SQL_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A server-reported instant.
///
/// Naive values are taken as UTC. Unparseable input is kept verbatim and
/// displayed as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    at: Option<DateTime<Utc>>,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            raw: trimmed.to_owned(),
            at: parse_instant(trimmed),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        self.at
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    for fmt in SQL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.at {
            Some(at) => write!(f, "{}", at.format(DISPLAY_FORMAT)),
            None => f.write_str(&self.raw),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
