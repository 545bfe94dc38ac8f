//! Human-readable durations for outage lengths and refresh age.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Outage length rounded down to whole minutes, e.g. "3h 12m".
/// Anything under a minute shows seconds.
pub fn fmt_down_for(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds().max(0).unsigned_abs();
    let rounded = if secs < 60 { secs } else { secs - secs % 60 };
    humantime::format_duration(Duration::from_secs(rounded)).to_string()
}

/// "just now" for the first few seconds, then "42s ago" style.
pub fn fmt_refreshed(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 2 {
        return "just now".into();
    }
    format!("{} ago", fmt_down_for(now - at))
}

/// Down-since cell: the timestamp, plus the outage length when known.
pub fn down_since_cell(label: &str, elapsed: Option<TimeDelta>) -> String {
    match elapsed {
        Some(d) => format!("{label} ({})", fmt_down_for(d)),
        None => label.to_owned(),
    }
}
