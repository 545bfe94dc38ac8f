// ── API-to-domain type conversions ──
//
// Bridges raw `upwatch_api` records into canonical `upwatch_core::model`
// types. Blank timestamp strings are treated the same as `null`.

use upwatch_api::models::{SiteRecord, StatusSummary as WireSummary};

use crate::model::{Site, SiteId, SiteStatus, StatusSummary, Timestamp};

fn parse_timestamp(raw: Option<String>) -> Option<Timestamp> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Timestamp::parse)
}

impl From<SiteRecord> for Site {
    fn from(r: SiteRecord) -> Self {
        Site {
            id: SiteId::new(r.id),
            name: r.name,
            url: r.url,
            status: SiteStatus::from_last_status(r.last_status),
            last_checked: parse_timestamp(r.last_checked),
            down_since: parse_timestamp(r.down_since),
        }
    }
}

impl From<WireSummary> for StatusSummary {
    fn from(s: WireSummary) -> Self {
        StatusSummary::new(s.total, s.down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(last_status: Option<bool>, down_since: Option<&str>) -> SiteRecord {
        SiteRecord {
            id: 3,
            name: "Blog".into(),
            url: "http://blog.example".into(),
            last_status,
            last_checked: Some("  ".into()),
            down_since: down_since.map(str::to_owned),
        }
    }

    #[test]
    fn never_checked_site_is_down() {
        let site = Site::from(record(None, None));
        assert_eq!(site.status, SiteStatus::Down);
        assert_eq!(site.last_checked, None);
        assert_eq!(site.last_checked_label(), "-");
    }

    #[test]
    fn keeps_down_since() {
        let site = Site::from(record(Some(false), Some("2025-03-01 09:41:00")));
        assert_eq!(site.id, SiteId::new(3));
        assert_eq!(site.down_since_label(), "2025-03-01 09:41:00");
    }

    #[test]
    fn wire_summary_gains_up_count() {
        let s = StatusSummary::from(WireSummary { total: 5, down: 2 });
        assert_eq!(s, StatusSummary { total: 5, up: 3, down: 2 });
    }
}
