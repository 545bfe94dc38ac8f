use serde::Serialize;

use super::site::Site;

/// Aggregate up/down counts for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: u64,
    pub up: u64,
    pub down: u64,
}

impl StatusSummary {
    pub fn new(total: u64, down: u64) -> Self {
        Self {
            total,
            up: total.saturating_sub(down),
            down,
        }
    }

    /// Count directly from a site list.
    pub fn from_sites<'a>(sites: impl IntoIterator<Item = &'a Site>) -> Self {
        let (mut total, mut down) = (0_u64, 0_u64);
        for site in sites {
            total += 1;
            if !site.is_up() {
                down += 1;
            }
        }
        Self::new(total, down)
    }

    pub fn all_up(&self) -> bool {
        self.down == 0
    }
}
