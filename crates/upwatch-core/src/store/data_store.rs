use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Site, SiteId, StatusSummary};
use crate::stream::EntityStream;

/// Latest known server state.
///
/// Every refresh replaces the whole snapshot; the server order of the
/// site list is preserved.
pub struct DataStore {
    sites: watch::Sender<Arc<Vec<Arc<Site>>>>,
    summary: watch::Sender<Option<StatusSummary>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        let (sites, _) = watch::channel(Arc::new(Vec::new()));
        let (summary, _) = watch::channel(None);
        let (last_refresh, _) = watch::channel(None);
        Self {
            sites,
            summary,
            last_refresh,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    pub(crate) fn apply_snapshot(&self, sites: Vec<Site>, summary: StatusSummary) {
        let sites: Vec<Arc<Site>> = sites.into_iter().map(Arc::new).collect();
        self.sites.send_replace(Arc::new(sites));
        self.summary.send_replace(Some(summary));
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    pub(crate) fn clear(&self) {
        self.sites.send_replace(Arc::new(Vec::new()));
        self.summary.send_replace(None);
        self.last_refresh.send_replace(None);
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn sites_snapshot(&self) -> Arc<Vec<Arc<Site>>> {
        self.sites.borrow().clone()
    }

    pub fn summary(&self) -> Option<StatusSummary> {
        *self.summary.borrow()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub fn site_count(&self) -> usize {
        self.sites.borrow().len()
    }

    /// Find a site by numeric id or exact name.
    pub fn find_site(&self, identifier: &str) -> Option<Arc<Site>> {
        let identifier = identifier.trim();
        let sites = self.sites.borrow();
        let by_id = identifier
            .parse::<SiteId>()
            .ok()
            .and_then(|id| sites.iter().find(|s| s.id == id));
        by_id
            .or_else(|| sites.iter().find(|s| s.name == identifier))
            .cloned()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_sites(&self) -> EntityStream<Site> {
        EntityStream::new(self.sites.subscribe())
    }

    pub fn subscribe_summary(&self) -> watch::Receiver<Option<StatusSummary>> {
        self.summary.subscribe()
    }

    pub fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::SiteStatus;

    fn site(id: u64, name: &str, status: SiteStatus) -> Site {
        Site {
            id: SiteId::new(id),
            name: name.into(),
            url: format!("https://{name}.example"),
            status,
            last_checked: None,
            down_since: None,
        }
    }

    #[test]
    fn snapshot_preserves_order() {
        let store = DataStore::new();
        store.apply_snapshot(
            vec![site(9, "b", SiteStatus::Up), site(2, "a", SiteStatus::Down)],
            StatusSummary::new(2, 1),
        );

        let ids: Vec<_> = store.sites_snapshot().iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![9, 2]);
        assert_eq!(store.summary(), Some(StatusSummary::new(2, 1)));
        assert!(store.last_refresh().is_some());
    }

    #[test]
    fn find_by_id_then_name() {
        let store = DataStore::new();
        store.apply_snapshot(
            vec![site(1, "12", SiteStatus::Up), site(12, "shop", SiteStatus::Up)],
            StatusSummary::new(2, 0),
        );

        assert_eq!(store.find_site("12").unwrap().name, "shop");
        assert_eq!(store.find_site("shop").unwrap().id, SiteId::new(12));
        assert!(store.find_site("missing").is_none());
    }

    #[test]
    fn clear_empties_everything() {
        let store = DataStore::new();
        store.apply_snapshot(vec![site(1, "a", SiteStatus::Up)], StatusSummary::new(1, 0));
        store.clear();
        assert_eq!(store.site_count(), 0);
        assert_eq!(store.summary(), None);
        assert_eq!(store.last_refresh(), None);
    }

    #[tokio::test]
    async fn stream_sees_updates() {
        let store = DataStore::new();
        let mut stream = store.subscribe_sites();
        assert!(stream.current().is_empty());

        store.apply_snapshot(vec![site(1, "a", SiteStatus::Up)], StatusSummary::new(1, 0));
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.current().len(), 1);
    }
}
