// Site endpoints
//
// List, create, and delete monitored sites. All calls are bearer-token
// authenticated; the server owns ordering and URL normalisation.

use tracing::debug;

use crate::auth::AuthToken;
use crate::client::UptimeClient;
use crate::error::Error;
use crate::models::{NewSite, SiteRecord};

impl UptimeClient {
    /// List all monitored sites, newest first.
    ///
    /// `GET /api/sites`
    pub async fn list_sites(&self, token: &AuthToken) -> Result<Vec<SiteRecord>, Error> {
        let url = self.api_url("sites")?;
        debug!("listing sites");
        self.get(url, token, "failed to load sites").await
    }

    /// Start monitoring a new site.
    ///
    /// `POST /api/sites` with `{"name": "...", "url": "..."}`. The server
    /// prefixes `http://` when the URL has no scheme.
    pub async fn create_site(&self, token: &AuthToken, site: &NewSite) -> Result<(), Error> {
        let url = self.api_url("sites")?;
        debug!(name = %site.name, url = %site.url, "creating site");
        self.post(url, token, site, "failed to add site").await
    }

    /// Stop monitoring a site. Its check history goes with it.
    ///
    /// `DELETE /api/sites/{id}`
    pub async fn delete_site(&self, token: &AuthToken, id: u64) -> Result<(), Error> {
        let url = self.api_url(&format!("sites/{id}"))?;
        debug!(id, "deleting site");
        self.delete(url, token, "failed to delete site").await
    }
}
