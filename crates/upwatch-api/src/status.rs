// Status endpoint
//
// Aggregate up/down counts computed server-side.

use tracing::debug;

use crate::auth::AuthToken;
use crate::client::UptimeClient;
use crate::error::Error;
use crate::models::StatusSummary;

impl UptimeClient {
    /// Fetch total and down counts across all sites.
    ///
    /// `GET /api/status`. Sites that were never checked count as down.
    pub async fn status(&self, token: &AuthToken) -> Result<StatusSummary, Error> {
        let url = self.api_url("status")?;
        debug!("fetching status summary");
        self.get(url, token, "failed to load status").await
    }
}
