// Monitoring API HTTP client
//
// Wraps `reqwest::Client` with URL construction under `/api/`, bearer
// authentication, and error-body unwrapping. Endpoint methods are
// implemented as inherent methods in separate files (auth, sites, status)
// to keep this module focused on transport mechanics.

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::AuthToken;
use crate::error::Error;
use crate::models::ApiErrorBody;
use crate::transport::TransportConfig;

/// Raw HTTP client for the monitoring server's REST API.
///
/// Every endpoint lives under `{base}/api/`. The base URL may carry a path
/// prefix when the API sits behind a reverse proxy.
#[derive(Debug, Clone)]
pub struct UptimeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UptimeClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &AuthToken,
        fallback: &str,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.secret().expose_secret())
            .send()
            .await?;

        let resp = check_status(resp, fallback).await?;
        parse_json(resp).await
    }

    /// Send an authenticated POST with a JSON body, discarding the response body.
    pub(crate) async fn post(
        &self,
        url: Url,
        token: &AuthToken,
        body: &(impl Serialize + Sync),
        fallback: &str,
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .bearer_auth(token.secret().expose_secret())
            .json(body)
            .send()
            .await?;

        check_status(resp, fallback).await?;
        Ok(())
    }

    /// Send an authenticated DELETE, discarding the response body.
    pub(crate) async fn delete(
        &self,
        url: Url,
        token: &AuthToken,
        fallback: &str,
    ) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .bearer_auth(token.secret().expose_secret())
            .send()
            .await?;

        check_status(resp, fallback).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into an [`Error`].
///
/// The server reports failures as `{"error": "..."}`; that text is surfaced
/// verbatim. Bodies without it fall back to `fallback`.
pub(crate) async fn check_status(
    resp: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    trace!(%status, body = %preview(&body), "request failed");

    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned());

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication { message });
    }

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Decode a 2xx JSON body, keeping a preview of the raw text on failure.
pub(crate) async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> UptimeClient {
        UptimeClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_joins_under_api() {
        let c = client("http://monitor.local:5000");
        assert_eq!(
            c.api_url("sites").unwrap().as_str(),
            "http://monitor.local:5000/api/sites"
        );
    }

    #[test]
    fn api_url_keeps_proxy_prefix() {
        let c = client("https://example.com/uptime/");
        assert_eq!(
            c.api_url("/sites/7").unwrap().as_str(),
            "https://example.com/uptime/api/sites/7"
        );
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(preview(&long).chars().count(), 200);
        assert_eq!(preview("short"), "short");
    }
}
