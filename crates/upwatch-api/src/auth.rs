// Authentication
//
// Username/password login exchanging credentials for a bearer token.
// The server issues a signed token valid for a few hours; there is no
// logout endpoint, so forgetting the token is the client's job.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{UptimeClient, check_status, parse_json};
use crate::error::Error;
use crate::models::LoginResponse;

/// Bearer token returned by `POST /api/login`.
///
/// Wraps the secret so it never shows up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The wrapped secret.
    pub fn secret(&self) -> &SecretString {
        &self.0
    }

    /// Raw token text, for persisting to a token store.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl UptimeClient {
    /// Exchange a username/password for a bearer token.
    ///
    /// `POST /api/login` with `{"username": "...", "password": "..."}`.
    /// A rejected login surfaces the server's error text as
    /// [`Error::Authentication`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<AuthToken, Error> {
        let url = self.api_url("login")?;

        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self.http().post(url).json(&body).send().await?;

        let resp = match check_status(resp, "login failed").await {
            Ok(resp) => resp,
            // A 400 for missing fields is still a failed login from the user's view.
            Err(Error::Api { status: 400, message }) => {
                return Err(Error::Authentication { message });
            }
            Err(e) => return Err(e),
        };

        let LoginResponse { token } = parse_json(resp).await?;
        if token.trim().is_empty() {
            return Err(Error::Authentication {
                message: "server returned an empty token".into(),
            });
        }

        debug!("login successful");
        Ok(AuthToken::from(token))
    }
}
