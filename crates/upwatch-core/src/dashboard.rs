// ── Dashboard facade ──
//
// Session lifecycle for one monitoring server: login/logout, data
// refresh into the DataStore, mutations, and an optional background
// refresh task. A 401 from any authenticated call drops the stored token
// and flips the session to `Unauthorized`.
//
// Every login, logout and token rejection bumps a session generation. A
// refresh only publishes its snapshot if the generation it started under
// is still current, so data fetched with a dropped token never lands.

use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use upwatch_api::{AuthToken, NewSite, UptimeClient};

use crate::command::{Command, CommandResult};
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::model::{Site, SiteId, StatusSummary};
use crate::store::DataStore;
use crate::stream::EntityStream;
use crate::token::TokenStore;

const MISSING_CREDENTIALS: &str = "enter a username and password";

// ── SessionState ─────────────────────────────────────────────────

/// Session state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Loading,
    Ready,
    /// Last load failed; the message is shown in place of the data.
    Failed(String),
    /// The server rejected the token. The user must log in again.
    Unauthorized(String),
}

// ── Dashboard ────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DashboardInner>`.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: UptimeClient,
    tokens: Arc<dyn TokenStore>,
    store: Arc<DataStore>,
    session: watch::Sender<SessionState>,
    generation: std::sync::Mutex<u64>,
    cancel: CancellationToken,
    refresh_cancel: Mutex<Option<CancellationToken>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Build a dashboard. No request is made until [`login()`](Self::login)
    /// or [`refresh()`](Self::refresh).
    pub fn new(config: DashboardConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        let client = UptimeClient::new(config.url.clone(), &config.transport())?;
        let initial = if tokens.load()?.is_some() {
            SessionState::Loading
        } else {
            SessionState::LoggedOut
        };
        let (session, _) = watch::channel(initial);

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                tokens,
                store: Arc::new(DataStore::new()),
                session,
                generation: std::sync::Mutex::new(0),
                cancel: CancellationToken::new(),
                refresh_cancel: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Whether a token is currently held.
    pub fn is_logged_in(&self) -> bool {
        matches!(self.inner.tokens.load(), Ok(Some(_)))
    }

    /// Exchange credentials for a token and persist it.
    ///
    /// The username is trimmed; blank credentials are rejected without a
    /// request.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: MISSING_CREDENTIALS.into(),
            });
        }

        let token = self
            .inner
            .client
            .login(username, password)
            .await
            .map_err(CoreError::from)?;

        let mut generation = self.lock_generation();
        *generation += 1;
        self.inner.tokens.save(&token)?;
        self.inner.session.send_replace(SessionState::Loading);
        drop(generation);
        info!(username, "logged in");
        Ok(())
    }

    /// Forget the token and all loaded data. Purely local: the server
    /// keeps no session to end.
    pub async fn logout(&self) -> Result<(), CoreError> {
        self.stop_auto_refresh().await;

        let mut generation = self.lock_generation();
        *generation += 1;
        self.inner.tokens.clear()?;
        self.inner.store.clear();
        self.inner.session.send_replace(SessionState::LoggedOut);
        drop(generation);
        info!("logged out");
        Ok(())
    }

    // ── Data refresh ─────────────────────────────────────────────

    /// Reload the site list and status summary into the store.
    ///
    /// A failing status call is not fatal: the summary is then counted
    /// from the site list. If the user logs out (or back in) while the
    /// requests are in flight, the result is dropped and `NotLoggedIn`
    /// returned.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let started = *self.lock_generation();
        let token = self.token()?;
        if *self.inner.session.borrow() != SessionState::Ready {
            self.inner.session.send_replace(SessionState::Loading);
        }

        let records = match self.inner.client.list_sites(&token).await {
            Ok(records) => records,
            Err(e) => return Err(self.fail_refresh(e, started)),
        };
        let sites: Vec<Site> = records.into_iter().map(Site::from).collect();

        let summary = match self.inner.client.status(&token).await {
            Ok(summary) => StatusSummary::from(summary),
            Err(e) if e.is_auth_expired() => return Err(self.fail_refresh(e, started)),
            Err(e) => {
                warn!(error = %e, "status summary unavailable, counting sites locally");
                StatusSummary::from_sites(&sites)
            }
        };

        let generation = self.lock_generation();
        if *generation != started {
            return Err(Self::discard_refresh());
        }
        self.inner.store.apply_snapshot(sites, summary);
        self.inner.session.send_replace(SessionState::Ready);
        drop(generation);
        debug!(
            sites = self.inner.store.site_count(),
            down = summary.down,
            "data refresh complete"
        );
        Ok(())
    }

    /// Refresh, then return the site list in server order.
    pub async fn list_sites(&self) -> Result<Arc<Vec<Arc<Site>>>, CoreError> {
        self.refresh().await?;
        Ok(self.inner.store.sites_snapshot())
    }

    /// Refresh, then return the status summary. Counted from the site list
    /// when the status endpoint failed.
    pub async fn summary(&self) -> Result<StatusSummary, CoreError> {
        self.refresh().await?;
        let store = &self.inner.store;
        Ok(store.summary().unwrap_or_else(|| {
            StatusSummary::from_sites(store.sites_snapshot().iter().map(Arc::as_ref))
        }))
    }

    // ── Command execution ────────────────────────────────────────

    /// Run a mutation, then reload the site list.
    ///
    /// A failed reload after a successful mutation is logged, not returned:
    /// the mutation itself went through.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let cmd = cmd.normalized()?;
        let token = self.token()?;

        let result = match cmd {
            Command::AddSite { name, url } => {
                let site = NewSite {
                    name: name.clone(),
                    url,
                };
                self.inner
                    .client
                    .create_site(&token, &site)
                    .await
                    .map_err(|e| self.map_api_error(e))?;
                info!(name = %site.name, url = %site.url, "site added");
                CommandResult::SiteAdded { name }
            }
            Command::DeleteSite { id } => {
                self.inner
                    .client
                    .delete_site(&token, id.get())
                    .await
                    .map_err(|e| self.map_api_error(e))?;
                info!(%id, "site deleted");
                CommandResult::SiteDeleted { id }
            }
        };

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "reload after mutation failed");
        }
        Ok(result)
    }

    /// Map a user-supplied id or exact name to a site id.
    ///
    /// Loads the site list first when the store is empty.
    pub async fn resolve_site(&self, identifier: &str) -> Result<SiteId, CoreError> {
        if self.inner.store.site_count() == 0 {
            self.refresh().await?;
        }
        self.inner
            .store
            .find_site(identifier)
            .map(|site| site.id)
            .ok_or_else(|| CoreError::SiteNotFound {
                identifier: identifier.trim().to_owned(),
            })
    }

    // ── Background refresh ───────────────────────────────────────

    /// Spawn a task that refreshes every `interval`. Replaces any running
    /// task. A zero interval only stops the current one.
    pub async fn start_auto_refresh(&self, interval: Duration) {
        self.stop_auto_refresh().await;
        if interval.is_zero() {
            return;
        }

        let cancel = self.inner.cancel.child_token();
        *self.inner.refresh_cancel.lock().await = Some(cancel.clone());

        let dashboard = self.clone();
        let handle = tokio::spawn(refresh_task(dashboard, interval, cancel));
        self.inner.task_handles.lock().await.push(handle);
        debug!(?interval, "auto refresh started");
    }

    pub async fn stop_auto_refresh(&self) {
        if let Some(cancel) = self.inner.refresh_cancel.lock().await.take() {
            cancel.cancel();
        }
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
    }

    /// Stop all background work. The dashboard stays usable for one-shot calls.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.stop_auto_refresh().await;
        debug!("dashboard shut down");
    }

    // ── State observation ────────────────────────────────────────

    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    pub fn sites(&self) -> EntityStream<Site> {
        self.inner.store.subscribe_sites()
    }

    // ── Internals ────────────────────────────────────────────────

    fn token(&self) -> Result<AuthToken, CoreError> {
        self.inner.tokens.load()?.ok_or(CoreError::NotLoggedIn)
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn map_api_error(&self, err: upwatch_api::Error) -> CoreError {
        let mut generation = self.lock_generation();
        self.map_api_error_locked(err, &mut generation)
    }

    /// Caller holds the generation lock.
    fn map_api_error_locked(&self, err: upwatch_api::Error, generation: &mut u64) -> CoreError {
        let expired = err.is_auth_expired();
        let mut mapped = CoreError::from(err);

        if let CoreError::Timeout { timeout_secs } = &mut mapped {
            *timeout_secs = self.inner.config.timeout.as_secs();
        }

        if expired {
            *generation += 1;
            if let Err(e) = self.inner.tokens.clear() {
                warn!(error = %e, "failed to clear rejected token");
            }
            self.inner
                .session
                .send_replace(SessionState::Unauthorized(mapped.to_string()));
            info!("token rejected, session cleared");
        }
        mapped
    }

    fn fail_refresh(&self, err: upwatch_api::Error, started: u64) -> CoreError {
        let mut generation = self.lock_generation();
        if *generation != started {
            return Self::discard_refresh();
        }
        let mapped = self.map_api_error_locked(err, &mut generation);
        if !mapped.needs_login() {
            self.inner
                .session
                .send_replace(SessionState::Failed(mapped.to_string()));
        }
        mapped
    }

    fn discard_refresh() -> CoreError {
        debug!("session changed during refresh, result discarded");
        CoreError::NotLoggedIn
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn refresh_task(dashboard: Dashboard, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match dashboard.refresh().await {
                    Ok(()) => {}
                    Err(e) if e.needs_login() => {
                        debug!("auto refresh stopped: session ended");
                        break;
                    }
                    Err(e) => warn!(error = %e, "periodic refresh failed"),
                }
            }
        }
    }
}
