//! Session and data layer between `upwatch-api` and UI consumers (CLI / TUI).
//!
//! - **[`Dashboard`]**: Central facade: [`login()`](Dashboard::login) trades
//!   credentials for a bearer token kept in a [`TokenStore`],
//!   [`refresh()`](Dashboard::refresh) pulls the site list and status summary
//!   into the [`DataStore`], and [`execute()`](Dashboard::execute) runs
//!   add/delete mutations followed by a reload.
//!   [`start_auto_refresh()`](Dashboard::start_auto_refresh) keeps the store
//!   current for the TUI.
//!
//! - **[`DataStore`]**: `watch`-channel snapshots of the site list, the
//!   latest [`StatusSummary`], and the last refresh time.
//!
//! - **[`EntityStream<T>`]**: Subscription handle vended by the `DataStore`.
//!   Exposes `current()` / `changed()` for reactive rendering.
//!
//! - **Domain model** ([`model`]): [`Site`] with a two-state [`SiteStatus`]
//!   and opaque-but-parsed [`Timestamp`]s.

pub mod command;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;
pub mod token;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{DashboardConfig, TlsVerification};
pub use dashboard::{Dashboard, SessionState};
pub use error::CoreError;
pub use store::DataStore;
pub use stream::EntityStream;
pub use token::{MemoryTokenStore, TokenStore};

pub use model::{Site, SiteId, SiteStatus, StatusSummary, Timestamp};

/// Bearer token type, re-exported so token stores don't depend on the API crate.
pub use upwatch_api::AuthToken;
