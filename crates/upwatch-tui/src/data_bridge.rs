//! Data bridge: forwards [`Dashboard`] state changes into the action loop.
//!
//! Runs as a background task. Every site list, summary, refresh time and
//! session transition becomes an [`Action`] on the TUI's channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use upwatch_core::Dashboard;

use crate::action::Action;

/// Push the current snapshots, then forward every change until cancelled.
pub async fn spawn_data_bridge(
    dashboard: Dashboard,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut sites = dashboard.sites();
    let mut summary = dashboard.store().subscribe_summary();
    let mut last_refresh = dashboard.store().subscribe_last_refresh();
    let mut session = dashboard.session_state();

    let _ = action_tx.send(Action::SitesUpdated(sites.current().clone()));
    let _ = action_tx.send(Action::SummaryUpdated(*summary.borrow_and_update()));
    let _ = action_tx.send(Action::LastRefreshUpdated(*last_refresh.borrow_and_update()));
    let _ = action_tx.send(Action::SessionChanged(session.borrow_and_update().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = session.changed() => {
                let state = session.borrow_and_update().clone();
                debug!(?state, "dispatching SessionChanged");
                let _ = action_tx.send(Action::SessionChanged(state));
            }
            Some(list) = sites.changed() => {
                let _ = action_tx.send(Action::SitesUpdated(list));
            }
            Ok(()) = summary.changed() => {
                let counts = *summary.borrow_and_update();
                let _ = action_tx.send(Action::SummaryUpdated(counts));
            }
            Ok(()) = last_refresh.changed() => {
                let at = *last_refresh.borrow_and_update();
                let _ = action_tx.send(Action::LastRefreshUpdated(at));
            }
        }
    }

    debug!("data bridge shut down");
}
