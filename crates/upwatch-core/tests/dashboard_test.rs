#![allow(clippy::unwrap_used)]
// Integration tests for `Dashboard` against a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use upwatch_core::{
    AuthToken, Command, CommandResult, CoreError, Dashboard, DashboardConfig, MemoryTokenStore,
    SessionState, SiteId, SiteStatus, StatusSummary, TokenStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(token: Option<&str>) -> (MockServer, Dashboard, Arc<MemoryTokenStore>) {
    let server = MockServer::start().await;
    let tokens = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(AuthToken::new(t)),
        None => MemoryTokenStore::new(),
    });
    let config = DashboardConfig::new(Url::parse(&server.uri()).unwrap());
    let dashboard = Dashboard::new(config, tokens.clone()).unwrap();
    (server, dashboard, tokens)
}

fn sites_body() -> serde_json::Value {
    json!([
        { "id": 12, "name": "Shop", "url": "https://shop.example", "last_status": 1,
          "last_checked": "2025-03-01 10:00:00", "down_since": null },
        { "id": 4, "name": "Blog", "url": "http://blog.example", "last_status": 0,
          "last_checked": "2025-03-01 10:00:02", "down_since": "2025-03-01 09:41:00" },
        { "id": 1, "name": "New", "url": "http://new.example", "last_status": null,
          "last_checked": null, "down_since": null }
    ])
}

async fn mount_sites(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sites_body()))
        .mount(server)
        .await;
}

fn secret(s: &str) -> secrecy::SecretString {
    s.to_string().into()
}

// ── Login / logout ──────────────────────────────────────────────────

#[tokio::test]
async fn login_trims_username_and_stores_token() {
    let (server, dashboard, tokens) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "admin", "password": " pw " })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!dashboard.is_logged_in());
    dashboard.login("  admin ", &secret(" pw ")).await.unwrap();

    assert!(dashboard.is_logged_in());
    assert_eq!(tokens.load().unwrap().unwrap().expose(), "tok");
}

#[tokio::test]
async fn login_with_blank_fields_sends_nothing() {
    let (server, dashboard, _) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok" })))
        .expect(0)
        .mount(&server)
        .await;

    for (user, pass) in [("   ", "pw"), ("admin", "")] {
        let err = dashboard.login(user, &secret(pass)).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }), "{err:?}");
    }
    assert!(!dashboard.is_logged_in());
}

#[tokio::test]
async fn login_rejected_keeps_logged_out() {
    let (server, dashboard, _) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "wrong username or password" })),
        )
        .mount(&server)
        .await;

    let err = dashboard.login("admin", &secret("bad")).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Authentication failed: wrong username or password"
    );
    assert!(!dashboard.is_logged_in());
}

#[tokio::test]
async fn logout_clears_token_and_store() {
    let (server, dashboard, tokens) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;

    dashboard.refresh().await.unwrap();
    assert_eq!(dashboard.store().sites_snapshot().len(), 3);

    dashboard.logout().await.unwrap();
    assert!(tokens.load().unwrap().is_none());
    assert!(dashboard.store().sites_snapshot().is_empty());
    assert_eq!(*dashboard.session_state().borrow(), SessionState::LoggedOut);
}

#[tokio::test]
async fn logout_during_refresh_discards_result() {
    let (server, dashboard, tokens) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sites_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;

    let in_flight = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    dashboard.logout().await.unwrap();

    let err = in_flight.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::NotLoggedIn), "{err:?}");
    assert!(tokens.load().unwrap().is_none());
    assert!(dashboard.store().sites_snapshot().is_empty());
    assert_eq!(dashboard.store().summary(), None);
    assert_eq!(*dashboard.session_state().borrow(), SessionState::LoggedOut);
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_without_token_sends_nothing() {
    let (server, dashboard, _) = setup(None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = dashboard.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::NotLoggedIn));
}

#[tokio::test]
async fn refresh_loads_sites_and_summary() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;

    let sites = dashboard.list_sites().await.unwrap();

    let ids: Vec<_> = sites.iter().map(|s| s.id.get()).collect();
    assert_eq!(ids, vec![12, 4, 1]);
    assert_eq!(sites[0].status, SiteStatus::Up);
    assert_eq!(sites[2].status, SiteStatus::Down);
    assert_eq!(sites[1].down_since_label(), "2025-03-01 09:41:00");
    assert_eq!(
        dashboard.store().summary(),
        Some(StatusSummary { total: 3, up: 1, down: 2 })
    );
    assert_eq!(*dashboard.session_state().borrow(), SessionState::Ready);
}

#[tokio::test]
async fn summary_falls_back_to_site_counts_when_status_fails() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let summary = dashboard.summary().await.unwrap();
    assert_eq!(summary, StatusSummary { total: 3, up: 1, down: 2 });
    assert_eq!(*dashboard.session_state().borrow(), SessionState::Ready);
}

#[tokio::test]
async fn summary_reloads_before_answering() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = dashboard.summary().await.unwrap();
    assert_eq!(summary, StatusSummary { total: 3, up: 1, down: 2 });
    assert_eq!(dashboard.store().sites_snapshot().len(), 3);
}

#[tokio::test]
async fn load_failure_sets_failed_state() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = dashboard.refresh().await.unwrap_err();
    assert_eq!(err.to_string(), "failed to load sites");
    assert_eq!(
        *dashboard.session_state().borrow(),
        SessionState::Failed("failed to load sites".into())
    );
    assert!(dashboard.is_logged_in());
}

#[tokio::test]
async fn unauthorized_clears_token() {
    let (server, dashboard, tokens) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid or expired token" })),
        )
        .mount(&server)
        .await;

    let err = dashboard.refresh().await.unwrap_err();
    assert!(err.needs_login());
    assert!(tokens.load().unwrap().is_none());
    assert!(matches!(
        *dashboard.session_state().borrow(),
        SessionState::Unauthorized(_)
    ));
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn add_site_rejects_blank_input_without_request() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = dashboard
        .execute(Command::AddSite {
            name: "  ".into(),
            url: "x.example".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "enter both a name and a URL");
}

#[tokio::test]
async fn add_site_posts_trimmed_fields_and_reloads() {
    let (server, dashboard, _) = setup(Some("tok")).await;

    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .and(body_json(json!({ "name": "Docs", "url": "docs.example" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sites_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;

    let result = dashboard
        .execute(Command::AddSite {
            name: " Docs ".into(),
            url: " docs.example ".into(),
        })
        .await
        .unwrap();

    assert_eq!(result, CommandResult::SiteAdded { name: "Docs".into() });
    assert_eq!(dashboard.store().sites_snapshot().len(), 3);
}

#[tokio::test]
async fn add_site_surfaces_server_error() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    Mock::given(method("POST"))
        .and(path("/api/sites"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid URL" })),
        )
        .mount(&server)
        .await;

    let err = dashboard
        .execute(Command::add_site("Docs", "::").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid URL");
}

#[tokio::test]
async fn delete_resolves_name_then_deletes() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sites/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let id = dashboard.resolve_site("Blog").await.unwrap();
    assert_eq!(id, SiteId::new(4));

    let result = dashboard.execute(Command::DeleteSite { id }).await.unwrap();
    assert_eq!(result, CommandResult::SiteDeleted { id });
}

#[tokio::test]
async fn resolve_unknown_site() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;

    let err = dashboard.resolve_site("nope").await.unwrap_err();
    assert!(matches!(err, CoreError::SiteNotFound { ref identifier } if identifier == "nope"));
}

// ── Background refresh ──────────────────────────────────────────────

#[tokio::test]
async fn auto_refresh_updates_stream() {
    let (server, dashboard, _) = setup(Some("tok")).await;
    mount_sites(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3, "down": 2 })))
        .mount(&server)
        .await;

    let mut stream = dashboard.sites();
    assert!(stream.current().is_empty());

    dashboard.start_auto_refresh(Duration::from_millis(50)).await;
    let snap = tokio::time::timeout(Duration::from_secs(5), stream.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snap.len(), 3);

    dashboard.shutdown().await;
}
