//! Application core: event loop, screen switching, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use upwatch_core::{Command, CommandResult, Dashboard, SessionState};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventRates, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::overlay;

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    dashboard: Dashboard,
    profile_name: String,
    /// Cancels the data bridge on quit.
    data_cancel: CancellationToken,
}

impl App {
    /// Start on the sites screen when a token is already stored, otherwise
    /// on the login form.
    pub fn new(dashboard: Dashboard, profile_name: String, username: Option<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let server = dashboard.config().url.to_string();
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(&server, username).into_iter().collect();

        let active_screen = if dashboard.is_logged_in() {
            ScreenId::Sites
        } else {
            ScreenId::Login
        };

        Self {
            active_screen,
            screens,
            running: true,
            help_visible: false,
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
            dashboard,
            profile_name,
            data_cancel: CancellationToken::new(),
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        {
            let dashboard = self.dashboard.clone();
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(dashboard, tx, cancel).await;
            });
        }

        if self.active_screen == ScreenId::Sites {
            self.start_session();
        }

        let mut events = EventReader::new(EventRates::default());

        info!(profile = %self.profile_name, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        self.dashboard.shutdown().await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then overlays, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };

        if !screen.captures_input() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                _ => {}
            }
        }

        screen.handle_key_event(key)
    }

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(w, h) => debug!(width = w, height = h, "terminal resized"),

            Action::Tick => {
                if let Some((_, shown)) = &self.notification {
                    if shown.elapsed() >= TOAST_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::Render => {}

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),

            // ── Session ───────────────────────────────────────────
            Action::SubmitLogin { username, password } => {
                let dashboard = self.dashboard.clone();
                let tx = self.action_tx.clone();
                let username = username.clone();
                let password = Arc::clone(password);
                tokio::spawn(async move {
                    match dashboard.login(&username, &password).await {
                        Ok(()) => {
                            let _ = tx.send(Action::LoginSucceeded);
                        }
                        Err(e) => {
                            warn!(error = %e, "login failed");
                            let _ = tx.send(Action::LoginFailed(e.to_string()));
                        }
                    }
                });
            }

            Action::LoginSucceeded => {
                self.broadcast(action)?;
                self.switch_screen(ScreenId::Sites);
                self.start_session();
            }

            Action::Logout => {
                let dashboard = self.dashboard.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = dashboard.logout().await {
                        warn!(error = %e, "logout failed");
                        let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                    }
                });
            }

            Action::SessionChanged(state) => {
                if matches!(
                    state,
                    SessionState::LoggedOut | SessionState::Unauthorized(_)
                ) {
                    self.pending_confirm = None;
                    self.switch_screen(ScreenId::Login);
                }
                self.broadcast(action)?;
            }

            // ── Sites ─────────────────────────────────────────────
            Action::RequestRefresh => {
                let dashboard = self.dashboard.clone();
                tokio::spawn(async move {
                    // Failures land in the session state.
                    if let Err(e) = dashboard.refresh().await {
                        debug!(error = %e, "manual refresh failed");
                    }
                });
            }

            Action::SubmitAddSite { name, url } => {
                let dashboard = self.dashboard.clone();
                let tx = self.action_tx.clone();
                let (name, url) = (name.clone(), url.clone());
                tokio::spawn(async move {
                    let result = match Command::add_site(&name, &url) {
                        Ok(cmd) => dashboard.execute(cmd).await,
                        Err(e) => Err(e),
                    };
                    match result {
                        Ok(CommandResult::SiteAdded { name }) => {
                            let _ = tx.send(Action::Notify(Notification::success(format!(
                                "Now monitoring {name}"
                            ))));
                            let _ = tx.send(Action::SiteAdded(name));
                        }
                        Ok(other) => debug!(?other, "unexpected add result"),
                        Err(e) => {
                            let _ = tx.send(Action::AddSiteFailed(e.to_string()));
                        }
                    }
                });
            }

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => self.pending_confirm = None,

            other => self.broadcast(other)?,
        }

        Ok(())
    }

    /// Data and result actions go to every screen so the inactive one is
    /// current when it becomes visible.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        let mut follow_ups = Vec::new();
        for screen in self.screens.values_mut() {
            if let Some(next) = screen.update(action)? {
                follow_ups.push(next);
            }
        }
        for next in follow_ups {
            self.action_tx.send(next)?;
        }
        Ok(())
    }

    fn switch_screen(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.active_screen = target;
        self.help_visible = false;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    /// Initial load, then periodic refresh at the profile's interval.
    fn start_session(&self) {
        let dashboard = self.dashboard.clone();
        tokio::spawn(async move {
            match dashboard.refresh().await {
                Ok(()) => {}
                Err(e) if e.needs_login() => return,
                Err(e) => warn!(error = %e, "initial load failed"),
            }
            if !dashboard.is_logged_in() {
                debug!("logged out during initial load, not polling");
                return;
            }
            let interval = dashboard.config().refresh_interval;
            dashboard.start_auto_refresh(interval).await;
        });
    }

    fn execute_confirm(&self, confirm: ConfirmAction) {
        match confirm {
            ConfirmAction::DeleteSite { id, name } => {
                let dashboard = self.dashboard.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let notification = match dashboard.execute(Command::DeleteSite { id }).await {
                        Ok(_) => Notification::success(format!("Deleted {name}")),
                        Err(e) => {
                            warn!(error = %e, %id, "delete failed");
                            Notification::error(e.to_string())
                        }
                    };
                    let _ = tx.send(Action::Notify(notification));
                });
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get(&ScreenId::Login) {
                screen.render(frame, area);
            }
            return;
        }

        let layout = Layout::vertical([
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_status_bar(frame, layout[1]);

        // Last drawn is topmost.
        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if let Some(ref confirm) = self.pending_confirm {
            Self::render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" ● ", Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled(
                self.dashboard.config().url.to_string(),
                Style::default().fg(theme::DIM_WHITE),
            ),
            Span::styled(
                format!("  [{}]", self.profile_name),
                Style::default().fg(theme::BORDER_GRAY),
            ),
            Span::styled(" │ ? help  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let dialog = overlay::centered_rect(area, 50, 5);
        let inner = overlay::panel(
            frame,
            dialog,
            "Confirm",
            Style::default().fg(theme::ELECTRIC_YELLOW),
        );

        let text = vec![
            Line::from(Span::styled(
                format!("  {confirm}"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 60)
            .min(area.width.saturating_sub(2));
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 1); // above status bar
        let toast = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        };

        let inner = overlay::panel(frame, toast, "", Style::default().fg(border_color));
        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help = overlay::centered_rect(area, 44, 14);
        let inner = overlay::panel(frame, help, "Keyboard Shortcuts", theme::border_focused());

        let entry = |key: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };

        let text = vec![
            Line::from(""),
            entry("j/k ↑/↓", "Move selection"),
            entry("g/G", "Top / bottom"),
            entry("a", "Add site"),
            entry("d", "Delete selected site"),
            entry("r", "Refresh now"),
            entry("L", "Log out"),
            entry("?", "This help"),
            entry("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled("         Esc or ? to close", theme::key_hint())),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use upwatch_core::{
        AuthToken, DashboardConfig, MemoryTokenStore, Site, SiteId, SiteStatus, TokenStore,
    };

    fn app(token: Option<&str>) -> App {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(AuthToken::new(t.to_owned())),
            None => MemoryTokenStore::new(),
        };
        let tokens: Arc<dyn TokenStore> = Arc::new(store);
        let config = DashboardConfig::new("http://127.0.0.1:9".parse().unwrap());
        let dashboard = Dashboard::new(config, tokens).unwrap();
        App::new(dashboard, "default".into(), None)
    }

    fn key(app: &mut App, code: KeyCode) {
        if let Some(action) = app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
        {
            app.process_action(&action).unwrap();
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn with_sites(app: &mut App) {
        let sites = vec![Arc::new(Site {
            id: SiteId::new(4),
            name: "blog".into(),
            url: "https://blog.example".into(),
            status: SiteStatus::Down,
            last_checked: None,
            down_since: None,
        })];
        app.process_action(&Action::SitesUpdated(Arc::new(sites)))
            .unwrap();
        app.process_action(&Action::SessionChanged(SessionState::Ready))
            .unwrap();
    }

    #[test]
    fn starts_on_login_without_token() {
        let app = app(None);
        assert_eq!(app.active_screen, ScreenId::Login);
        let text = screen_text(&app);
        assert!(text.contains("Username"));
        assert!(text.contains("http://127.0.0.1:9/"));
    }

    #[test]
    fn starts_on_sites_with_token() {
        let app = app(Some("tok"));
        assert_eq!(app.active_screen, ScreenId::Sites);
    }

    #[test]
    fn q_types_into_login_form_instead_of_quitting() {
        let mut app = app(None);
        key(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        key(&mut app, KeyCode::Esc);
        assert!(!app.running);
    }

    #[test]
    fn unauthorized_session_returns_to_login() {
        let mut app = app(Some("tok"));
        with_sites(&mut app);
        key(&mut app, KeyCode::Char('d'));
        assert!(app.pending_confirm.is_some());

        app.process_action(&Action::SessionChanged(SessionState::Unauthorized(
            "Authentication failed: invalid or expired token".into(),
        )))
        .unwrap();

        assert_eq!(app.active_screen, ScreenId::Login);
        assert!(app.pending_confirm.is_none());
        assert!(screen_text(&app).contains("Session expired"));
    }

    #[test]
    fn confirm_dialog_captures_input_until_answered() {
        let mut app = app(Some("tok"));
        with_sites(&mut app);
        key(&mut app, KeyCode::Char('d'));
        assert!(screen_text(&app).contains("Stop monitoring blog?"));

        // Other keys are swallowed while the dialog is open.
        key(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        key(&mut app, KeyCode::Char('n'));
        assert!(app.pending_confirm.is_none());
        assert!(!screen_text(&app).contains("Stop monitoring"));
    }

    #[test]
    fn help_overlay_toggles() {
        let mut app = app(Some("tok"));
        with_sites(&mut app);
        key(&mut app, KeyCode::Char('?'));
        assert!(screen_text(&app).contains("Keyboard Shortcuts"));
        key(&mut app, KeyCode::Esc);
        assert!(!app.help_visible);
    }

    #[test]
    fn toast_expires_on_tick() {
        let mut app = app(Some("tok"));
        app.notification = Some((
            Notification::success("Deleted blog"),
            Instant::now().checked_sub(TOAST_TTL).unwrap(),
        ));
        app.process_action(&Action::Tick).unwrap();
        assert!(app.notification.is_none());
    }
}
