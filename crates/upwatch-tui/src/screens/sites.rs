//! Sites screen: summary header, monitored-site table, add-site form.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use upwatch_core::{SessionState, Site, StatusSummary};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::input::TextField;
use crate::widgets::{overlay, time_fmt};

// ── Add-site form ───────────────────────────────────────────────────

struct AddSiteForm {
    name: TextField,
    url: TextField,
    on_url: bool,
    error: Option<String>,
    submitting: bool,
}

impl AddSiteForm {
    fn new() -> Self {
        Self {
            name: TextField::new("Name"),
            url: TextField::new("URL"),
            on_url: false,
            error: None,
            submitting: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.on_url = !self.on_url;
            }
            KeyCode::Enter if !self.on_url => self.on_url = true,
            KeyCode::Enter => {
                if self.submitting {
                    return None;
                }
                self.submitting = true;
                self.error = None;
                return Some(Action::SubmitAddSite {
                    name: self.name.value().to_owned(),
                    url: self.url.value().to_owned(),
                });
            }
            _ if self.submitting => {}
            _ => {
                let field = if self.on_url {
                    &mut self.url
                } else {
                    &mut self.name
                };
                field.handle_key(key);
            }
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = overlay::centered_rect(area, 60, 14);
        let inner = overlay::panel(frame, popup, "Add site", theme::border_focused());

        let layout = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

        self.name.render(frame, layout[0], !self.on_url);
        self.url.render(frame, layout[1], self.on_url);

        let status = if self.submitting {
            Span::styled("Saving…", Style::default().fg(theme::ELECTRIC_YELLOW))
        } else if let Some(ref err) = self.error {
            Span::styled(err.as_str(), theme::error_text())
        } else {
            Span::raw("")
        };
        frame.render_widget(Paragraph::new(status), layout[2]);

        let hints = Line::from(vec![
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("switch field  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("save  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]);
        frame.render_widget(
            Paragraph::new(hints).alignment(Alignment::Center),
            layout[4],
        );
    }
}

// ── Screen ──────────────────────────────────────────────────────────

pub struct SitesScreen {
    focused: bool,
    sites: Arc<Vec<Arc<Site>>>,
    summary: Option<StatusSummary>,
    last_refresh: Option<DateTime<Utc>>,
    session: SessionState,
    table_state: TableState,
    form: Option<AddSiteForm>,
}

impl SitesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            sites: Arc::new(Vec::new()),
            summary: None,
            last_refresh: None,
            session: SessionState::Loading,
            table_state: TableState::default(),
            form: None,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_site(&self) -> Option<&Arc<Site>> {
        self.sites.get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        if self.sites.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(self.sites.len() - 1)));
        }
    }

    fn move_selection(&mut self, down: bool) {
        let current = self.selected_index();
        let next = if down {
            current.saturating_add(1)
        } else {
            current.saturating_sub(1)
        };
        self.select(next);
    }

    fn request_delete(&self) -> Option<Action> {
        let site = self.selected_site()?;
        Some(Action::ShowConfirm(ConfirmAction::DeleteSite {
            id: site.id,
            name: site.name.clone(),
        }))
    }

    // ── Rendering helpers ───────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let counts = self
            .summary
            .unwrap_or_else(|| StatusSummary::from_sites(self.sites.iter().map(Arc::as_ref)));

        let mut spans = vec![
            Span::styled(" Total ", Style::default().fg(theme::DIM_WHITE)),
            Span::styled(counts.total.to_string(), theme::title_style()),
            Span::styled("   Up ", Style::default().fg(theme::DIM_WHITE)),
            Span::styled(counts.up.to_string(), theme::status_style(true)),
            Span::styled("   Down ", Style::default().fg(theme::DIM_WHITE)),
            Span::styled(counts.down.to_string(), theme::status_style(counts.all_up())),
        ];

        let refreshed = match (&self.session, self.last_refresh) {
            (SessionState::Loading, _) => Some("refreshing…".to_owned()),
            (_, Some(at)) => Some(format!("refreshed {}", time_fmt::fmt_refreshed(at, Utc::now()))),
            _ => None,
        };
        if let Some(text) = refreshed {
            spans.push(Span::styled(format!("   {text}"), theme::key_hint()));
        }

        let block = Block::default()
            .title(" Monitored sites ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_message(frame: &mut Frame, area: Rect, text: &str, style: Style) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        frame.render_widget(
            Paragraph::new(Span::styled(text, style))
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            ["ID", "Name", "URL", "Status", "Last checked", "Down since"]
                .into_iter()
                .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let now = Utc::now();
        let selected = self.table_state.selected();
        let rows: Vec<Row> = self
            .sites
            .iter()
            .enumerate()
            .map(|(i, site)| {
                let is_selected = selected == Some(i);
                let down_since = time_fmt::down_since_cell(
                    &site.down_since_label(),
                    site.down_for(now),
                );
                Row::new(vec![
                    Cell::from(site.id.to_string()),
                    Cell::from(site.name.clone()).style(
                        Style::default().fg(theme::NEON_CYAN).add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                    ),
                    Cell::from(site.url.clone()).style(Style::default().fg(theme::CORAL)),
                    Cell::from(site.status.to_string()).style(theme::status_style(site.is_up())),
                    Cell::from(site.last_checked_label()),
                    Cell::from(down_since),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Min(20),
            Constraint::Length(6),
            Constraint::Length(19),
            Constraint::Length(28),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme::border_default()),
            )
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸");

        let mut state = TableState::default()
            .with_offset(self.table_state.offset())
            .with_selected(self.table_state.selected());
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Component for SitesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(form) = self.form.as_mut() {
            if key.code == KeyCode::Esc {
                self.form = None;
                return Ok(None);
            }
            return Ok(form.handle_key(key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(self.sites.len().saturating_sub(1));
                None
            }
            KeyCode::Char('a') => {
                self.form = Some(AddSiteForm::new());
                None
            }
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('r') => Some(Action::RequestRefresh),
            KeyCode::Char('L') => Some(Action::Logout),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SitesUpdated(sites) => {
                self.sites = Arc::clone(sites);
                let keep = self.table_state.selected().unwrap_or(0);
                self.select(keep);
            }
            Action::SummaryUpdated(summary) => self.summary = *summary,
            Action::LastRefreshUpdated(at) => self.last_refresh = *at,
            Action::SessionChanged(state) => {
                self.session = state.clone();
                if matches!(state, SessionState::LoggedOut | SessionState::Unauthorized(_)) {
                    self.form = None;
                }
            }
            Action::SiteAdded(_) => self.form = None,
            Action::AddSiteFailed(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                    form.error = Some(message.clone());
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(3), // summary
            Constraint::Min(3),    // table / message
            Constraint::Length(1), // hints
        ])
        .split(area);

        self.render_header(frame, layout[0]);

        match &self.session {
            SessionState::Failed(message) => {
                Self::render_message(frame, layout[1], message, theme::error_text());
            }
            SessionState::Loading if self.sites.is_empty() => {
                Self::render_message(frame, layout[1], "Loading sites…", theme::key_hint());
            }
            _ if self.sites.is_empty() => Self::render_message(
                frame,
                layout[1],
                "No sites monitored yet. Press a to add one.",
                theme::key_hint(),
            ),
            _ => self.render_table(frame, layout[1]),
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("a ", theme::key_hint_key()),
            Span::styled("add  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("L ", theme::key_hint_key()),
            Span::styled("logout", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);

        if let Some(ref form) = self.form {
            form.render(frame, area);
        }
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use upwatch_core::{SiteId, SiteStatus, Timestamp};

    fn site(id: u64, name: &str, status: SiteStatus, down_since: Option<&str>) -> Arc<Site> {
        Arc::new(Site {
            id: SiteId::new(id),
            name: name.into(),
            url: format!("https://{name}.example"),
            status,
            last_checked: None,
            down_since: down_since.map(Timestamp::parse),
        })
    }

    fn loaded(sites: Vec<Arc<Site>>) -> SitesScreen {
        let mut screen = SitesScreen::new();
        screen.update(&Action::SitesUpdated(Arc::new(sites))).unwrap();
        screen
            .update(&Action::SessionChanged(SessionState::Ready))
            .unwrap();
        screen
    }

    fn press(screen: &mut SitesScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn rendered(screen: &SitesScreen) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(120, 16)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect())
            .collect()
    }

    #[test]
    fn table_keeps_server_order_and_placeholders() {
        let screen = loaded(vec![
            site(12, "shop", SiteStatus::Up, Some("2024-05-01 10:00:00")),
            site(4, "blog", SiteStatus::Down, None),
        ]);
        let lines = rendered(&screen);

        let shop = lines.iter().position(|l| l.contains("shop")).unwrap();
        let blog = lines.iter().position(|l| l.contains("blog")).unwrap();
        assert!(shop < blog);

        // Down-since is hidden while a site is up.
        assert!(!lines[shop].contains("2024-05-01"));
        assert!(lines[shop].contains("UP"));
        assert!(lines[blog].contains("DOWN"));
        assert!(lines[blog].contains(" - "));
    }

    #[test]
    fn summary_header_counts_sites() {
        let mut screen = loaded(vec![
            site(1, "a", SiteStatus::Up, None),
            site(2, "b", SiteStatus::Down, None),
            site(3, "c", SiteStatus::Down, None),
        ]);
        screen
            .update(&Action::SummaryUpdated(Some(StatusSummary::new(3, 2))))
            .unwrap();
        let header = rendered(&screen)[1].clone();
        assert!(header.contains("Total 3"));
        assert!(header.contains("Up 1"));
        assert!(header.contains("Down 2"));
    }

    #[test]
    fn load_failure_replaces_table() {
        let mut screen = loaded(vec![site(1, "shop", SiteStatus::Up, None)]);
        screen
            .update(&Action::SessionChanged(SessionState::Failed(
                "failed to load sites".into(),
            )))
            .unwrap();
        let text = rendered(&screen).join("\n");
        assert!(text.contains("failed to load sites"));
        assert!(!text.contains("Last checked"));
    }

    #[test]
    fn delete_asks_for_confirmation_on_selected_site() {
        let mut screen = loaded(vec![
            site(12, "shop", SiteStatus::Up, None),
            site(4, "blog", SiteStatus::Down, None),
        ]);
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('j'));

        let action = press(&mut screen, KeyCode::Char('d'));
        let Some(Action::ShowConfirm(confirm)) = action else {
            panic!("expected ShowConfirm");
        };
        assert_eq!(
            confirm,
            ConfirmAction::DeleteSite {
                id: SiteId::new(4),
                name: "blog".into(),
            }
        );
        assert_eq!(confirm.to_string(), "Stop monitoring blog?");
    }

    #[test]
    fn delete_with_no_sites_does_nothing() {
        let mut screen = loaded(Vec::new());
        assert!(press(&mut screen, KeyCode::Char('d')).is_none());
        assert!(
            rendered(&screen)
                .join("\n")
                .contains("No sites monitored yet")
        );
    }

    #[test]
    fn add_form_submits_and_shows_errors_inline() {
        let mut screen = loaded(Vec::new());
        press(&mut screen, KeyCode::Char('a'));
        assert!(screen.captures_input());

        for c in "shop".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        press(&mut screen, KeyCode::Tab);
        let Some(Action::SubmitAddSite { name, url }) = press(&mut screen, KeyCode::Enter) else {
            panic!("expected SubmitAddSite");
        };
        assert_eq!((name.as_str(), url.as_str()), ("shop", ""));

        screen
            .update(&Action::AddSiteFailed("enter both a name and a URL".into()))
            .unwrap();
        assert!(
            rendered(&screen)
                .join("\n")
                .contains("enter both a name and a URL")
        );

        screen.update(&Action::SiteAdded("shop".into())).unwrap();
        assert!(!screen.captures_input());
    }

    #[test]
    fn selection_survives_shrinking_list() {
        let mut screen = loaded(vec![
            site(1, "a", SiteStatus::Up, None),
            site(2, "b", SiteStatus::Up, None),
        ]);
        press(&mut screen, KeyCode::Char('G'));
        screen
            .update(&Action::SitesUpdated(Arc::new(vec![site(
                1,
                "a",
                SiteStatus::Up,
                None,
            )])))
            .unwrap();
        assert_eq!(screen.table_state.selected(), Some(0));
    }
}
