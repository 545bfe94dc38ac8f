//! Login form shown whenever no token is held.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use secrecy::SecretString;

use upwatch_core::SessionState;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::input::TextField;
use crate::widgets::overlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct LoginScreen {
    server: String,
    username: TextField,
    password: TextField,
    field: Field,
    error: Option<String>,
    submitting: bool,
}

impl LoginScreen {
    pub fn new(server: &str, username: Option<String>) -> Self {
        let field = if username.is_some() {
            Field::Password
        } else {
            Field::Username
        };
        Self {
            server: server.to_owned(),
            username: TextField::new("Username").with_value(username.unwrap_or_default()),
            password: TextField::masked("Password"),
            field,
            error: None,
            submitting: false,
        }
    }

    fn active_field_mut(&mut self) -> &mut TextField {
        match self.field {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            Field::Username => Field::Password,
            Field::Password => Field::Username,
        };
    }

    fn submit(&mut self) -> Option<Action> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.error = None;
        Some(Action::SubmitLogin {
            username: self.username.value().to_owned(),
            password: Arc::new(SecretString::from(self.password.value().to_owned())),
        })
    }
}

impl Component for LoginScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc => return Ok(Some(Action::Quit)),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_field(),
            KeyCode::Enter => {
                if self.field == Field::Username && self.password.value().is_empty() {
                    self.field = Field::Password;
                } else {
                    return Ok(self.submit());
                }
            }
            _ => {
                if !self.submitting {
                    self.active_field_mut().handle_key(key);
                }
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoginFailed(message) => {
                self.submitting = false;
                self.error = Some(message.clone());
                self.password.clear();
                self.field = Field::Password;
            }
            Action::LoginSucceeded => {
                self.submitting = false;
                self.error = None;
                self.password.clear();
            }
            Action::SessionChanged(SessionState::Unauthorized(message)) => {
                self.error = Some(format!("Session expired: {message}"));
                self.field = Field::Password;
            }
            Action::SessionChanged(SessionState::LoggedOut) => self.error = None,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let panel = overlay::centered_rect(area, 56, 17);
        let inner = overlay::panel(frame, panel, "upwatch", theme::border_focused());

        let layout = Layout::vertical([
            Constraint::Length(1), // padding
            Constraint::Length(1), // server
            Constraint::Length(1), // padding
            Constraint::Length(4), // username
            Constraint::Length(4), // password
            Constraint::Length(1), // error / progress
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let server = Line::from(vec![
            Span::styled("Server  ", Style::default().fg(theme::DIM_WHITE)),
            Span::styled(self.server.as_str(), Style::default().fg(theme::CORAL)),
        ]);
        frame.render_widget(Paragraph::new(server), pad(layout[1]));

        self.username
            .render(frame, pad(layout[3]), self.field == Field::Username);
        self.password
            .render(frame, pad(layout[4]), self.field == Field::Password);

        let status = if self.submitting {
            Span::styled("Logging in…", Style::default().fg(theme::ELECTRIC_YELLOW))
        } else if let Some(ref err) = self.error {
            Span::styled(err.as_str(), theme::error_text())
        } else {
            Span::raw("")
        };
        frame.render_widget(Paragraph::new(status), pad(layout[5]));

        let hints = Line::from(vec![
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("switch field  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("log in  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(
            Paragraph::new(hints).alignment(Alignment::Center),
            layout[7],
        );
    }

    fn captures_input(&self) -> bool {
        true
    }
}

/// Two-column inset so fields don't touch the panel border.
fn pad(area: Rect) -> Rect {
    Rect::new(
        area.x + 2,
        area.y,
        area.width.saturating_sub(4),
        area.height,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use secrecy::ExposeSecret;

    fn press(screen: &mut LoginScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn rendered(screen: &LoginScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 22)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn enter_moves_to_password_then_submits() {
        let mut screen = LoginScreen::new("http://localhost:3000", None);
        type_text(&mut screen, "admin");
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        type_text(&mut screen, "s3cret");

        let Some(Action::SubmitLogin { username, password }) = press(&mut screen, KeyCode::Enter)
        else {
            panic!("expected SubmitLogin");
        };
        assert_eq!(username, "admin");
        assert_eq!(password.expose_secret(), "s3cret");

        // A second Enter while the request is in flight does nothing.
        assert!(press(&mut screen, KeyCode::Enter).is_none());
    }

    #[test]
    fn failure_is_shown_and_password_cleared() {
        let mut screen = LoginScreen::new("http://localhost:3000", Some("admin".into()));
        type_text(&mut screen, "wrong");
        press(&mut screen, KeyCode::Enter);
        screen
            .update(&Action::LoginFailed(
                "Authentication failed: invalid credentials".into(),
            ))
            .unwrap();

        assert_eq!(screen.password.value(), "");
        let text = rendered(&screen);
        assert!(text.contains("Authentication failed: invalid credentials"));
        assert!(text.contains("http://localhost:3000"));
        assert!(text.contains("admin"));
        assert!(!text.contains("wrong"));
    }

    #[test]
    fn password_is_masked() {
        let mut screen = LoginScreen::new("http://localhost:3000", Some("admin".into()));
        type_text(&mut screen, "abc");
        let text = rendered(&screen);
        assert!(text.contains("\u{25CF}\u{25CF}\u{25CF}"));
        assert!(!text.contains("abc"));
    }

    #[test]
    fn expired_session_explains_why() {
        let mut screen = LoginScreen::new("http://localhost:3000", None);
        screen
            .update(&Action::SessionChanged(SessionState::Unauthorized(
                "Authentication failed: invalid or expired token".into(),
            )))
            .unwrap();
        assert!(rendered(&screen).contains("Session expired"));
    }

    #[test]
    fn plain_logout_clears_expired_notice() {
        let mut screen = LoginScreen::new("http://localhost:3000", None);
        screen
            .update(&Action::SessionChanged(SessionState::Unauthorized(
                "Authentication failed: invalid or expired token".into(),
            )))
            .unwrap();
        screen
            .update(&Action::SessionChanged(SessionState::LoggedOut))
            .unwrap();
        assert!(!rendered(&screen).contains("Session expired"));
    }
}
