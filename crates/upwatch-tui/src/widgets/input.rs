//! Single-line text fields for the login and add-site forms.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::theme;

/// Editable text with an optional mask for secrets.
#[derive(Debug)]
pub struct TextField {
    pub label: &'static str,
    value: String,
    masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Apply an editing key. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                true
            }
            _ => false,
        }
    }

    /// Label on the first row, bordered box on the next three.
    pub fn render(&self, frame: &mut Frame, area: Rect, active: bool) {
        if area.height < 4 {
            return;
        }

        let label_style = if active {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            Style::default().fg(theme::DIM_WHITE)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(self.label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if active {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let box_area = Rect::new(area.x, area.y + 1, area.width, 3);
        let inner = block.inner(box_area);
        frame.render_widget(block, box_area);

        let mut text = if self.masked {
            "\u{25CF}".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        if active {
            text.push('\u{2588}');
        }
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::NEON_CYAN))),
            inner,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edits_and_clears() {
        let mut field = TextField::new("Name");
        for c in "shop".chars() {
            assert!(field.handle_key(key(KeyCode::Char(c))));
        }
        field.handle_key(key(KeyCode::Backspace));
        assert_eq!(field.value(), "sho");

        field.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(field.value(), "");
        assert!(!field.handle_key(key(KeyCode::Enter)));
    }
}
