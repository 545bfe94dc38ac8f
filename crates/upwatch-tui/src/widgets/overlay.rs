use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    widgets::{Block, BorderType, Borders, Clear},
};

use crate::theme;

/// A `width` x `height` rect centered in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4)).max(1);
    let height = height.min(area.height.saturating_sub(2)).max(1);
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

/// Clear `area`, draw a rounded panel (titled unless `title` is empty), and return its inner rect.
pub fn panel(frame: &mut Frame, area: Rect, title: &str, border: Style) -> Rect {
    frame.render_widget(Clear, area);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(theme::BG_DARK));
    if !title.is_empty() {
        block = block
            .title(format!(" {title} "))
            .title_style(theme::title_style());
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}
