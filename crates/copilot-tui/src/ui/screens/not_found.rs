use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::truncate_string;

pub fn render(frame: &mut Frame, path: &str, area: Rect) {
    let area = centered_rect_fixed(44, 9, area);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("404 - Page Not Found", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(truncate_string(path, 38), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Go back home ", styles::button_style(true))),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}
