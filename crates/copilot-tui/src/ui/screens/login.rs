use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, LoginFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::{mask, truncate_string};

/// Visible width of the email and password fields
const FIELD_WIDTH: usize = 30;

const FEATURES: [(&str, &str); 3] = [
    ("AI-Аналитика", "Умный анализ финансовых данных"),
    ("Безопасность", "Банковская защита данных"),
    ("Мгновенно", "Быстрые ответы 24/7"),
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(96, 22, area);
    frame.render_widget(Clear, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_intro(frame, columns[0]);
    render_form(frame, app, columns[1]);
}

fn render_intro(frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let header = vec![
        Line::from(Span::styled(" Альфа-Банк ", styles::button_style(true))),
        Line::from(""),
        Line::from(Span::styled("Alfa Copilot", styles::title_style())),
        Line::from(Span::styled(
            "AI-помощник для вашего бизнеса",
            styles::highlight_style(),
        )),
        Line::from(Span::styled(
            "Войдите в систему для доступа к персональному AI-ассистенту",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), rows[0]);

    for (i, (title, desc)) in FEATURES.iter().enumerate() {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(*title, styles::list_item_style())),
            Line::from(Span::styled(*desc, styles::muted_style())),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        );
        frame.render_widget(card, rows[i + 1]);
    }
}

fn field_line<'a>(value: String, placeholder: &'a str, focused: bool) -> Line<'a> {
    let cursor = if focused { "▌" } else { " " };
    let (text, style) = if value.is_empty() && !focused {
        (placeholder.to_string(), styles::muted_style())
    } else if focused {
        (value, styles::selected_style())
    } else {
        (value, styles::list_item_style())
    };
    Line::from(vec![
        Span::styled(" [", styles::muted_style()),
        Span::styled(format!("{:<width$}", text, width = FIELD_WIDTH), style),
        Span::styled(cursor, style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Keep the tail of a long value visible while typing
fn visible_tail(value: &str) -> String {
    let len = value.chars().count();
    if len <= FIELD_WIDTH {
        value.to_string()
    } else {
        value.chars().skip(len - FIELD_WIDTH).collect()
    }
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let pending = app.login_pending();
    let mut lines = vec![
        Line::from(Span::styled(" Вход в систему", styles::title_style())),
        Line::from(Span::styled(
            " Используйте корпоративные данные",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Email", styles::muted_style())),
        field_line(
            visible_tail(&app.login_email),
            "your.email@alfabank.ru",
            app.login_focus == LoginFocus::Email,
        ),
        Line::from(""),
        Line::from(Span::styled(" Пароль", styles::muted_style())),
        field_line(
            mask(&app.login_password, FIELD_WIDTH),
            "••••••••",
            app.login_focus == LoginFocus::Password,
        ),
        Line::from(""),
    ];

    let remember_focused = app.login_focus == LoginFocus::RememberMe;
    let checkbox = if app.remember_me { "[x]" } else { "[ ]" };
    lines.push(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{} Запомнить меня", checkbox),
            if remember_focused {
                styles::selected_style()
            } else {
                styles::list_item_style()
            },
        ),
    ]));
    lines.push(Line::from(""));

    let label = if pending {
        "       Вход...        "
    } else {
        " Войти в Alfa Copilot "
    };
    let button_focused = app.login_focus == LoginFocus::Button;
    lines.push(Line::from(vec![
        Span::raw("       "),
        Span::styled(label, styles::button_style(button_focused)),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_string(error, FIELD_WIDTH + 10)),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
