use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, ChatFocus};
use crate::ui::styles;
use crate::utils::{truncate_string, wrap_text};

const SIDEBAR_WIDTH: u16 = 32;
const QUERY_PLACEHOLDER: &str = "Задайте вопрос Alpha Copilot...";

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)])
        .split(area);

    render_sidebar(frame, app, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Quick actions
            Constraint::Min(5),    // Messages
            Constraint::Length(4), // Query input
        ])
        .split(columns[1]);

    render_header(frame, app, rows[0]);
    render_quick_actions(frame, app, rows[1]);
    render_messages(frame, app, rows[2]);
    render_query_input(frame, app, rows[3]);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let new_chat_focused = app.chat_focus == ChatFocus::NewChat;
    let button = Paragraph::new(Line::from(Span::styled(
        " + Новый чат ",
        styles::button_style(new_chat_focused),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(new_chat_focused)),
    );
    frame.render_widget(button, rows[0]);

    let chats_focused = app.chat_focus == ChatFocus::Chats;
    let name_width = (SIDEBAR_WIDTH as usize).saturating_sub(14);
    let active = app.chats.active_index();

    let table_rows: Vec<Row> = app
        .chats
        .chats()
        .iter()
        .enumerate()
        .map(|(i, chat)| {
            let style = if i == active {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(truncate_string(&chat.name, name_width)),
                Cell::from(Span::styled(chat.date.clone(), styles::muted_style())),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(10)];
    let table = Table::new(table_rows, widths).block(
        Block::default()
            .title(" Недавние чаты ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(chats_focused)),
    );

    let mut state = TableState::default();
    if !app.chats.is_empty() {
        state.select(Some(active));
    }
    frame.render_stateful_widget(table, rows[1], &mut state);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let user = app
        .user
        .as_ref()
        .map(|u| u.email.as_str())
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Альфа-Банк ", styles::button_style(true)),
        Span::raw(" "),
        Span::styled("Alpha Copilot", styles::title_style()),
        Span::styled("  AI-помощник для бизнеса", styles::muted_style()),
    ]);
    let right = Line::from(Span::styled(format!("{} ", user), styles::muted_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    frame.render_widget(Paragraph::new(title), inner);
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), inner);
}

fn render_quick_actions(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.chat_focus == ChatFocus::QuickActions;
    let count = app.quick_actions.len().max(1) as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, action) in app.quick_actions.iter().enumerate() {
        let selected = focused && i == app.quick_action_selection;
        let header_style = if selected {
            styles::selected_style()
        } else {
            styles::highlight_style()
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(action.header.as_str(), header_style)),
            Line::from(Span::styled(action.details.as_str(), styles::muted_style())),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(selected)),
        );
        frame.render_widget(card, cards[i]);
    }
}

fn push_bubble(lines: &mut Vec<Line<'static>>, text: &str, is_answer: bool, width: usize) {
    let (style, alignment) = if is_answer {
        (styles::answer_style(), Alignment::Left)
    } else {
        (styles::query_style(), Alignment::Right)
    };
    for row in wrap_text(text, width) {
        lines.push(Line::from(Span::styled(row, style)).alignment(alignment));
    }
    lines.push(Line::from(""));
}

/// Lay out the conversation: answers flush left, queries flush right, each
/// bubble wrapped to three quarters of the available width.
fn message_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let bubble_width = (width * 3 / 4).max(10);
    let mut lines = Vec::new();

    for message in &app.messages {
        push_bubble(&mut lines, &message.content, message.is_answer, bubble_width);
    }

    if let Some((query, answer)) = app.in_flight_response() {
        push_bubble(&mut lines, query, false, bubble_width);
        if !answer.is_empty() {
            push_bubble(&mut lines, answer, true, bubble_width);
        }
        lines.push(Line::from(Span::styled(
            "Alpha Copilot печатает...",
            styles::muted_style(),
        )));
    }

    lines
}

fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::NONE)
        .title(app.chats.active().map(|c| format!(" {} ", c.name)).unwrap_or_default())
        .title_style(styles::title_style());
    let inner = block.inner(area);
    let lines = message_lines(app, inner.width.saturating_sub(2) as usize);

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((app.message_scroll, 0)),
        area,
    );
}

fn render_query_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.chat_focus == ChatFocus::Input;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(14)])
        .split(area);

    let text = if app.query_input.is_empty() {
        Line::from(Span::styled(QUERY_PLACEHOLDER, styles::muted_style()))
    } else {
        let cursor = if focused { "▌" } else { "" };
        Line::from(Span::styled(
            format!("{}{}", app.query_input, cursor),
            styles::list_item_style(),
        ))
    };
    let input = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(input, columns[0]);

    let can_send = !app.query_input.trim().is_empty() && !app.is_response_pending();
    let send = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(" Отправить ", styles::button_style(can_send && focused))),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(send, columns[1]);
}
