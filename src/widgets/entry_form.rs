use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table},
};
use tui_input::Input;

use crate::sessions::{Reading, MAX_READINGS_PER_SESSION};

/// One bordered single-line input; the border highlights when focused.
pub fn input_box<'a>(title: &'a str, input: &'a Input, focused: bool) -> Paragraph<'a> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Paragraph::new(input.value()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style),
    )
}

/// The readings accumulated for the unsaved session.
pub fn pending_table(pending: &[Reading]) -> Table<'static> {
    let selected_style = Style::default().add_modifier(Modifier::REVERSED);

    let rows: Vec<Row> = pending
        .iter()
        .enumerate()
        .map(|(index, reading)| Row::new(vec![format!("#{}", index + 1), reading.display()]))
        .collect();

    Table::new(rows, [Constraint::Length(4), Constraint::Percentage(100)])
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Current Session Readings ({}/{})",
            pending.len(),
            MAX_READINGS_PER_SESSION
        )))
        .highlight_style(selected_style)
        .highlight_symbol(">> ")
}
