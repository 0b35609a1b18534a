use chrono::Local;
use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::app::FilterChoice;
use crate::graph::zones::Classification;
use crate::sessions::Session;

/// The date-range selector across the top of the history view.
pub fn filter_tabs(choice: FilterChoice) -> Tabs<'static> {
    let titles: Vec<Line> = FilterChoice::ALL
        .iter()
        .enumerate()
        .map(|(index, choice)| Line::from(format!("[{}] {}", index + 1, choice.label())))
        .collect();
    Tabs::new(titles)
        .select(choice.index())
        .block(Block::default().borders(Borders::ALL).title("Date Range"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
}

/// One row per session in the current window, newest first.
pub fn session_table(sessions: &[Session], use_12hr: bool) -> Table<'static> {
    let header = Row::new(vec!["Date", "Average", "Readings", "Class", "Notes"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = sessions
        .iter()
        .map(|session| {
            let date = session.date.with_timezone(&Local);
            let date_str = if use_12hr {
                date.format("%b %-d, %Y at %I:%M %p").to_string()
            } else {
                date.format("%b %-d, %Y at %H:%M").to_string()
            };
            let class = Classification::of(session.average.systolic);
            Row::new(vec![
                Cell::from(date_str),
                Cell::from(session.average.display()),
                Cell::from(session.readings.len().to_string()),
                Cell::from(Span::styled(
                    class.label(),
                    Style::default().fg(class_color(class)),
                )),
                Cell::from(if session.notes.is_some() { "yes" } else { "" }),
            ])
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(20),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("History ({} session(s))", sessions.len())),
    )
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol(">> ")
}

/// Expanded view of the selected session: every reading plus notes.
pub fn session_details(session: Option<&Session>) -> Paragraph<'static> {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(session) = session else {
        return Paragraph::new("").block(block);
    };

    let mut lines: Vec<Line> = session
        .readings
        .iter()
        .enumerate()
        .map(|(index, reading)| Line::from(format!("#{} {}", index + 1, reading.display())))
        .collect();
    if let Some(notes) = &session.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Notes: {notes}")));
    }

    Paragraph::new(lines).wrap(Wrap { trim: true }).block(block)
}

fn class_color(class: Classification) -> Color {
    match class {
        Classification::Low => Color::Blue,
        Classification::Normal => Color::Green,
        Classification::Elevated => Color::Yellow,
        Classification::High => Color::Red,
    }
}
