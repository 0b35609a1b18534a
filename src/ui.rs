use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, EntryField, ErrorPopup, FilterChoice, View};
use crate::utils::centered_rect;
use crate::widgets::entry_form::{input_box, pending_table};
use crate::widgets::history::{filter_tabs, session_details, session_table};
use crate::widgets::prompts::confirm_prompt;
use crate::widgets::trend_graph;

/// Renders the user interface widgets.
pub fn render(app: &mut App, f: &mut Frame) {
    match app.view {
        View::Entry => render_entry(app, f),
        View::History => render_history(app, f),
    }

    // Draw the confirm prompt overlay
    if let Some(prompt) = app.prompt {
        let area = centered_rect(40, 25, f.area());
        let prompt_table = confirm_prompt(app.prompt_title(prompt));
        f.render_widget(Clear, area);
        f.render_stateful_widget(prompt_table, area, &mut app.prompt_state);
    }

    // Draw the error overlay if the string is not empty
    if let Some(popup) = app.error_message.clone() {
        let (style, message) = match popup {
            ErrorPopup::Fatal(msg) => (Style::default().fg(Color::Red), msg),
            ErrorPopup::Intermittent(msg) => (Style::default().fg(Color::Yellow), msg),
            ErrorPopup::UserMustDismiss(msg) => (Style::default().fg(Color::Blue), msg),
        };

        let area = centered_rect(60, 50, f.area());
        let error_block = Paragraph::new(Span::from(message))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("! Notification !")
                    .style(style),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(error_block, area);
    }
}

fn render_entry(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .vertical_margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    let fields = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(chunks[0]);

    let focus = app.entry.focus;
    f.render_widget(
        input_box(
            EntryField::Systolic.title(),
            &app.entry.systolic,
            focus == EntryField::Systolic,
        ),
        fields[0],
    );
    f.render_widget(
        input_box(
            EntryField::Diastolic.title(),
            &app.entry.diastolic,
            focus == EntryField::Diastolic,
        ),
        fields[1],
    );
    f.render_widget(
        input_box(
            EntryField::Pulse.title(),
            &app.entry.pulse,
            focus == EntryField::Pulse,
        ),
        fields[2],
    );
    f.render_widget(
        input_box(
            EntryField::Notes.title(),
            &app.entry.notes,
            focus == EntryField::Notes,
        ),
        chunks[1],
    );

    let pending = pending_table(&app.entry.pending);
    f.render_stateful_widget(pending, chunks[2], &mut app.entry.pending_state);

    let footer = Paragraph::new(
        "Tab next field • Enter add reading • ↑/↓ + Del remove • ^S save session • ^L clear • ^H history • ^C quit",
    )
    .style(Style::default().add_modifier(Modifier::DIM));
    f.render_widget(footer, chunks[3]);

    if app.prompt.is_none() && app.error_message.is_none() {
        let (input, area) = match focus {
            EntryField::Systolic => (&app.entry.systolic, fields[0]),
            EntryField::Diastolic => (&app.entry.diastolic, fields[1]),
            EntryField::Pulse => (&app.entry.pulse, fields[2]),
            EntryField::Notes => (&app.entry.notes, chunks[1]),
        };
        set_input_cursor(f, input, area);
    }
}

fn render_history(app: &mut App, f: &mut Frame) {
    let show_custom = app.filter.choice == FilterChoice::Custom;
    let mut constraints = vec![Constraint::Length(3)];
    if show_custom {
        constraints.push(Constraint::Length(3));
    }
    constraints.extend([
        Constraint::Percentage(45),
        Constraint::Min(6),
        Constraint::Length(1),
    ]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .vertical_margin(1)
        .constraints(constraints)
        .split(f.area());

    let mut next = 0;
    f.render_widget(filter_tabs(app.filter.choice), chunks[next]);
    next += 1;

    if show_custom {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(chunks[next]);
        let editing = app.filter.editing_custom;
        f.render_widget(
            input_box(
                "Start Date (YYYY-MM-DD)",
                &app.filter.start,
                editing && !app.filter.end_focused,
            ),
            halves[0],
        );
        f.render_widget(
            input_box(
                "End Date (YYYY-MM-DD)",
                &app.filter.end,
                editing && app.filter.end_focused,
            ),
            halves[1],
        );
        if editing && app.prompt.is_none() && app.error_message.is_none() {
            let (input, area) = if app.filter.end_focused {
                (&app.filter.end, halves[1])
            } else {
                (&app.filter.start, halves[0])
            };
            set_input_cursor(f, input, area);
        }
        next += 1;
    }

    render_graph(app, f, chunks[next]);
    next += 1;

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(chunks[next]);
    let table = session_table(&app.filtered, app.settings.misc.use_12hr_time);
    f.render_stateful_widget(table, halves[0], &mut app.history_table);
    let selected = app
        .history_table
        .selected()
        .and_then(|index| app.filtered.get(index));
    f.render_widget(session_details(selected), halves[1]);
    next += 1;

    let footer = Paragraph::new(
        "1-4 date range • j/k select • d delete • e export • c clear all • Esc new reading • q quit",
    )
    .style(Style::default().add_modifier(Modifier::DIM));
    f.render_widget(footer, chunks[next]);
}

fn render_graph(app: &mut App, f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Trend".cyan().bold());
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let viewport = trend_graph::viewport_for(inner);
    match app.graph_commands(viewport) {
        Some(commands) => {
            f.render_widget(trend_graph::trend_graph(commands, viewport), inner);
        }
        None => {
            let empty = Paragraph::new("No readings in selected date range.")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM));
            f.render_widget(empty, inner);
        }
    }
}

fn set_input_cursor(f: &mut Frame, input: &tui_input::Input, area: Rect) {
    let x = area.x + 1 + input.visual_cursor() as u16;
    let max_x = area.right().saturating_sub(2);
    f.set_cursor_position(Position::new(x.min(max_x), area.y + 1));
}
