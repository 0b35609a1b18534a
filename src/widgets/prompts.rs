use ratatui::{
    layout::{Alignment, Constraint},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Row, Table},
};

/// Creates a pop-up asking the user to confirm a destructive action.
pub fn confirm_prompt(title: String) -> Table<'static> {
    let selected_style = Style::default().add_modifier(Modifier::REVERSED);

    let rows: Vec<Row> = vec![
        Row::new(vec![Line::from("Yes").alignment(Alignment::Left)]),
        Row::new(vec![Line::from("No").alignment(Alignment::Left)]),
    ];

    Table::new(rows, [Constraint::Percentage(100)])
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(selected_style)
        .highlight_symbol(">> ")
}
