use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use tui_input::backend::crossterm::EventHandler as _;

use crate::app::{App, FilterChoice, View};
use crate::AppResult;

/// Handles the key events and updates the state of [`App`].
pub fn handle_key_events(app: &mut App, key_event: KeyEvent) -> AppResult<()> {
    if key_event.modifiers == KeyModifiers::CONTROL
        && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        app.should_quit = true;
        return Ok(());
    }

    // Overlays swallow input until dealt with.
    if app.error_message.is_some() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_popup();
        }
        return Ok(());
    }
    if app.prompt.is_some() {
        handle_prompt_keys(app, key_event);
        return Ok(());
    }

    match app.view {
        View::Entry => handle_entry_keys(app, key_event),
        View::History => handle_history_keys(app, key_event),
    }
    Ok(())
}

fn handle_prompt_keys(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('k') => {
            app.toggle_prompt_selection();
        }
        KeyCode::Enter => {
            if app.prompt_state.selected() == Some(0) {
                app.confirm_prompt();
            } else {
                app.cancel_prompt();
            }
        }
        KeyCode::Esc => app.cancel_prompt(),
        _ => {}
    }
}

fn handle_entry_keys(app: &mut App, key_event: KeyEvent) {
    let ctrl = key_event.modifiers == KeyModifiers::CONTROL;
    match key_event.code {
        KeyCode::Tab => app.entry.focus_next(),
        KeyCode::BackTab => app.entry.focus_prev(),
        KeyCode::Enter => app.add_reading(),
        KeyCode::Char('s') | KeyCode::Char('S') if ctrl => app.save_session(),
        KeyCode::Char('l') | KeyCode::Char('L') if ctrl => app.request_clear_batch(),
        KeyCode::Char('h') | KeyCode::Char('H') if ctrl => app.show_history(),
        KeyCode::Up => app.entry.select_prev_pending(),
        KeyCode::Down => app.entry.select_next_pending(),
        KeyCode::Delete => app.remove_selected_reading(),
        _ => {
            let _ = app
                .entry
                .focused_input_mut()
                .handle_event(&CrosstermEvent::Key(key_event));
        }
    }
}

fn handle_history_keys(app: &mut App, key_event: KeyEvent) {
    // Date edits capture the keyboard until applied or abandoned.
    if app.filter.editing_custom {
        match key_event.code {
            KeyCode::Esc => app.filter.editing_custom = false,
            KeyCode::Tab | KeyCode::BackTab => {
                app.filter.end_focused = !app.filter.end_focused;
            }
            KeyCode::Enter => app.apply_custom_range(),
            _ => {
                let _ = app
                    .filter
                    .focused_input_mut()
                    .handle_event(&CrosstermEvent::Key(key_event));
            }
        }
        return;
    }

    match key_event.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Char('n') => app.view = View::Entry,
        KeyCode::Char('1') => app.set_filter_choice(FilterChoice::Days7),
        KeyCode::Char('2') => app.set_filter_choice(FilterChoice::Days30),
        KeyCode::Char('3') => app.set_filter_choice(FilterChoice::Days90),
        KeyCode::Char('4') => app.set_filter_choice(FilterChoice::Custom),
        KeyCode::Down | KeyCode::Char('j') => app.history_scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.history_scroll_up(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('e') => app.export_data(),
        KeyCode::Char('c') => app.request_clear_all(),
        _ => {}
    }
}
