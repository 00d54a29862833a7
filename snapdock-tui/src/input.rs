//! Keyboard input handling

use crossterm::event::{KeyCode, KeyEvent};
use snapdock_core::state::{InputMode, StatusLevel};

use crate::app::{App, AppResult};

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> AppResult {
    match app.state.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Folder => handle_folder_mode(app, key),
    }
}

/// Handle keys in normal mode (gallery navigation + actions)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> AppResult {
    match key.code {
        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            app.state.cursor_down();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.state.cursor_up();
        }
        KeyCode::Char('g') => {
            app.state.cursor_top();
        }
        KeyCode::Char('G') => {
            app.state.cursor_bottom();
        }

        // Selection
        KeyCode::Char(' ') => {
            app.state.toggle_selection();
            app.state.cursor_down(); // Move to next after toggle
        }
        KeyCode::Char('a') => {
            app.state.select_all();
        }
        KeyCode::Char('x') => {
            app.state.clear_selection();
        }

        // Actions
        KeyCode::Char('y') => {
            app.copy_selected();
        }
        KeyCode::Char('r') => {
            app.refresh_photos();
        }
        KeyCode::Char('p') => {
            // New pairing code (only meaningful before pairing completes)
            app.request_pairing_code();
        }
        KeyCode::Char('f') => {
            app.state.input_mode = InputMode::Folder;
            app.state.folder_input.clear();
        }

        // Escape clears selection and status
        KeyCode::Esc => {
            app.state.clear_selection();
            app.state.clear_status();
        }

        // Help
        KeyCode::Char('?') => {
            app.state.set_status(
                "j/k:move space:select a:all x:clear y:copy f:folder r:refresh q:quit",
                StatusLevel::Info,
            );
        }

        _ => {}
    }

    AppResult::Continue
}

/// Handle keys while typing an upload folder path
fn handle_folder_mode(app: &mut App, key: KeyEvent) -> AppResult {
    match key.code {
        KeyCode::Esc => {
            app.state.exit_input_mode();
        }
        KeyCode::Enter => {
            let folder = std::mem::take(&mut app.state.folder_input);
            app.state.exit_input_mode();
            if !folder.is_empty() {
                app.set_upload_folder(folder);
            }
        }
        KeyCode::Backspace => {
            app.state.folder_input.pop();
        }
        KeyCode::Char(c) => {
            app.state.folder_input.push(c);
        }
        _ => {}
    }

    AppResult::Continue
}
