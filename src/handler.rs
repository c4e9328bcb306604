use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode, PaneFocus};
use crate::jobs::Command;

/// Route a key event. Ctrl+C quits from any mode; while editing, every
/// other key belongs to the editor.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return Vec::new();
    }

    match app.mode {
        AppMode::Editing => match app.editor.handle_key(key) {
            Some(request) => app.handle_editor_request(request),
            None => Vec::new(),
        },
        AppMode::Browsing => handle_browsing(app, key),
    }
}

fn handle_browsing(app: &mut App, key: KeyEvent) -> Vec<Command> {
    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return Vec::new();
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return Vec::new();
        }
        KeyCode::Char('e') if app.can_enter_edit() => {
            return app.enter_edit().into_iter().collect();
        }
        _ => {}
    }

    match app.focus {
        PaneFocus::Nav => match app.nav.handle_key(key) {
            Some(resource) => vec![app.open_resource(resource)],
            None => Vec::new(),
        },
        PaneFocus::Content => {
            app.viewer.handle_key(key);
            Vec::new()
        }
    }
}
