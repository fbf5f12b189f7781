mod edit;
mod grab;
mod mouse;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};
use crate::model::task::Quadrant;

pub use mouse::handle_mouse;

use edit::handle_edit;
use grab::handle_grab;
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Grab => handle_grab(app, key),
    }
}

/// Shift+letter arrives as either `J` or `j`+SHIFT depending on the terminal
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

/// Quadrant picked by the digit keys 1-4
fn quadrant_key(c: char) -> Option<Quadrant> {
    match c.to_digit(10) {
        Some(n @ 1..=4) => Some(Quadrant::ALL[n as usize - 1]),
        _ => None,
    }
}
