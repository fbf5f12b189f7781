use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary};

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.status = None;
            app.commit_edit();
            return;
        }
        KeyCode::Esc => {
            app.status = None;
            app.cancel_edit();
            return;
        }
        _ => {}
    }

    let Some(edit) = app.edit.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            let full = edit
                .target
                .max_chars()
                .is_some_and(|max| edit.buffer.chars().count() >= max);
            if !full && !c.is_control() {
                edit.buffer.insert(edit.cursor, c);
                edit.cursor += c.len_utf8();
            }
        }
        KeyCode::Backspace => {
            if let Some(prev) = prev_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.replace_range(prev..edit.cursor, "");
                edit.cursor = prev;
            }
        }
        KeyCode::Delete => {
            if let Some(next) = next_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.replace_range(edit.cursor..next, "");
            }
        }
        KeyCode::Left => {
            if let Some(prev) = prev_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = next_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = next;
            }
        }
        KeyCode::Home => edit.cursor = 0,
        KeyCode::End => edit.cursor = edit.buffer.len(),
        _ => {}
    }
}
