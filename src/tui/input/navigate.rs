use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::Quadrant;
use crate::tui::app::{App, EditTarget};

use super::quadrant_key;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // A status message lasts until the next key
    app.status = None;

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            app.should_quit = true;
        }

        // Cursor
        (_, KeyCode::Char('j') | KeyCode::Down) => move_cursor(app, 1),
        (_, KeyCode::Char('k') | KeyCode::Up) => move_cursor(app, -1),
        (_, KeyCode::Char('h') | KeyCode::Left) => move_column(app, 0),
        (_, KeyCode::Char('l') | KeyCode::Right) => move_column(app, 1),
        (_, KeyCode::Tab) => cycle_focus(app, 1),
        (_, KeyCode::BackTab) => cycle_focus(app, -1),
        (_, KeyCode::Char(c)) if quadrant_key(c).is_some() => {
            if let Some(q) = quadrant_key(c) {
                app.focus = q;
            }
        }

        // Task actions
        (_, KeyCode::Char(' ' | 'x') | KeyCode::Enter) => app.toggle_selected(),
        (_, KeyCode::Char('a' | 'i')) => app.begin_edit(EditTarget::NewTask(app.focus)),
        (_, KeyCode::Char('d') | KeyCode::Delete) => app.delete_selected(),
        (_, KeyCode::Char('J')) => app.move_selected(1),
        (_, KeyCode::Char('K')) => app.move_selected(-1),
        (_, KeyCode::Char('m')) => app.begin_grab(),

        // Board settings
        (_, KeyCode::Char('t')) => app.begin_edit(EditTarget::Title),
        (_, KeyCode::Char('e')) => app.begin_edit(EditTarget::EventName),
        (_, KeyCode::Char('D')) => app.begin_edit(EditTarget::TargetDate),
        (_, KeyCode::Char('L')) => app.toggle_lock(),
        (_, KeyCode::Char('E')) => app.export(),
        _ => {}
    }
}

/// Step the cursor within the focused pane, spilling into the pane above
/// or below at either end.
fn move_cursor(app: &mut App, step: isize) {
    let len = app.store.len(app.focus);
    let cursor = app.cursor();
    let (row, col) = app.focus.grid_cell();
    if step > 0 {
        if cursor + 1 < len {
            app.select(app.focus, cursor + 1);
        } else if let Some(below) = Quadrant::from_grid_cell(row + 1, col) {
            app.select(below, 0);
        }
    } else if cursor > 0 {
        app.select(app.focus, cursor - 1);
    } else if let Some(above) = row
        .checked_sub(1)
        .and_then(|r| Quadrant::from_grid_cell(r, col))
    {
        let last = app.store.len(above).saturating_sub(1);
        app.select(above, last);
    }
}

fn move_column(app: &mut App, col: usize) {
    let (row, _) = app.focus.grid_cell();
    if let Some(q) = Quadrant::from_grid_cell(row, col) {
        app.focus = q;
    }
}

fn cycle_focus(app: &mut App, step: isize) {
    let i = app.focus.index() as isize;
    let next = (i + step).rem_euclid(Quadrant::ALL.len() as isize) as usize;
    app.focus = Quadrant::ALL[next];
}
