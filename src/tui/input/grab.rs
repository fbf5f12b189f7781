use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::Quadrant;
use crate::tui::app::App;

use super::quadrant_key;

/// Keyboard drag: choose a quadrant and a spot, then drop
pub(super) fn handle_grab(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_grab(),
        KeyCode::Enter | KeyCode::Char('m' | ' ') => app.finish_grab(),
        KeyCode::Up | KeyCode::Char('k') => step_row(app, -1),
        KeyCode::Down | KeyCode::Char('j') => step_row(app, 1),
        KeyCode::Left | KeyCode::Char('h') => retarget_column(app, 0),
        KeyCode::Right | KeyCode::Char('l') => retarget_column(app, 1),
        KeyCode::Tab => {
            let next = app.grab.as_ref().map(|g| (g.target.index() + 1) % Quadrant::ALL.len());
            if let Some(i) = next {
                retarget(app, Quadrant::ALL[i]);
            }
        }
        KeyCode::Char(c) => {
            if let Some(q) = quadrant_key(c) {
                retarget(app, q);
            }
        }
        _ => {}
    }
}

fn step_row(app: &mut App, step: isize) {
    let Some(grab) = app.grab.as_mut() else {
        return;
    };
    let len = app.store.len(grab.target);
    grab.row = grab.row.saturating_add_signed(step).min(len);
}

fn retarget_column(app: &mut App, col: usize) {
    let Some(target) = app.grab.as_ref().map(|g| g.target) else {
        return;
    };
    let (row, _) = target.grid_cell();
    if let Some(q) = Quadrant::from_grid_cell(row, col) {
        retarget(app, q);
    }
}

fn retarget(app: &mut App, quadrant: Quadrant) {
    let len = app.store.len(quadrant);
    if let Some(grab) = app.grab.as_mut()
        && grab.target != quadrant
    {
        grab.target = quadrant;
        grab.row = grab.row.min(len);
        app.focus = quadrant;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::*;
    use tempfile::TempDir;

    const SCHEDULE: Quadrant = Quadrant::ImportantNotUrgent;
    const DO: Quadrant = Quadrant::UrgentImportant;
    const DELEGATE: Quadrant = Quadrant::UrgentNotImportant;

    fn grabbed(tasks: &[(Quadrant, &str)]) -> (TempDir, App) {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), tasks);
        app.select(DO, 0);
        handle_key(&mut app, ch('m'));
        assert_eq!(app.mode, Mode::Grab);
        (tmp, app)
    }

    #[test]
    fn drop_at_end_of_own_quadrant() {
        let (_tmp, mut app) = grabbed(&[(DO, "a"), (DO, "b"), (DO, "c")]);
        for _ in 0..5 {
            handle_key(&mut app, key(KeyCode::Down));
        }
        assert_eq!(app.grab.as_ref().map(|g| g.row), Some(3));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(contents(&app, DO), vec!["b", "c", "a"]);
    }

    #[test]
    fn enter_right_away_puts_the_task_back() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a"), (DO, "b"), (DO, "c")]);
        app.select(DO, 1);
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(contents(&app, DO), vec!["a", "b", "c"]);

        // leaving and coming back to the start slot is also a no-op
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, key(KeyCode::Up));
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(contents(&app, DO), vec!["a", "b", "c"]);
    }

    #[test]
    fn switch_quadrant_with_arrows_and_digits() {
        let (_tmp, mut app) = grabbed(&[(DO, "a"), (SCHEDULE, "s")]);
        handle_key(&mut app, key(KeyCode::Left));
        assert_eq!(app.grab.as_ref().map(|g| g.target), Some(SCHEDULE));
        handle_key(&mut app, ch('4'));
        assert_eq!(app.grab.as_ref().map(|g| g.target), Some(DELEGATE));
        // Empty target clamps the spot to 0
        assert_eq!(app.grab.as_ref().map(|g| g.row), Some(0));
        handle_key(&mut app, ch(' '));
        assert!(contents(&app, DO).is_empty());
        assert_eq!(contents(&app, DELEGATE), vec!["a"]);
        assert_eq!((app.focus, app.cursor()), (DELEGATE, 0));
    }

    #[test]
    fn escape_leaves_board_unchanged() {
        let (_tmp, mut app) = grabbed(&[(DO, "a"), (DO, "b")]);
        let before = app.store.clone();
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.grab.is_none());
        assert_eq!(app.store, before);
    }
}
