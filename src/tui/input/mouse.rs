use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::ops::drag::DragPayload;
use crate::tui::app::{App, Mode, MouseDrag};

/// Pointer input on the board. Press on a task and release on the same spot
/// toggles it; press, move and release elsewhere drags it.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.mode != Mode::Navigate {
        return;
    }
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => press(app, column, row),
        MouseEventKind::Drag(MouseButton::Left) => {
            let hover = app.hit_test(column, row);
            if let Some(drag) = app.mouse_drag.as_mut() {
                drag.moved |= (column, row) != drag.start;
                drag.hover = hover;
            }
        }
        MouseEventKind::Up(MouseButton::Left) => release(app, column, row),
        MouseEventKind::ScrollDown => scroll(app, column, row, 1),
        MouseEventKind::ScrollUp => scroll(app, column, row, -1),
        _ => {}
    }
}

fn press(app: &mut App, column: u16, row: u16) {
    app.status = None;
    app.mouse_drag = None;
    let Some((quadrant, task_row)) = app.hit_test(column, row) else {
        return;
    };
    app.focus = quadrant;
    let Some(task_row) = task_row else {
        return;
    };
    app.select(quadrant, task_row);
    if let Some(payload) = DragPayload::capture(&app.store, quadrant, task_row) {
        app.mouse_drag = Some(MouseDrag {
            payload: payload.encode(),
            origin: (quadrant, task_row),
            start: (column, row),
            moved: false,
            hover: Some((quadrant, Some(task_row))),
        });
    }
}

fn release(app: &mut App, column: u16, row: u16) {
    let Some(drag) = app.mouse_drag.take() else {
        return;
    };
    if !drag.moved && (column, row) == drag.start {
        app.toggle_at(drag.origin.0, drag.origin.1);
        return;
    }
    // Released outside the board: nothing happens
    if let Some((quadrant, task_row)) = app.hit_test(column, row) {
        app.drop_payload(quadrant, task_row, &drag.payload);
    }
}

fn scroll(app: &mut App, column: u16, row: u16, step: isize) {
    let Some((quadrant, _)) = app.hit_test(column, row) else {
        return;
    };
    let cursor = app.cursors[quadrant.index()];
    app.select(quadrant, cursor.saturating_add_signed(step));
}
