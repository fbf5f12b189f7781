use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode::display_width;

const NAVIGATE_HINT: &str = "a add  spc done  d del  m move  L lock  E export  q quit";
const EDIT_HINT: &str = "enter save  esc cancel";
const GRAB_HINT: &str = "↑↓ spot  ←→ quadrant  enter drop  esc cancel";

/// Push `hint` flush right if it fits after the spans already in `spans`
fn push_right_hint(
    spans: &mut Vec<Span<'static>>,
    hint: &str,
    style: Style,
    bg: Style,
    width: usize,
) {
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if used + hint_width < width {
        spans.push(Span::styled(" ".repeat(width - used - hint_width), bg));
        spans.push(Span::styled(hint.to_string(), style));
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = Style::default().bg(app.theme.background);
    let dim = Style::default().fg(app.theme.dim).bg(app.theme.background);
    let width = area.width as usize;

    let mut spans: Vec<Span<'static>> = Vec::new();
    match app.mode {
        Mode::Edit => {
            if let Some(edit) = &app.edit {
                let (before, after) = edit.buffer.split_at(edit.cursor.min(edit.buffer.len()));
                let text = Style::default()
                    .fg(app.theme.text_bright)
                    .bg(app.theme.background);
                let accent = Style::default()
                    .fg(app.theme.highlight)
                    .bg(app.theme.background);
                spans.push(Span::styled(format!("{}: ", edit.target.prompt()), accent));
                spans.push(Span::styled(before.to_string(), text));
                spans.push(Span::styled("▌", accent));
                spans.push(Span::styled(after.to_string(), text));
            }
            // An invalid date keeps the editor open with the reason on the right
            match &app.status {
                Some(status) if status.is_error => {
                    let alert = Style::default().fg(app.theme.alert).bg(app.theme.background);
                    push_right_hint(&mut spans, &status.text, alert, bg, width);
                }
                _ => push_right_hint(&mut spans, EDIT_HINT, dim, bg, width),
            }
        }
        Mode::Grab => {
            if let Some(grab) = &app.grab {
                spans.push(Span::styled(
                    format!("moving to {}, spot {}", grab.target.label(), grab.row + 1),
                    Style::default().fg(app.theme.highlight).bg(app.theme.background),
                ));
            }
            push_right_hint(&mut spans, GRAB_HINT, dim, bg, width);
        }
        Mode::Navigate => match &app.status {
            Some(status) => {
                let fg = if status.is_error {
                    app.theme.alert
                } else {
                    app.theme.text
                };
                spans.push(Span::styled(
                    status.text.clone(),
                    Style::default().fg(fg).bg(app.theme.background),
                ));
            }
            None => push_right_hint(&mut spans, NAVIGATE_HINT, dim, bg, width),
        },
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Quadrant;
    use crate::tui::app::EditTarget;
    use crate::tui::render::test_helpers::*;
    use tempfile::TempDir;

    fn status_text(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn navigate_shows_hints_without_status() {
        let tmp = TempDir::new().unwrap();
        let app = app_with_tasks(tmp.path(), &[]);
        assert!(status_text(&app).ends_with("q quit"));
    }

    #[test]
    fn navigate_shows_status_in_place_of_hints() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[]);
        app.set_error("export failed: permission denied");
        assert_eq!(status_text(&app), "export failed: permission denied");

        let buf = render_to_buffer(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(buf.cell((0, 0)).unwrap().fg, app.theme.alert);
    }

    #[test]
    fn edit_shows_prompt_and_cursor() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[]);
        app.begin_edit(EditTarget::NewTask(Quadrant::UrgentImportant));
        if let Some(edit) = app.edit.as_mut() {
            edit.buffer = "写周报".into();
            edit.cursor = "写".len();
        }
        let out = status_text(&app);
        assert!(out.starts_with("新增任务 (紧急重要): 写▌周报"), "{}", out);
        assert!(out.ends_with("esc cancel"));
    }

    #[test]
    fn grab_shows_target() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(Quadrant::UrgentImportant, "x")]);
        app.begin_grab();
        let out = status_text(&app);
        assert!(out.starts_with("moving to 紧急重要, spot 1"), "{}", out);
    }
}
