pub mod header;
pub mod quadrant_pane;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::model::task::Quadrant;

use super::app::App;

/// Main render function: header, the 2×2 board, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title, event + countdown
            Constraint::Min(4),    // quadrants
            Constraint::Length(1), // status row
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    for (r, row_area) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            if let Some(q) = Quadrant::from_grid_cell(r, c) {
                quadrant_pane::render_pane(frame, app, q, *cell);
            }
        }
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn board_shows_all_four_quadrants() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(
            tmp.path(),
            &[
                (Quadrant::UrgentImportant, "buy milk"),
                (Quadrant::NeitherUrgentNorImportant, "tidy desk"),
            ],
        );
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        for q in Quadrant::ALL {
            assert!(output.contains(q.label()), "missing pane {}", q.label());
        }
        assert!(output.contains("buy milk"));
        assert!(output.contains("tidy desk"));
    }

    #[test]
    fn render_records_pane_areas_for_hit_tests() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(Quadrant::UrgentImportant, "x")]);
        render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));

        let top_left = app.pane_areas[Quadrant::ImportantNotUrgent.index()];
        let top_right = app.pane_areas[Quadrant::UrgentImportant.index()];
        let bottom_left = app.pane_areas[Quadrant::NeitherUrgentNorImportant.index()];
        assert_eq!(top_left.y, top_right.y);
        assert!(top_right.x > top_left.x);
        assert!(bottom_left.y > top_left.y);

        let list = app.list_areas[Quadrant::UrgentImportant.index()];
        assert_eq!(
            app.hit_test(list.x, list.y),
            Some((Quadrant::UrgentImportant, Some(0)))
        );
        assert_eq!(
            app.hit_test(list.x, list.y + 1),
            Some((Quadrant::UrgentImportant, None))
        );
        assert_eq!(app.hit_test(0, 0), None);
    }
}
