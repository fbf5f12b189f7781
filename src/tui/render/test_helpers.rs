use std::path::Path;

use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use crate::model::config::Configuration;
use crate::model::store::TaskStore;
use crate::model::task::{Quadrant, Task};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return it (styles included).
pub fn render_to_buffer<F>(w: u16, h: u16, f: F) -> Buffer
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let buf = render_to_buffer(w, h, f);
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let mut s = String::new();
            let mut skip = 0;
            for cell in row {
                // The cell after a wide grapheme is covered by it
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let symbol = cell.symbol();
                skip = symbol.width().saturating_sub(1);
                s.push_str(symbol);
            }
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An app over an in-memory board. Nothing is written until an action saves;
/// the data file would live in `dir`.
pub fn app_with_tasks(dir: &Path, tasks: &[(Quadrant, &str)]) -> App {
    let stamp = NaiveDate::from_ymd_opt(2026, 1, 5)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let mut store = TaskStore::new();
    for (q, content) in tasks {
        store.push(*q, Task::new(content.to_string(), stamp));
    }
    let mut config = Configuration::default();
    config.target_date = NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
    App::new(store, config, dir.join("tasks_data.json"))
}

/// Task contents of one quadrant, in order
pub fn contents(app: &App, quadrant: Quadrant) -> Vec<&str> {
    app.store
        .tasks(quadrant)
        .iter()
        .map(|t| t.content.as_str())
        .collect()
}
