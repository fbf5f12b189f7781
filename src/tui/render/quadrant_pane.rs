use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::model::task::{Quadrant, Task};
use crate::tui::app::{App, Mode};
use crate::tui::theme::Theme;
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

const DONE_MARK: &str = "✓ ";
const OPEN_MARK: &str = "· ";

/// How a row is drawn, decided by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowState {
    pub selected: bool,
    /// Under the pointer while a mouse drag is in progress
    pub drop_hover: bool,
}

/// Visual row for a task. The view holds no task data of its own; every
/// frame is projected from the store.
pub fn task_line(
    task: &Task,
    state: RowState,
    theme: &Theme,
    bg: Color,
    width: usize,
) -> Line<'static> {
    let mark = if task.is_done() { DONE_MARK } else { OPEN_MARK };
    let text_width = width.saturating_sub(display_width(mark));
    let text = if state.selected {
        pad_to_width(&task.content, text_width)
    } else {
        truncate_to_width(&task.content, text_width)
    };

    let mut style = if task.is_done() {
        Style::default()
            .fg(theme.done)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(theme.text).bg(bg)
    };
    if state.selected {
        style = style.fg(theme.selection_fg).bg(theme.selection_bg);
    }
    if state.drop_hover {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    let mark_style = if state.selected {
        style.remove_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(theme.dim).bg(bg)
    };
    Line::from(vec![Span::styled(mark, mark_style), Span::styled(text, style)])
}

fn drop_marker(theme: &Theme, bg: Color, width: usize) -> Line<'static> {
    let arrow = "▸ ";
    let rule = "─".repeat(width.saturating_sub(display_width(arrow)));
    Line::from(Span::styled(
        format!("{}{}", arrow, rule),
        Style::default().fg(theme.highlight).bg(bg),
    ))
}

/// First visible row so that `anchor` is on screen
fn scroll_for(scroll: usize, anchor: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    if anchor < scroll {
        anchor
    } else if anchor >= scroll + visible {
        anchor + 1 - visible
    } else {
        scroll
    }
}

/// Render one quadrant: bordered pane, label, task rows. Records the pane
/// and list rectangles on `app` for mouse hit tests.
pub fn render_pane(frame: &mut Frame, app: &mut App, quadrant: Quadrant, area: Rect) {
    let i = quadrant.index();
    let bg = app.theme.quadrant_bg(quadrant);
    let focused = app.focus == quadrant && app.mode != Mode::Grab;

    let grab_row = app
        .grab
        .as_ref()
        .filter(|g| g.target == quadrant)
        .map(|g| g.row);
    let hover = app
        .mouse_drag
        .as_ref()
        .filter(|d| d.moved)
        .and_then(|d| d.hover)
        .filter(|(q, _)| *q == quadrant);
    let is_drop_target = grab_row.is_some() || hover.is_some();

    let border_style = if is_drop_target {
        Style::default()
            .fg(app.theme.highlight)
            .add_modifier(Modifier::BOLD)
    } else if focused {
        Style::default().fg(app.theme.text_bright)
    } else {
        Style::default().fg(app.theme.dim)
    };
    let len = app.store.len(quadrant);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style.bg(bg))
        .title(Span::styled(
            format!(" {} ", quadrant.label()),
            Style::default()
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(format!(" {} ", len)).right_aligned())
        .style(Style::default().bg(bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.pane_areas[i] = area;
    app.list_areas[i] = inner;

    let height = usize::from(inner.height);
    let width = usize::from(inner.width);
    let visible = if grab_row.is_some() {
        height.saturating_sub(1)
    } else {
        height
    };
    let anchor = grab_row.unwrap_or(app.cursors[i]).min(len.saturating_sub(1));
    app.scroll[i] =
        scroll_for(app.scroll[i], anchor, visible).min(len.saturating_sub(visible));
    let scroll = app.scroll[i];

    let mut lines = Vec::with_capacity(visible + 1);
    let rows = app.store.tasks(quadrant).iter().enumerate();
    for (row, task) in rows.skip(scroll).take(visible) {
        if grab_row == Some(row) {
            lines.push(drop_marker(&app.theme, bg, width));
        }
        let state = RowState {
            selected: focused && app.cursors[i] == row,
            drop_hover: hover.is_some_and(|(_, r)| r == Some(row)),
        };
        lines.push(task_line(task, state, &app.theme, bg, width));
    }
    if grab_row.is_some_and(|r| r >= len) {
        lines.push(drop_marker(&app.theme, bg, width));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}
