use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

/// Two header rows: lock + title on the left, countdown on the right;
/// event label and target date below.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let countdown = app.countdown();

    let mut title = Vec::new();
    if app.config.is_locked {
        title.push(Span::styled("[锁] ", Style::default().fg(app.theme.alert).bg(bg)));
    }
    title.push(Span::styled(
        app.config.main_title.clone(),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ));
    let event = Line::from(vec![
        Span::styled(
            app.config.event_name.clone(),
            Style::default().fg(app.theme.text).bg(bg),
        ),
        Span::styled(
            format!("  {}", app.config.target_date.format("%Y-%m-%d")),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ]);
    let left = Paragraph::new(vec![Line::from(title), event]).style(Style::default().bg(bg));
    frame.render_widget(left, area);

    let days = Line::from(Span::styled(
        countdown.label(),
        Style::default()
            .fg(app.theme.countdown_color(countdown.is_overdue()))
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ));
    let right = Paragraph::new(days).alignment(Alignment::Right);
    frame.render_widget(right, area);
}
