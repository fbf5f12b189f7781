use serde::Serialize;

use crate::model::config::Configuration;
use crate::model::task::{Quadrant, Task};
use crate::ops::countdown::Countdown;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// 1-based position inside the quadrant
    pub position: usize,
    pub content: String,
    pub quadrant: Quadrant,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    pub is_done: bool,
}

#[derive(Serialize)]
pub struct QuadrantJson {
    pub quadrant: Quadrant,
    pub alias: &'static str,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct CountdownJson {
    pub event_name: String,
    pub target_date: String,
    pub days: i64,
    pub display_days: i64,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct ExportJson {
    pub path: String,
    pub rows: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(quadrant: Quadrant, index: usize, task: &Task) -> TaskJson {
    TaskJson {
        position: index + 1,
        content: task.content.clone(),
        quadrant,
        created_at: task.created_label(),
        finished_at: task.is_done().then(|| task.finished_label()),
        is_done: task.is_done(),
    }
}

pub fn countdown_to_json(config: &Configuration, countdown: Countdown) -> CountdownJson {
    CountdownJson {
        event_name: config.event_name.clone(),
        target_date: config.target_date.format("%Y-%m-%d").to_string(),
        days: countdown.days,
        display_days: countdown.display_days(),
        overdue: countdown.is_overdue(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `  2. [x] content  (created → finished)`
pub fn format_task_line(index: usize, task: &Task) -> String {
    let mark = if task.is_done() { "[x]" } else { "[ ]" };
    let mut line = format!(
        "  {}. {} {}  ({}",
        index + 1,
        mark,
        task.content,
        task.created_label()
    );
    if task.is_done() {
        line.push_str(" → ");
        line.push_str(&task.finished_label());
    }
    line.push(')');
    line
}

/// `紧急重要 (do) [2]`
pub fn format_quadrant_heading(quadrant: Quadrant, count: usize) -> String {
    format!("{} ({}) [{}]", quadrant.label(), quadrant.alias(), count)
}
