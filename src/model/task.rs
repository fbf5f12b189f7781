use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Format used for `created_at` / `finished_at` everywhere (document, CSV, payloads)
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Marker stored in place of `finished_at` while a task is not done
pub const NOT_FINISHED: &str = "未完成";

/// One of the four urgent × important buckets.
///
/// Declaration order is the board order (top-left, top-right, bottom-left,
/// bottom-right) and the order tasks are flattened in when saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    #[serde(rename = "不紧急重要")]
    ImportantNotUrgent,
    #[serde(rename = "紧急重要")]
    UrgentImportant,
    #[serde(rename = "不紧急不重要")]
    NeitherUrgentNorImportant,
    #[serde(rename = "紧急不重要")]
    UrgentNotImportant,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::ImportantNotUrgent,
        Quadrant::UrgentImportant,
        Quadrant::NeitherUrgentNorImportant,
        Quadrant::UrgentNotImportant,
    ];

    /// The label used in the data file, CSV export and pane titles
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::ImportantNotUrgent => "不紧急重要",
            Quadrant::UrgentImportant => "紧急重要",
            Quadrant::NeitherUrgentNorImportant => "不紧急不重要",
            Quadrant::UrgentNotImportant => "紧急不重要",
        }
    }

    /// Parse a stored label. Only the four exact labels are accepted.
    pub fn from_label(label: &str) -> Option<Quadrant> {
        Quadrant::ALL.into_iter().find(|q| q.label() == label)
    }

    /// Short English alias accepted on the command line
    pub fn alias(self) -> &'static str {
        match self {
            Quadrant::ImportantNotUrgent => "schedule",
            Quadrant::UrgentImportant => "do",
            Quadrant::NeitherUrgentNorImportant => "eliminate",
            Quadrant::UrgentNotImportant => "delegate",
        }
    }

    /// Position in `ALL` (also the lane index inside the store)
    pub fn index(self) -> usize {
        match self {
            Quadrant::ImportantNotUrgent => 0,
            Quadrant::UrgentImportant => 1,
            Quadrant::NeitherUrgentNorImportant => 2,
            Quadrant::UrgentNotImportant => 3,
        }
    }

    /// (row, column) cell of this quadrant in the 2×2 grid
    pub fn grid_cell(self) -> (usize, usize) {
        let i = self.index();
        (i / 2, i % 2)
    }

    pub fn from_grid_cell(row: usize, col: usize) -> Option<Quadrant> {
        if row > 1 || col > 1 {
            return None;
        }
        Some(Quadrant::ALL[row * 2 + col])
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quadrant {
    type Err = String;

    /// Accepts the stored label, the English alias, or the 1-based board position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(q) = Quadrant::from_label(s) {
            return Ok(q);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(q) = Quadrant::ALL.into_iter().find(|q| q.alias() == lower) {
            return Ok(q);
        }
        match s.parse::<usize>() {
            Ok(n @ 1..=4) => Ok(Quadrant::ALL[n - 1]),
            _ => Err(format!(
                "unknown quadrant '{}' (expected one of: do, schedule, delegate, eliminate, 1-4)",
                s
            )),
        }
    }
}

/// Current local time truncated to whole minutes
pub fn now_stamp() -> NaiveDateTime {
    truncate_to_minute(Local::now().naive_local())
}

pub fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

pub fn format_stamp(t: NaiveDateTime) -> String {
    t.format(STAMP_FORMAT).to_string()
}

pub fn parse_stamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), STAMP_FORMAT).ok()
}

/// A single task on the board.
///
/// The quadrant is not stored here: a task belongs to whichever lane of the
/// [`TaskStore`](crate::model::TaskStore) holds it. `finished_at` is only
/// changed through [`Task::toggle`], so it is set exactly when the task is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub content: String,
    created_at: NaiveDateTime,
    finished_at: Option<NaiveDateTime>,
}

impl Task {
    /// A fresh, not-done task created at `now`
    pub fn new(content: String, now: NaiveDateTime) -> Self {
        Task {
            content,
            created_at: truncate_to_minute(now),
            finished_at: None,
        }
    }

    /// Rebuild a task from stored fields. A done task without a finish stamp
    /// takes its creation stamp; a not-done task never keeps one.
    pub fn restore(
        content: String,
        created_at: NaiveDateTime,
        finished_at: Option<NaiveDateTime>,
        is_done: bool,
    ) -> Self {
        let created_at = truncate_to_minute(created_at);
        let finished_at = if is_done {
            Some(finished_at.map_or(created_at, truncate_to_minute))
        } else {
            None
        };
        Task {
            content,
            created_at,
            finished_at,
        }
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<NaiveDateTime> {
        self.finished_at
    }

    pub fn is_done(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Flip done state. Returns the new `is_done`.
    pub fn toggle(&mut self, now: NaiveDateTime) -> bool {
        self.finished_at = match self.finished_at {
            Some(_) => None,
            None => Some(truncate_to_minute(now)),
        };
        self.is_done()
    }

    pub fn created_label(&self) -> String {
        format_stamp(self.created_at)
    }

    /// Finish stamp, or the not-finished marker
    pub fn finished_label(&self) -> String {
        match self.finished_at {
            Some(t) => format_stamp(t),
            None => NOT_FINISHED.to_string(),
        }
    }
}
