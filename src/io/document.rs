//! The persisted JSON document and its conversion to and from the board.
//!
//! Every field is optional on read. Missing, mistyped or unusable values fall
//! back to the default for that field alone, and a task entry that cannot be
//! read is skipped on its own, so documents written by older or newer versions
//! still load. Every field is written on save.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::config::{Configuration, FontSizes, WindowSize};
use crate::model::store::TaskStore;
use crate::model::task::{NOT_FINISHED, Quadrant, Task, now_stamp, parse_stamp};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub main_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_locked: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub auto_start: Option<bool>,
    #[serde(default, deserialize_with = "lenient_record")]
    pub window_size: Option<WindowSizeRecord>,
    #[serde(default, deserialize_with = "lenient_record")]
    pub font_sizes: Option<FontSizesRecord>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub tasks: Option<Vec<TaskRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSizeRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizesRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub event: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub countdown: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub quadrant_title: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub task: Option<i64>,
}

/// One entry of the flattened task list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quadrant: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub finished_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_done: Option<bool>,
}

/// Read a field as `T`, treating a value of the wrong type like a missing one.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Read a nested record. Anything but a JSON object counts as missing.
fn lenient_record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(record_from_value(value))
}

/// Read a list, dropping the entries that are not usable records.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(entries) = value else {
        return Ok(None);
    };
    Ok(Some(entries.into_iter().filter_map(record_from_value).collect()))
}

fn record_from_value<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

// ---------------------------------------------------------------------------
// Board -> document
// ---------------------------------------------------------------------------

impl StateDocument {
    /// Full document for the current board. Tasks are flattened quadrant by
    /// quadrant, each lane in its current order.
    pub fn from_state(store: &TaskStore, config: &Configuration) -> Self {
        StateDocument {
            main_title: Some(config.main_title.clone()),
            event_name: Some(config.event_name.clone()),
            target_date: Some(config.target_date.format(DATE_FORMAT).to_string()),
            is_locked: Some(config.is_locked),
            auto_start: Some(config.auto_start),
            window_size: Some(WindowSizeRecord {
                width: Some(config.window_size.width.into()),
                height: Some(config.window_size.height.into()),
            }),
            font_sizes: Some(FontSizesRecord {
                title: Some(config.font_sizes.title.into()),
                event: Some(config.font_sizes.event.into()),
                countdown: Some(config.font_sizes.countdown.into()),
                quadrant_title: Some(config.font_sizes.quadrant_title.into()),
                task: Some(config.font_sizes.task.into()),
            }),
            tasks: Some(
                store
                    .iter()
                    .map(|(quadrant, task)| TaskRecord {
                        content: Some(task.content.clone()),
                        quadrant: Some(quadrant.label().to_string()),
                        created_at: Some(task.created_label()),
                        finished_at: Some(task.finished_label()),
                        is_done: Some(task.is_done()),
                    })
                    .collect(),
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Document -> board
    // -----------------------------------------------------------------------

    /// Configuration from the fields present, defaults for the rest.
    pub fn configuration(&self) -> Configuration {
        let defaults = Configuration::default();
        let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();

        let target_date = self
            .target_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
            .unwrap_or(defaults.target_date);

        let window_size = match &self.window_size {
            Some(ws) => {
                let width = positive(ws.width).unwrap_or(defaults.window_size.width);
                let height = positive(ws.height).unwrap_or(defaults.window_size.height);
                WindowSize { width, height }
            }
            None => defaults.window_size,
        };

        let d = defaults.font_sizes;
        let font_sizes = match &self.font_sizes {
            Some(fs) => FontSizes {
                title: positive(fs.title).unwrap_or(d.title),
                event: positive(fs.event).unwrap_or(d.event),
                task: positive(fs.task).unwrap_or(d.task),
                countdown: positive(fs.countdown).unwrap_or(d.countdown),
                quadrant_title: positive(fs.quadrant_title).unwrap_or(d.quadrant_title),
            },
            None => d,
        };

        Configuration {
            main_title: non_empty(&self.main_title).unwrap_or(defaults.main_title),
            event_name: non_empty(&self.event_name).unwrap_or(defaults.event_name),
            target_date,
            is_locked: self.is_locked.unwrap_or(defaults.is_locked),
            auto_start: self.auto_start.unwrap_or(defaults.auto_start),
            window_size,
            font_sizes,
        }
    }

    /// Rebuild the store from the flattened list, in list order.
    ///
    /// Entries without a quadrant go to 紧急重要 and entries without a
    /// creation stamp are stamped now. Entries with an unknown quadrant, no
    /// content or an unreadable creation stamp are skipped.
    pub fn task_store(&self) -> TaskStore {
        let mut store = TaskStore::new();
        for record in self.tasks.iter().flatten() {
            if let Some((quadrant, task)) = record.to_task() {
                store.push(quadrant, task);
            }
        }
        store
    }
}

impl TaskRecord {
    fn to_task(&self) -> Option<(Quadrant, Task)> {
        let content = self.content.as_ref().filter(|c| !c.is_empty())?;
        let quadrant = match &self.quadrant {
            Some(label) => Quadrant::from_label(label)?,
            None => Quadrant::UrgentImportant,
        };
        let created_at = match self.created_at.as_deref() {
            Some(stamp) => parse_stamp(stamp)?,
            None => now_stamp(),
        };
        let finished_at = self
            .finished_at
            .as_deref()
            .filter(|s| *s != NOT_FINISHED)
            .and_then(parse_stamp);
        let is_done = self.is_done.unwrap_or(false);
        Some((
            quadrant,
            Task::restore(content.clone(), created_at, finished_at, is_done),
        ))
    }
}

fn positive(n: Option<i64>) -> Option<u32> {
    n.filter(|n| *n > 0).and_then(|n| u32::try_from(n).ok())
}
