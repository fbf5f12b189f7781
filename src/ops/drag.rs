//! Drag-and-drop between (and within) quadrants.
//!
//! At drag start the dragged task is packed, together with where it came from,
//! into a [`DragPayload`] that travels as JSON text. On drop the payload is
//! decoded and checked against the store before anything moves; a payload
//! that does not decode or no longer points at its task is rejected and the
//! store is left exactly as it was.

use serde::{Deserialize, Serialize};

use crate::model::store::TaskStore;
use crate::model::task::{NOT_FINISHED, Quadrant, Task, parse_stamp};
use crate::ops::task_ops;

/// Snapshot of a dragged task plus its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub content: String,
    pub created_at: String,
    pub finished_at: String,
    pub is_done: bool,
    pub source_quadrant: String,
    pub source_row: usize,
}

/// Why a drop was refused
#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("malformed drag payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("drag payload names unknown quadrant '{0}'")]
    UnknownQuadrant(String),
    #[error("drag payload has an invalid timestamp '{0}'")]
    BadTimestamp(String),
    #[error("dragged task '{content}' is no longer in {quadrant}")]
    Stale { quadrant: Quadrant, content: String },
}

impl DragPayload {
    /// Snapshot the task at `row` of `quadrant`. Returns `None` when the row
    /// holds no task, so only real tasks can be dragged.
    pub fn capture(store: &TaskStore, quadrant: Quadrant, row: usize) -> Option<DragPayload> {
        let task = store.task(quadrant, row)?;
        Some(DragPayload {
            content: task.content.clone(),
            created_at: task.created_label(),
            finished_at: task.finished_label(),
            is_done: task.is_done(),
            source_quadrant: quadrant.label().to_string(),
            source_row: row,
        })
    }

    /// Payload text as put on the drag
    pub fn encode(&self) -> String {
        // A struct of strings, bools and integers always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(text: &str) -> Result<DragPayload, DropError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn source_quadrant(&self) -> Result<Quadrant, DropError> {
        Quadrant::from_label(&self.source_quadrant)
            .ok_or_else(|| DropError::UnknownQuadrant(self.source_quadrant.clone()))
    }

    /// Whether `task` is the task this payload was captured from
    fn matches(&self, task: &Task) -> bool {
        task.content == self.content && task.created_label() == self.created_at
    }

    fn validate_fields(&self) -> Result<(), DropError> {
        if parse_stamp(&self.created_at).is_none() {
            return Err(DropError::BadTimestamp(self.created_at.clone()));
        }
        if self.is_done && parse_stamp(&self.finished_at).is_none() {
            return Err(DropError::BadTimestamp(self.finished_at.clone()));
        }
        if !self.is_done
            && self.finished_at != NOT_FINISHED
            && parse_stamp(&self.finished_at).is_none()
        {
            return Err(DropError::BadTimestamp(self.finished_at.clone()));
        }
        Ok(())
    }

    /// Locate the dragged task in the store as it is now.
    ///
    /// The recorded row wins when it still holds the same task. If the store
    /// changed since the drag started, the first task in the source quadrant
    /// matching the snapshot is used instead; if there is none the drop is stale.
    pub fn locate(&self, store: &TaskStore) -> Result<(Quadrant, usize), DropError> {
        let quadrant = self.source_quadrant()?;
        if store
            .task(quadrant, self.source_row)
            .is_some_and(|t| self.matches(t))
        {
            return Ok((quadrant, self.source_row));
        }
        store
            .tasks(quadrant)
            .iter()
            .position(|t| self.matches(t))
            .map(|row| (quadrant, row))
            .ok_or_else(|| DropError::Stale {
                quadrant,
                content: self.content.clone(),
            })
    }
}

/// Drop row for a pointer position: the row under the pointer, or the end of
/// the list when the pointer is over empty space.
pub fn resolve_drop_index(row_under_pointer: Option<usize>, len: usize) -> usize {
    match row_under_pointer {
        Some(row) if row < len => row,
        _ => len,
    }
}

/// Complete a drop of `payload_text` onto `dest` at `drop_row`.
///
/// Returns where the task now lives. Either the task ends up in exactly one
/// place with all its fields, or the store is unchanged.
pub fn complete_drop(
    store: &mut TaskStore,
    dest: Quadrant,
    drop_row: Option<usize>,
    payload_text: &str,
) -> Result<(Quadrant, usize), DropError> {
    let payload = DragPayload::decode(payload_text)?;
    payload.validate_fields()?;
    let (source, source_row) = payload.locate(store)?;
    let dest_row = resolve_drop_index(drop_row, store.len(dest));
    let placed = task_ops::transfer(store, source, source_row, dest, dest_row).map_err(|_| {
        DropError::Stale {
            quadrant: source,
            content: payload.content.clone(),
        }
    })?;
    Ok((dest, placed))
}
