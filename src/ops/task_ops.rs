use chrono::NaiveDateTime;

use crate::model::store::TaskStore;
use crate::model::task::{Quadrant, Task};

/// Error type for task operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task text is empty")]
    EmptyContent,
    #[error("no task at {quadrant} #{index}")]
    NotFound { quadrant: Quadrant, index: usize },
    #[error("cannot move task {offset:+} from position {index} in {quadrant}")]
    OutOfBounds {
        quadrant: Quadrant,
        index: usize,
        offset: isize,
    },
    #[error("tasks move one position at a time (got offset {0})")]
    InvalidOffset(isize),
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append a new task to the end of `quadrant`. Surrounding whitespace is
/// trimmed; blank text is rejected and leaves the store untouched.
pub fn add_task<'a>(
    store: &'a mut TaskStore,
    quadrant: Quadrant,
    content: &str,
    now: NaiveDateTime,
) -> Result<&'a Task, TaskError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(TaskError::EmptyContent);
    }
    let lane = store.lane_mut(quadrant);
    lane.push(Task::new(content.to_string(), now));
    Ok(&lane[lane.len() - 1])
}

/// Flip a task between done and not done. Position is unchanged.
/// Returns the new done state.
pub fn toggle_task(
    store: &mut TaskStore,
    quadrant: Quadrant,
    index: usize,
    now: NaiveDateTime,
) -> Result<bool, TaskError> {
    let task = store
        .task_mut(quadrant, index)
        .ok_or(TaskError::NotFound { quadrant, index })?;
    Ok(task.toggle(now))
}

/// Remove and return the task at `index`.
pub fn delete_task(
    store: &mut TaskStore,
    quadrant: Quadrant,
    index: usize,
) -> Result<Task, TaskError> {
    let lane = store.lane_mut(quadrant);
    if index >= lane.len() {
        return Err(TaskError::NotFound { quadrant, index });
    }
    Ok(lane.remove(index))
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Whether a ±1 move from `index` stays inside the quadrant
pub fn can_move_within(store: &TaskStore, quadrant: Quadrant, index: usize, offset: isize) -> bool {
    let len = store.len(quadrant);
    match offset {
        -1 => index > 0 && index < len,
        1 => index + 1 < len,
        _ => false,
    }
}

/// Move a task one step up (`-1`) or down (`+1`) inside its quadrant.
/// Returns the task's new index.
pub fn move_within_quadrant(
    store: &mut TaskStore,
    quadrant: Quadrant,
    index: usize,
    offset: isize,
) -> Result<usize, TaskError> {
    if offset != -1 && offset != 1 {
        return Err(TaskError::InvalidOffset(offset));
    }
    if !can_move_within(store, quadrant, index, offset) {
        return Err(TaskError::OutOfBounds {
            quadrant,
            index,
            offset,
        });
    }
    let target = if offset < 0 { index - 1 } else { index + 1 };
    store.lane_mut(quadrant).swap(index, target);
    Ok(target)
}

/// Index a transferred task ends up at.
///
/// `dest_index` counts positions in the destination before the source task
/// is removed; anything past the end means "append". Within one quadrant the
/// removal shifts later rows up by one, so a drop below the source lands one
/// row higher than the raw index.
pub fn transfer_insert_index(
    source: Quadrant,
    source_index: usize,
    dest: Quadrant,
    dest_index: usize,
    dest_len_before: usize,
) -> usize {
    let dest_index = dest_index.min(dest_len_before);
    if source != dest {
        return dest_index;
    }
    if source_index > dest_index {
        dest_index
    } else {
        dest_index.saturating_sub(1)
    }
}

/// Move a task to `dest` at `dest_index` (same or another quadrant).
///
/// The removal and the insertion happen together: on error nothing changed.
/// Returns the index the task was inserted at.
pub fn transfer(
    store: &mut TaskStore,
    source: Quadrant,
    source_index: usize,
    dest: Quadrant,
    dest_index: usize,
) -> Result<usize, TaskError> {
    if source_index >= store.len(source) {
        return Err(TaskError::NotFound {
            quadrant: source,
            index: source_index,
        });
    }
    let insert_at =
        transfer_insert_index(source, source_index, dest, dest_index, store.len(dest));

    let task = store.lane_mut(source).remove(source_index);
    let lane = store.lane_mut(dest);
    let insert_at = insert_at.min(lane.len());
    lane.insert(insert_at, task);
    Ok(insert_at)
}
