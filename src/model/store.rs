use super::task::{Quadrant, Task};

/// The authoritative collection of tasks: one ordered lane per quadrant.
///
/// Mutation goes through [`crate::ops::task_ops`]; this type only exposes
/// read access plus the raw lane handles those operations need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    lanes: [Vec<Task>; 4],
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks of one quadrant, in display order
    pub fn tasks(&self, quadrant: Quadrant) -> &[Task] {
        &self.lanes[quadrant.index()]
    }

    pub fn task(&self, quadrant: Quadrant, index: usize) -> Option<&Task> {
        self.lanes[quadrant.index()].get(index)
    }

    pub fn len(&self, quadrant: Quadrant) -> usize {
        self.lanes[quadrant.index()].len()
    }

    /// Number of tasks across all quadrants
    pub fn total_len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Vec::is_empty)
    }

    /// Every task tagged with its quadrant, quadrant by quadrant in board order.
    /// This is the order tasks are written to disk.
    pub fn iter(&self) -> impl Iterator<Item = (Quadrant, &Task)> {
        Quadrant::ALL
            .into_iter()
            .flat_map(move |q| self.lanes[q.index()].iter().map(move |t| (q, t)))
    }

    /// Finished tasks across all quadrants, in board order
    pub fn done_tasks(&self) -> impl Iterator<Item = (Quadrant, &Task)> {
        self.iter().filter(|(_, t)| t.is_done())
    }

    /// Append a task at the end of a lane
    pub fn push(&mut self, quadrant: Quadrant, task: Task) {
        self.lanes[quadrant.index()].push(task);
    }

    pub(crate) fn lane_mut(&mut self, quadrant: Quadrant) -> &mut Vec<Task> {
        &mut self.lanes[quadrant.index()]
    }

    pub(crate) fn task_mut(&mut self, quadrant: Quadrant, index: usize) -> Option<&mut Task> {
        self.lanes[quadrant.index()].get_mut(index)
    }
}
