use serde::{Deserialize, Serialize};

use crate::model::task::{Column, Task, TaskId};

pub const FIRST_TASK_ID: TaskId = 1;

fn first_task_id() -> TaskId {
    FIRST_TASK_ID
}

/// The in-memory task store: three ordered lists plus the id counter.
///
/// Only the lists are part of the serialized form; the counter is persisted
/// under its own key by the repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Board {
    #[serde(default)]
    todo: Vec<Task>,
    #[serde(default)]
    inprogress: Vec<Task>,
    #[serde(default)]
    done: Vec<Task>,

    #[serde(skip, default = "first_task_id")]
    next_id: TaskId,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            todo: Vec::new(),
            inprogress: Vec::new(),
            done: Vec::new(),
            next_id: FIRST_TASK_ID,
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, column: Column) -> &[Task] {
        match column {
            Column::Todo => &self.todo,
            Column::InProgress => &self.inprogress,
            Column::Done => &self.done,
        }
    }

    fn list_mut(&mut self, column: Column) -> &mut Vec<Task> {
        match column {
            Column::Todo => &mut self.todo,
            Column::InProgress => &mut self.inprogress,
            Column::Done => &mut self.done,
        }
    }

    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    pub(crate) fn set_next_id(&mut self, next_id: TaskId) {
        self.next_id = next_id;
    }

    /// Returns the current counter value and advances it, or `None` once the
    /// id space is used up.
    pub fn issue_id(&mut self) -> Option<TaskId> {
        let id = self.next_id;
        self.next_id = id.checked_add(1)?;
        Some(id)
    }

    /// Looks a task up across all columns, scanning todo, inprogress, done.
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        Column::ALL
            .iter()
            .find_map(|&column| self.list(column).iter().find(|t| t.id == id))
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let column = self.find(id)?.column;
        self.list_mut(column).iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, column: Column, id: TaskId) -> bool {
        self.list(column).iter().any(|t| t.id == id)
    }

    /// Appends to the end of the task's own column.
    pub(crate) fn push(&mut self, task: Task) {
        self.list_mut(task.column).push(task);
    }

    pub(crate) fn remove(&mut self, column: Column, id: TaskId) -> Option<Task> {
        let list = self.list_mut(column);
        let pos = list.iter().position(|t| t.id == id)?;
        Some(list.remove(pos))
    }

    pub fn len(&self) -> usize {
        Column::ALL.iter().map(|&c| self.list(c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        Column::ALL.into_iter().flat_map(move |c| self.list(c).iter())
    }

    /// Restores the store invariants on data read back from storage: every
    /// task's `column` matches its list, and the counter is above every id.
    ///
    /// Returns false when a stored id leaves no room for a counter above it.
    pub(crate) fn normalize(&mut self) -> bool {
        for column in Column::ALL {
            for task in self.list_mut(column).iter_mut() {
                if task.column != column {
                    tracing::debug!(
                        id = task.id,
                        from = %task.column,
                        to = %column,
                        "realigning task column"
                    );
                    task.column = column;
                }
            }
        }

        let mut min_next = FIRST_TASK_ID;
        for task in self.iter() {
            match task.id.checked_add(1) {
                Some(next) => min_next = min_next.max(next),
                None => return false,
            }
        }
        if self.next_id < min_next {
            tracing::debug!(stored = self.next_id, raised = min_next, "raising id counter");
            self.next_id = min_next;
        }
        true
    }
}
