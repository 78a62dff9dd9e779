use crate::error::{BoardError, Result};
use crate::model::board::Board;
use crate::model::task::{Column, Priority, Task, TaskId};
use crate::repository::{BoardRepository, KeyValueStore};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Guard consulted before an irreversible delete.
pub trait Confirm {
    fn confirm(&mut self, task: &Task) -> bool;
}

impl<F: FnMut(&Task) -> bool> Confirm for F {
    fn confirm(&mut self, task: &Task) -> bool {
        self(task)
    }
}

/// Whether an operation changed (and therefore persisted) the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Applied,
    Unchanged,
}

impl Change {
    pub fn is_applied(&self) -> bool {
        matches!(self, Change::Applied)
    }
}

/// Owns the board for the session and writes it back after every change.
///
/// Mutations are staged on a copy and only become visible once the save
/// succeeded, so a failed write leaves the session exactly as it was.
pub struct BoardService<S: KeyValueStore> {
    repo: BoardRepository<S>,
    board: Board,
}

impl<S: KeyValueStore> BoardService<S> {
    pub fn new(store: S) -> Self {
        let repo = BoardRepository::new(store);
        let board = repo.load();
        Self { repo, board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.board.find(id)
    }

    pub fn create(
        &mut self,
        column: Column,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<Task> {
        let title = validate_title(title)?;

        let mut next = self.board.clone();
        let id = next.issue_id().ok_or(BoardError::IdsExhausted)?;
        let task = Task::new(id, column, title, description, priority);
        next.push(task.clone());
        self.commit(next)?;

        tracing::info!(id, %column, "created task");
        Ok(task)
    }

    pub fn update(
        &mut self,
        id: TaskId,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<Task> {
        let title = validate_title(title)?;

        let mut next = self.board.clone();
        let task = next.get_mut(id).ok_or(BoardError::TaskNotFound(id))?;
        task.title = title.to_string();
        task.description = description.trim().to_string();
        task.priority = priority;
        let updated = task.clone();
        self.commit(next)?;

        tracing::info!(id, "updated task");
        Ok(updated)
    }

    pub fn delete(
        &mut self,
        id: TaskId,
        column: Column,
        confirm: &mut impl Confirm,
    ) -> Result<Change> {
        let Some(task) = self.board.list(column).iter().find(|t| t.id == id) else {
            tracing::debug!(id, %column, "delete of unknown task ignored");
            return Ok(Change::Unchanged);
        };
        if !confirm.confirm(task) {
            tracing::debug!(id, "delete declined");
            return Ok(Change::Unchanged);
        }

        let mut next = self.board.clone();
        next.remove(column, id);
        self.commit(next)?;

        tracing::info!(id, %column, "deleted task");
        Ok(Change::Applied)
    }

    /// Moves a task to the end of another column's list.
    pub fn transfer(&mut self, id: TaskId, from: Column, to: Column) -> Result<Change> {
        if from == to {
            return Ok(Change::Unchanged);
        }

        let mut next = self.board.clone();
        let Some(mut task) = next.remove(from, id) else {
            tracing::debug!(id, %from, "transfer of unknown task ignored");
            return Ok(Change::Unchanged);
        };
        task.column = to;
        next.push(task);
        self.commit(next)?;

        tracing::info!(id, %from, %to, "transferred task");
        Ok(Change::Applied)
    }

    fn commit(&mut self, next: Board) -> Result<()> {
        self.repo.save(&next)?;
        self.board = next;
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BoardError::EmptyTitle);
    }
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryKeyValueStore, TASKS_KEY, TASK_ID_COUNTER_KEY};
    use anyhow::anyhow;

    fn ids(board: &Board, column: Column) -> Vec<TaskId> {
        board.list(column).iter().map(|t| t.id).collect()
    }

    fn yes(_: &Task) -> bool {
        true
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    /// Memory store that refuses writes to one key.
    struct FailingKey<'a> {
        inner: &'a MemoryKeyValueStore,
        key: &'static str,
    }

    impl KeyValueStore for FailingKey<'_> {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            if key == self.key {
                return Err(anyhow!("disk full"));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_create_appends_with_fresh_id() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);

        let a = service.create(Column::Todo, "A", "", Priority::Low).unwrap();
        let b = service
            .create(Column::Todo, "  B  ", " details ", Priority::High)
            .unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(b.title, "B");
        assert_eq!(b.description(), Some("details"));
        assert_eq!(ids(service.board(), Column::Todo), vec![1, 2]);
        assert_eq!(service.board().len(), 2);
        assert_eq!(store.writes(), 4); // two keys per save
    }

    #[test]
    fn test_blank_title_never_mutates() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);

        for title in ["", "   ", "\t\n"] {
            let err = service
                .create(Column::Done, title, "desc", Priority::Medium)
                .unwrap_err();
            assert!(matches!(err, BoardError::EmptyTitle));
            assert!(err.is_validation());
        }
        assert!(service.board().is_empty());
        assert_eq!(service.board().next_id(), 1);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_update_keeps_id_and_column() {
        let mut service = BoardService::new(MemoryKeyValueStore::new());
        let task = service.create(Column::InProgress, "Draft", "", Priority::Low).unwrap();

        let updated = service.update(task.id, "Final", "ship it", Priority::High).unwrap();
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.column, Column::InProgress);
        assert_eq!(service.find(task.id), Some(&updated));

        assert!(matches!(
            service.update(task.id, " ", "", Priority::Low),
            Err(BoardError::EmptyTitle)
        ));
        assert!(matches!(
            service.update(99, "x", "", Priority::Low),
            Err(BoardError::TaskNotFound(99))
        ));
        assert_eq!(service.find(task.id).unwrap().title, "Final");
    }

    #[test]
    fn test_transfer_moves_to_end_of_target() {
        let mut service = BoardService::new(MemoryKeyValueStore::new());
        let a = service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
        service.create(Column::Done, "B", "", Priority::Medium).unwrap();

        let change = service.transfer(a.id, Column::Todo, Column::Done).unwrap();
        assert_eq!(change, Change::Applied);
        assert_eq!(ids(service.board(), Column::Todo), Vec::<TaskId>::new());
        assert_eq!(ids(service.board(), Column::Done), vec![2, 1]);
        assert_eq!(service.find(a.id).unwrap().column, Column::Done);
        assert_eq!(service.board().len(), 2);
    }

    #[test]
    fn test_transfer_to_same_column_is_noop() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);
        service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
        service.create(Column::Todo, "B", "", Priority::Medium).unwrap();
        let writes = store.writes();

        let change = service.transfer(1, Column::Todo, Column::Todo).unwrap();
        assert_eq!(change, Change::Unchanged);
        assert_eq!(store.writes(), writes);
        assert_eq!(ids(service.board(), Column::Todo), vec![1, 2]);
    }

    #[test]
    fn test_transfer_from_wrong_column_is_noop() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);
        service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
        let writes = store.writes();

        let change = service.transfer(1, Column::InProgress, Column::Done).unwrap();
        assert_eq!(change, Change::Unchanged);
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);
        service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
        let writes = store.writes();

        let mut asked = Vec::new();
        let change = service
            .delete(1, Column::Todo, &mut |t: &Task| {
                asked.push(t.id);
                false
            })
            .unwrap();
        assert_eq!(change, Change::Unchanged);
        assert_eq!(asked, vec![1]);
        assert_eq!(service.board().len(), 1);
        assert_eq!(store.writes(), writes);

        let change = service.delete(1, Column::Todo, &mut yes).unwrap();
        assert_eq!(change, Change::Applied);
        assert!(service.board().is_empty());
        assert_eq!(service.board().next_id(), 2);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);
        service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
        let writes = store.writes();

        assert_eq!(service.delete(42, Column::Todo, &mut yes).unwrap(), Change::Unchanged);
        assert_eq!(service.delete(1, Column::Done, &mut yes).unwrap(), Change::Unchanged);
        assert_eq!(service.board().len(), 1);
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn test_ids_never_reused_after_delete_and_reload() {
        let store = MemoryKeyValueStore::new();
        {
            let mut service = BoardService::new(&store);
            service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
            service.create(Column::Todo, "B", "", Priority::Medium).unwrap();
            service.delete(2, Column::Todo, &mut yes).unwrap();
        }

        let mut service = BoardService::new(&store);
        let c = service.create(Column::Todo, "C", "", Priority::Medium).unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_failed_save_leaves_board_untouched() {
        let mut service = BoardService::new(FailingStore);
        let err = service.create(Column::Todo, "A", "", Priority::Medium).unwrap_err();
        assert!(matches!(err, BoardError::Storage(_)));
        assert!(!err.is_validation());
        assert!(service.board().is_empty());
        assert_eq!(service.board().next_id(), 1);
    }

    #[test]
    fn test_failed_tasks_write_keeps_storage_consistent() {
        for key in [TASKS_KEY, TASK_ID_COUNTER_KEY] {
            let store = MemoryKeyValueStore::new();
            let mut service = BoardService::new(FailingKey { inner: &store, key });

            assert!(service.create(Column::Todo, "A", "", Priority::Medium).is_err());
            assert!(service.board().is_empty());
            assert!(store.raw(TASKS_KEY).is_none(), "tasks written when {} failed", key);

            let reloaded = BoardRepository::new(&store).load();
            assert!(reloaded.is_empty());
        }
    }

    #[test]
    fn test_create_with_exhausted_counter_fails_cleanly() {
        let max = TaskId::MAX.to_string();
        let store = MemoryKeyValueStore::with_entries([(TASK_ID_COUNTER_KEY, max.as_str())]);
        let mut service = BoardService::new(&store);

        let err = service.create(Column::Todo, "A", "", Priority::Medium).unwrap_err();
        assert!(matches!(err, BoardError::IdsExhausted));
        assert!(service.board().is_empty());
        assert_eq!(service.board().next_id(), TaskId::MAX);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_board_lifecycle_scenario() {
        let store = MemoryKeyValueStore::new();
        let mut service = BoardService::new(&store);
        assert_eq!(service.board().next_id(), 1);

        let a = service.create(Column::Todo, "A", "", Priority::Medium).unwrap();
        assert_eq!(a.id, 1);
        let b = service.create(Column::Todo, "B", "", Priority::Medium).unwrap();
        assert_eq!(b.id, 2);
        assert_eq!(ids(service.board(), Column::Todo), vec![1, 2]);

        service.transfer(2, Column::Todo, Column::Done).unwrap();
        assert_eq!(ids(service.board(), Column::Todo), vec![1]);
        assert_eq!(ids(service.board(), Column::Done), vec![2]);
        assert_eq!(service.board().list(Column::Done)[0].column, Column::Done);

        service.delete(1, Column::Todo, &mut yes).unwrap();
        assert!(service.board().list(Column::Todo).is_empty());
        assert_eq!(ids(service.board(), Column::Done), vec![2]);
        assert_eq!(service.board().next_id(), 3);

        let reloaded = BoardRepository::new(&store).load();
        assert_eq!(&reloaded, service.board());
        assert!(store.raw(TASKS_KEY).is_some());
    }
}
