use anyhow::{Context, Result};

use crate::model::board::Board;
use crate::model::task::TaskId;
use crate::repository::traits::KeyValueStore;

pub const TASKS_KEY: &str = "tasks";
pub const TASK_ID_COUNTER_KEY: &str = "taskIdCounter";

/// Reads and writes the whole board through a key-value store.
pub struct BoardRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> BoardRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the persisted board. Missing or unreadable data never fails the
    /// caller: the lists fall back to empty and the counter to its default.
    pub fn load(&self) -> Board {
        let counter = self.read_value::<TaskId>(TASK_ID_COUNTER_KEY);
        let with_counter = |mut board: Board| {
            if let Some(counter) = counter {
                board.set_next_id(counter);
            }
            board
        };

        let mut board = with_counter(self.read_value::<Board>(TASKS_KEY).unwrap_or_default());
        if !board.normalize() {
            tracing::warn!(key = TASKS_KEY, "stored task ids are out of range, using default");
            board = with_counter(Board::default());
            board.normalize();
        }
        tracing::debug!(tasks = board.len(), next_id = board.next_id(), "loaded board");
        board
    }

    /// Writes the counter before the lists. If the second write fails the
    /// stored counter may run ahead of the stored lists, which `load` accepts.
    pub fn save(&self, board: &Board) -> Result<()> {
        let tasks = serde_json::to_string(board).context("Could not serialize tasks")?;
        self.store
            .set(TASK_ID_COUNTER_KEY, &board.next_id().to_string())?;
        self.store.set(TASKS_KEY, &tasks)?;
        tracing::debug!(tasks = board.len(), next_id = board.next_id(), "saved board");
        Ok(())
    }

    fn read_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    key,
                    error = %format!("{:#}", e),
                    "could not read stored value, using default"
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is malformed, using default");
                None
            }
        }
    }
}
