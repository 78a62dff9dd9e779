pub mod board;
pub mod file;
pub mod memory;
pub mod traits;

// Re-export
pub use board::{BoardRepository, TASKS_KEY, TASK_ID_COUNTER_KEY};
pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use traits::KeyValueStore;
