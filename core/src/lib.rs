pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod view;

pub use config::Config;
pub use controller::{
    Command, Controller, DragState, FormTarget, Interaction, Notice, Outcome, TaskForm,
};
pub use error::BoardError;
pub use model::board::Board;
pub use model::task::{Column, Priority, Task, TaskId};
pub use repository::{BoardRepository, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use service::board_service::{BoardService, Change, Confirm, DELETE_PROMPT};
pub use view::{BoardSnapshot, CardView, ColumnView, View};
