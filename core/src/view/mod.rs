//! Projection of the board into what a host displays.
//!
//! A snapshot is always rebuilt from scratch from the current board; hosts
//! never patch a previous snapshot.

pub mod html;

use crate::model::board::Board;
use crate::model::task::{Column, Priority, Task, TaskId};

pub use html::render_html;

/// A host that displays the board. Called after every change to the store.
pub trait View {
    fn refresh(&mut self, snapshot: BoardSnapshot);
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drops control characters (escape sequences included) so user text cannot
/// drive the terminal. Newlines and tabs become spaces.
pub fn sanitize_terminal(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

pub fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "🟢",
        Priority::Medium => "🟡",
        Priority::High => "🔴",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl CardView {
    fn from_task(task: &Task, escape: fn(&str) -> String) -> Self {
        Self {
            id: task.id,
            title: escape(&task.title),
            description: task.description().map(escape),
            priority: task.priority,
        }
    }

    pub fn label(&self) -> String {
        format!("#{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub column: Column,
    pub title: &'static str,
    pub count: usize,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub columns: Vec<ColumnView>,
}

impl BoardSnapshot {
    /// Builds every column from the board, passing user text through `escape`.
    pub fn build(board: &Board, escape: fn(&str) -> String) -> Self {
        let columns = Column::ALL
            .iter()
            .map(|&column| {
                let cards: Vec<CardView> = board
                    .list(column)
                    .iter()
                    .map(|t| CardView::from_task(t, escape))
                    .collect();
                ColumnView {
                    column,
                    title: column.title(),
                    count: cards.len(),
                    cards,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, column: Column) -> &ColumnView {
        &self.columns[column.index()]
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self::build(&Board::default(), sanitize_terminal)
    }
}
