use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use taskboard_core::view::{priority_icon, render_html, sanitize_terminal};
use taskboard_core::{
    BoardService, Change, Column, FileKeyValueStore, Priority, Task, TaskId, DELETE_PROMPT,
};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        Self {
            id: format!("#{}", task.id),
            priority: format!("{} {}", priority_icon(task.priority), task.priority),
            title: sanitize_terminal(&task.title),
            description: task
                .description()
                .map(sanitize_terminal)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn add(
    store: FileKeyValueStore,
    column: Column,
    title: &str,
    description: &str,
    priority: Priority,
) -> Result<()> {
    let mut service = BoardService::new(store);
    let task = service.create(column, title, description, priority)?;
    println!("Task added: {} (ID: {})", sanitize_terminal(&task.title), task.id);
    println!("  Column: {}", task.column.title());
    println!("  Priority: {}", task.priority);
    Ok(())
}

pub fn list(store: FileKeyValueStore) {
    let service = BoardService::new(store);
    let board = service.board();
    if board.is_empty() {
        println!("No tasks found.");
        return;
    }

    for column in Column::ALL {
        let tasks = board.list(column);
        println!("\n\x1b[1;36m{} ({})\x1b[0m", column.title(), tasks.len());
        if tasks.is_empty() {
            println!("  (empty)");
            continue;
        }
        let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from_task).collect();
        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
        println!("{}", table);
    }
}

pub fn edit(
    store: FileKeyValueStore,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
) -> Result<()> {
    let mut service = BoardService::new(store);
    let current = service.find(id).cloned().ok_or_else(|| anyhow!("Task #{} not found", id))?;

    let title = title.unwrap_or(current.title);
    let description = description.unwrap_or(current.description);
    let priority = priority.unwrap_or(current.priority);
    let task = service.update(id, &title, &description, priority)?;
    println!("Task updated: {} (ID: {})", sanitize_terminal(&task.title), task.id);
    Ok(())
}

pub fn move_task(store: FileKeyValueStore, id: TaskId, column: Column) -> Result<()> {
    let mut service = BoardService::new(store);
    let from = service
        .find(id)
        .map(|t| t.column)
        .ok_or_else(|| anyhow!("Task #{} not found", id))?;

    match service.transfer(id, from, column)? {
        Change::Applied => println!("Moved #{} to {}", id, column.title()),
        Change::Unchanged => println!("Task #{} is already in {}", id, column.title()),
    }
    Ok(())
}

pub fn delete(store: FileKeyValueStore, id: TaskId, yes: bool) -> Result<()> {
    let mut service = BoardService::new(store);
    let column = service
        .find(id)
        .map(|t| t.column)
        .ok_or_else(|| anyhow!("Task #{} not found", id))?;

    let mut prompt = |task: &Task| {
        yes || ask(&format!("{} #{} {} [y/N] ", DELETE_PROMPT, task.id, task.title))
    };
    match service.delete(id, column, &mut prompt)? {
        Change::Applied => println!("Deleted #{}", id),
        Change::Unchanged => println!("Delete cancelled."),
    }
    Ok(())
}

fn ask(question: &str) -> bool {
    print!("{}", sanitize_terminal(question));
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

pub fn export(store: FileKeyValueStore, output: Option<PathBuf>) -> Result<()> {
    let service = BoardService::new(store);
    let footer = format!("Exported {}", Local::now().format("%Y-%m-%d %H:%M"));
    let html = render_html(service.board(), &footer);

    match output {
        Some(path) => {
            fs::write(&path, html).with_context(|| format!("Could not write {}", path.display()))?;
            println!("Board exported to {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}
