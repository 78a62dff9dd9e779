mod board;
mod tui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use taskboard_core::config::DATA_DIR_ENV;
use taskboard_core::{Column, Config, FileKeyValueStore, Priority, TaskId};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "A three-column task board for the terminal", long_about = None)]
struct Cli {
    /// Directory holding the board data (defaults to ~/.taskboard)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a task (usage: add todo "Task title" -p high -d "details")
    Add {
        /// Column to add to: todo, inprogress, done
        column: Column,
        /// Task title
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        /// low, medium or high (defaults to the configured priority)
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// List all tasks by column
    List,
    /// Change a task's title, description or priority
    Edit {
        id: TaskId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Move a task to the end of another column
    Move { id: TaskId, column: Column },
    /// Delete a task
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write the board as a static HTML page
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Open the Terminal User Interface
    Tui,
}

fn init_tracing(config: &Config) -> Result<()> {
    // Opt-in via RUST_LOG. The TUI owns the terminal, so logs go to a file.
    let Some(filter) = std::env::var("RUST_LOG")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
    else {
        return Ok(());
    };

    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.data_dir)?;
    let store = FileKeyValueStore::new(Some(config.data_dir.clone()))?;
    init_tracing(&config)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "starting");

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Add {
            column,
            title,
            description,
            priority,
        } => {
            let priority = priority.unwrap_or(config.default_priority);
            board::add(store, column, &title.join(" "), &description, priority)?;
        }
        Commands::List => board::list(store),
        Commands::Edit {
            id,
            title,
            description,
            priority,
        } => board::edit(store, id, title, description, priority)?,
        Commands::Move { id, column } => board::move_task(store, id, column)?,
        Commands::Delete { id, yes } => board::delete(store, id, yes)?,
        Commands::Export { output } => board::export(store, output)?,
        Commands::Tui => tui::run(&config, store)?,
    }
    Ok(())
}
