pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use taskboard_core::{Config, FileKeyValueStore, Interaction};

use crate::tui::app::App;

pub fn run(config: &Config, store: FileKeyValueStore) -> Result<()> {
    let mut app = App::new(config, store);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "tui loop failed");
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(app, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => handle_mouse(app, mouse),
            _ => {}
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match app.interaction() {
        Interaction::Idle => {
            app.status = None;
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Down | KeyCode::Char('j') => app.next_card(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_card(),
                KeyCode::Left | KeyCode::Char('h') => app.column_left(),
                KeyCode::Right | KeyCode::Char('l') => app.column_right(),
                KeyCode::Char('a') => app.open_create(),
                KeyCode::Char('e') | KeyCode::Enter => app.open_edit(),
                KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
                KeyCode::Char(' ') => app.pick_up(),
                _ => {}
            }
        }
        Interaction::Editing(_) => match key.code {
            KeyCode::Enter => app.submit_form(),
            KeyCode::Esc => app.cancel_form(),
            KeyCode::Tab => app.focus_next_field(),
            KeyCode::BackTab => app.focus_previous_field(),
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            _ => {}
        },
        Interaction::Dragging(_) => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.carry(app.selected_column.left()),
            KeyCode::Right | KeyCode::Char('l') => app.carry(app.selected_column.right()),
            KeyCode::Char(' ') | KeyCode::Enter => app.put_down(),
            KeyCode::Esc => app.cancel_drag(),
            _ => {}
        },
        Interaction::ConfirmingDelete { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_delete(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_delete(false),
            _ => {}
        },
    }
    false
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if *app.interaction() == Interaction::Idle => {
            app.status = None;
            app.mouse_down(mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(mouse.column, mouse.row),
        _ => {}
    }
}
