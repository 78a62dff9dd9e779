use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use taskboard_core::view::priority_icon;
use taskboard_core::{CardView, Column, Interaction, Notice, Priority, TaskForm, DELETE_PROMPT};
use unicode_width::UnicodeWidthChar;

use crate::tui::app::{App, FormField, CARD_HEIGHT};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Board
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let header = Paragraph::new("TASKBOARD")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let column_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(main_chunks[1]);

    for column in Column::ALL {
        let area = column_chunks[column.index()];
        app.layout.columns[column.index()] = area;
        draw_column(f, app, column, area);
    }

    draw_footer(f, app, main_chunks[2]);

    match app.interaction() {
        Interaction::Editing(form) => {
            let form = form.clone();
            draw_form(f, app, &form, size);
        }
        Interaction::ConfirmingDelete { task_id, .. } => {
            let task_id = *task_id;
            draw_confirm(f, task_id, size);
        }
        _ => {}
    }
}

fn draw_column(f: &mut Frame, app: &mut App, column: Column, area: Rect) {
    let drag = app.controller.drag().cloned();
    let is_selected = app.selected_column == column;
    let is_target = drag.as_ref().map(|d| d.is_drop_target(column)).unwrap_or(false);

    let border_style = if is_target {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let view = app.snapshot().column(column).clone();
    let title = format!(" {} ({}) ", view.title, view.count);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(if is_target { BorderType::Double } else { BorderType::Rounded })
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Keep the selected card in view.
    let visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    let selected = app.selected_card[column.index()];
    let scroll = selected.saturating_sub(visible - 1);
    app.layout.scroll[column.index()] = scroll;

    for (slot, card) in view.cards.iter().skip(scroll).take(visible).enumerate() {
        let card_area = Rect {
            x: inner.x,
            y: inner.y + slot as u16 * CARD_HEIGHT,
            width: inner.width,
            height: CARD_HEIGHT.min(inner.height.saturating_sub(slot as u16 * CARD_HEIGHT)),
        };
        let highlighted = is_selected && slot + scroll == selected;
        let dragged = drag.as_ref().map(|d| d.task_id == card.id).unwrap_or(false);
        draw_card(f, card, card_area, highlighted, dragged);
    }
}

fn draw_card(f: &mut Frame, card: &CardView, area: Rect, highlighted: bool, dragged: bool) {
    let width = area.width.saturating_sub(2) as usize;

    let mut border_style = Style::default().fg(priority_color(card.priority));
    if highlighted {
        border_style = border_style.add_modifier(Modifier::BOLD);
    }
    if dragged {
        border_style = border_style.add_modifier(Modifier::DIM);
    }

    let description = card.description.as_deref().unwrap_or("");
    let lines = vec![
        Line::from(Span::styled(
            truncate(&card.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(truncate(description, width), Style::default().fg(Color::Gray))),
        Line::from(vec![
            Span::raw(format!("{} {}", priority_icon(card.priority), card.priority)),
            Span::raw("  "),
            Span::styled(card.label(), Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(if highlighted { BorderType::Thick } else { BorderType::Plain })
        .border_style(border_style);
    if highlighted {
        block = block.style(Style::default().bg(Color::Black));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.status {
        Some(Notice::Error(message)) => (message.clone(), Style::default().fg(Color::Red)),
        Some(Notice::Info(message)) => (message.clone(), Style::default().fg(Color::Green)),
        None => (help_text(app.interaction()).to_string(), Style::default().fg(Color::DarkGray)),
    };
    let footer = Paragraph::new(text).style(style).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn help_text(interaction: &Interaction) -> &'static str {
    match interaction {
        Interaction::Idle => {
            "h/l: Column | j/k: Card | a: Add | e: Edit | d: Delete | space: Move | q: Quit"
        }
        Interaction::Editing(_) => "tab: Next field | ←/→: Priority | enter: Save | esc: Cancel",
        Interaction::Dragging(_) => "h/l: Carry | space/enter: Drop | esc: Cancel",
        Interaction::ConfirmingDelete { .. } => "y: Delete | n/esc: Keep",
    }
}

fn draw_form(f: &mut Frame, app: &App, form: &TaskForm, size: Rect) {
    let area = centered_rect(60, 13, size);
    f.render_widget(Clear, area);

    let title = if form.is_edit() { " Edit Task " } else { " Add New Task " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Description
            Constraint::Length(3), // Priority
            Constraint::Min(1),    // Hint
        ])
        .split(inner);

    let field_block = |label: &'static str, field: FormField| {
        let style = if app.focused_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default().title(label).borders(Borders::ALL).border_style(style)
    };

    f.render_widget(
        Paragraph::new(form.title.as_str()).block(field_block(" Title ", FormField::Title)),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(form.description.as_str())
            .wrap(Wrap { trim: false })
            .block(field_block(" Description ", FormField::Description)),
        rows[1],
    );

    let priorities: Vec<Span> = Priority::ALL
        .iter()
        .flat_map(|&p| {
            let style = if p == form.priority {
                Style::default()
                    .fg(priority_color(p))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(format!(" {} ", p), style), Span::raw(" ")]
        })
        .collect();
    let priority_block = field_block(" Priority ", FormField::Priority);
    f.render_widget(Paragraph::new(Line::from(priorities)).block(priority_block), rows[2]);

    let action = if form.is_edit() { "Update Task" } else { "Add Task" };
    f.render_widget(
        Paragraph::new(format!("enter: {}  esc: Cancel", action))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        rows[3],
    );

    let text_row = match app.focused_field {
        FormField::Title => Some((rows[0], form.title.as_str())),
        FormField::Description => Some((rows[1], form.description.as_str())),
        FormField::Priority => None,
    };
    if let Some((row, text)) = text_row {
        let offset: usize = text
            .chars()
            .take(app.cursor_position)
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let x = (row.x + 1 + offset as u16).min(row.x + row.width.saturating_sub(2));
        f.set_cursor_position((x, row.y + 1));
    }
}

fn draw_confirm(f: &mut Frame, task_id: u64, size: Rect) {
    let area = centered_rect(50, 5, size);
    f.render_widget(Clear, area);
    let text = vec![
        Line::from(DELETE_PROMPT),
        Line::from(Span::styled(
            format!("#{}   y: Delete   n: Keep", task_id),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let dialog = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .title(" Delete Task ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(dialog, area);
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = (u32::from(r.width) * u32::from(percent_x.min(100)) / 100) as u16;
    Rect {
        x: r.x + (r.width.saturating_sub(width)) / 2,
        y: r.y + (r.height.saturating_sub(height)) / 2,
        width,
        height: height.min(r.height),
    }
}

/// Cuts `text` to at most `width` terminal cells, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
