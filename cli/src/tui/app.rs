use ratatui::layout::Rect;
use taskboard_core::{
    BoardSnapshot, BoardService, Column, Command, Config, Controller, FileKeyValueStore,
    FormTarget, Interaction, Notice, Outcome, TaskId, View,
};

/// Rows taken by one card, borders included.
pub const CARD_HEIGHT: u16 = 5;

/// Keeps the latest projection of the board; `ui::draw` renders from it.
#[derive(Default)]
pub struct TuiView {
    pub snapshot: BoardSnapshot,
}

impl View for TuiView {
    fn refresh(&mut self, snapshot: BoardSnapshot) {
        self.snapshot = snapshot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::Priority,
            FormField::Description => FormField::Title,
            FormField::Priority => FormField::Description,
        }
    }
}

/// Screen geometry from the last frame, used to hit-test the mouse.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoardLayout {
    pub columns: [Rect; 3],
    pub scroll: [usize; 3],
}

impl BoardLayout {
    pub fn column_at(&self, x: u16, y: u16) -> Option<Column> {
        self.columns
            .iter()
            .position(|r| contains(r, x, y))
            .and_then(Column::from_index)
    }

    /// Index of the card under the pointer within its column, before clamping
    /// to the number of cards.
    pub fn card_at(&self, x: u16, y: u16) -> Option<(Column, usize)> {
        let column = self.column_at(x, y)?;
        let area = self.columns[column.index()];
        let top = area.y + 1;
        if y < top {
            return None;
        }
        let index = ((y - top) / CARD_HEIGHT) as usize + self.scroll[column.index()];
        Some((column, index))
    }
}

fn contains(r: &Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
}

pub struct App {
    pub controller: Controller<FileKeyValueStore, TuiView>,
    pub selected_column: Column,
    pub selected_card: [usize; 3],
    pub focused_field: FormField,
    pub cursor_position: usize,
    pub status: Option<Notice>,
    pub layout: BoardLayout,
    /// Column under the pointer (or the keyboard carry) while dragging.
    pub hover: Option<Column>,
}

impl App {
    pub fn new(config: &Config, store: FileKeyValueStore) -> App {
        let service = BoardService::new(store);
        let controller = Controller::new(service, TuiView::default(), config.default_priority);
        App {
            controller,
            selected_column: Column::Todo,
            selected_card: [0; 3],
            focused_field: FormField::Title,
            cursor_position: 0,
            status: None,
            layout: BoardLayout::default(),
            hover: None,
        }
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.controller.view().snapshot
    }

    pub fn interaction(&self) -> &Interaction {
        self.controller.interaction()
    }

    pub fn selected_task(&self) -> Option<TaskId> {
        let column = self.snapshot().column(self.selected_column);
        column
            .cards
            .get(self.selected_card[self.selected_column.index()])
            .map(|card| card.id)
    }

    fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = self.controller.dispatch(command);
        if let Some(notice) = &outcome.notice {
            self.status = Some(notice.clone());
        }
        if outcome.changed {
            self.clamp_selection();
        }
        outcome
    }

    fn clamp_selection(&mut self) {
        for column in Column::ALL {
            let count = self.snapshot().column(column).count;
            let selected = &mut self.selected_card[column.index()];
            *selected = (*selected).min(count.saturating_sub(1));
        }
    }

    fn select_last(&mut self, column: Column) {
        self.selected_column = column;
        let count = self.snapshot().column(column).count;
        self.selected_card[column.index()] = count.saturating_sub(1);
    }

    // Navigation

    pub fn next_card(&mut self) {
        let count = self.snapshot().column(self.selected_column).count;
        if count == 0 {
            return;
        }
        let selected = &mut self.selected_card[self.selected_column.index()];
        *selected = if *selected >= count - 1 { 0 } else { *selected + 1 };
    }

    pub fn previous_card(&mut self) {
        let count = self.snapshot().column(self.selected_column).count;
        if count == 0 {
            return;
        }
        let selected = &mut self.selected_card[self.selected_column.index()];
        *selected = if *selected == 0 { count - 1 } else { *selected - 1 };
    }

    pub fn column_left(&mut self) {
        self.selected_column = self.selected_column.left();
    }

    pub fn column_right(&mut self) {
        self.selected_column = self.selected_column.right();
    }

    // Form

    pub fn open_create(&mut self) {
        self.status = None;
        self.dispatch(Command::OpenCreate(self.selected_column));
        self.reset_form_cursor();
    }

    pub fn open_edit(&mut self) {
        if let Some(id) = self.selected_task() {
            self.status = None;
            self.dispatch(Command::OpenEdit(id));
            self.reset_form_cursor();
        }
    }

    fn reset_form_cursor(&mut self) {
        self.focused_field = FormField::Title;
        self.cursor_position = self
            .controller
            .form()
            .map(|f| f.title.chars().count())
            .unwrap_or(0);
    }

    pub fn cancel_form(&mut self) {
        self.dispatch(Command::CancelForm);
    }

    pub fn submit_form(&mut self) {
        let created = self
            .controller
            .form()
            .and_then(|f| match f.target {
                FormTarget::Create(column) => Some(column),
                FormTarget::Edit(_) => None,
            });
        let outcome = self.dispatch(Command::Submit);
        if outcome.changed {
            if let Some(column) = created {
                self.select_last(column);
            }
        }
    }

    pub fn focus_next_field(&mut self) {
        self.focused_field = self.focused_field.next();
        self.cursor_position = self.focused_text_len();
    }

    pub fn focus_previous_field(&mut self) {
        self.focused_field = self.focused_field.previous();
        self.cursor_position = self.focused_text_len();
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        let field = self.focused_field;
        let form = self.controller.form_mut()?;
        match field {
            FormField::Title => Some(&mut form.title),
            FormField::Description => Some(&mut form.description),
            FormField::Priority => None,
        }
    }

    fn focused_text_len(&mut self) -> usize {
        self.focused_text().map(|s| s.chars().count()).unwrap_or(0)
    }

    pub fn input_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(text) = self.focused_text() {
            let byte_index = text.chars().take(cursor).map(|c| c.len_utf8()).sum();
            text.insert(byte_index, c);
            self.cursor_position += 1;
        }
    }

    pub fn delete_char(&mut self) {
        let cursor = self.cursor_position;
        if cursor == 0 {
            return;
        }
        if let Some(text) = self.focused_text() {
            let byte_index: usize = text.chars().take(cursor - 1).map(|c| c.len_utf8()).sum();
            text.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.focused_field == FormField::Priority {
            if let Some(form) = self.controller.form_mut() {
                form.priority = form.priority.previous();
            }
        } else if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.focused_field == FormField::Priority {
            if let Some(form) = self.controller.form_mut() {
                form.priority = form.priority.next();
            }
        } else {
            let len = self.focused_text_len();
            if self.cursor_position < len {
                self.cursor_position += 1;
            }
        }
    }

    // Delete

    pub fn request_delete(&mut self) {
        if let Some(task_id) = self.selected_task() {
            self.dispatch(Command::RequestDelete {
                task_id,
                column: self.selected_column,
            });
        }
    }

    pub fn resolve_delete(&mut self, answer: bool) {
        self.dispatch(Command::ResolveDelete(answer));
    }

    // Keyboard drag: pick the selected card up, carry it across columns,
    // put it down.

    pub fn pick_up(&mut self) {
        if let Some(id) = self.selected_task() {
            self.dispatch(Command::DragStart(id));
            self.enter_column(Some(self.selected_column));
        }
    }

    pub fn carry(&mut self, column: Column) {
        self.selected_column = column;
        self.enter_column(Some(column));
    }

    pub fn put_down(&mut self) {
        let target = self.hover.unwrap_or(self.selected_column);
        self.drop_on(Some(target));
    }

    pub fn cancel_drag(&mut self) {
        self.hover = None;
        self.dispatch(Command::DragEnd);
    }

    // Mouse drag

    pub fn mouse_down(&mut self, x: u16, y: u16) {
        let Some((column, index)) = self.layout.card_at(x, y) else {
            if let Some(column) = self.layout.column_at(x, y) {
                self.selected_column = column;
            }
            return;
        };
        self.selected_column = column;
        if index < self.snapshot().column(column).count {
            self.selected_card[column.index()] = index;
            self.pick_up();
        }
    }

    pub fn mouse_drag(&mut self, x: u16, y: u16) {
        if self.controller.drag().is_some() {
            let column = self.layout.column_at(x, y);
            self.enter_column(column);
        }
    }

    pub fn mouse_up(&mut self, x: u16, y: u16) {
        if self.controller.drag().is_some() {
            let column = self.layout.column_at(x, y);
            self.drop_on(column);
        }
    }

    fn enter_column(&mut self, column: Option<Column>) {
        if self.hover == column {
            return;
        }
        if let Some(previous) = self.hover {
            self.dispatch(Command::DragLeave(previous));
        }
        if let Some(next) = column {
            self.dispatch(Command::DragEnter(next));
        }
        self.hover = column;
    }

    fn drop_on(&mut self, column: Option<Column>) {
        self.hover = None;
        let Some(column) = column else {
            self.dispatch(Command::DragEnd);
            return;
        };
        let outcome = self.dispatch(Command::Drop(column));
        if outcome.changed {
            self.select_last(column);
        }
    }
}
