//! The application controller: owns the board service, the view and the
//! current interaction, and maps UI intents onto board operations.

use std::collections::BTreeSet;

use crate::error::BoardError;
use crate::model::board::Board;
use crate::model::task::{Column, Priority, Task, TaskId};
use crate::repository::KeyValueStore;
use crate::service::board_service::{BoardService, Change};
use crate::view::{sanitize_terminal, BoardSnapshot, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Create(Column),
    Edit(TaskId),
}

/// Fields of the add/edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub target: FormTarget,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl TaskForm {
    pub fn is_edit(&self) -> bool {
        matches!(self.target, FormTarget::Edit(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub task_id: TaskId,
    pub source: Column,
    drop_targets: BTreeSet<Column>,
}

impl DragState {
    pub fn is_drop_target(&self, column: Column) -> bool {
        self.drop_targets.contains(&column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Idle,
    Editing(TaskForm),
    Dragging(DragState),
    ConfirmingDelete { task_id: TaskId, column: Column },
}

/// Every intent the UI can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenCreate(Column),
    OpenEdit(TaskId),
    Submit,
    CancelForm,
    RequestDelete { task_id: TaskId, column: Column },
    ResolveDelete(bool),
    DragStart(TaskId),
    DragEnter(Column),
    DragLeave(Column),
    Drop(Column),
    DragEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub changed: bool,
    pub notice: Option<Notice>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }

    fn changed(message: String) -> Self {
        Self {
            changed: true,
            notice: Some(Notice::Info(message)),
        }
    }

    fn error(err: &BoardError) -> Self {
        if err.is_validation() {
            tracing::debug!(error = %err, "command rejected");
        } else {
            tracing::warn!(error = %err, "command failed");
        }
        Self {
            changed: false,
            notice: Some(Notice::Error(err.to_string())),
        }
    }
}

pub struct Controller<S: KeyValueStore, V: View> {
    service: BoardService<S>,
    view: V,
    interaction: Interaction,
    default_priority: Priority,
}

impl<S: KeyValueStore, V: View> Controller<S, V> {
    pub fn new(service: BoardService<S>, view: V, default_priority: Priority) -> Self {
        let mut controller = Self {
            service,
            view,
            interaction: Interaction::Idle,
            default_priority,
        };
        controller.repaint();
        controller
    }

    pub fn board(&self) -> &Board {
        self.service.board()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn form(&self) -> Option<&TaskForm> {
        match &self.interaction {
            Interaction::Editing(form) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match &mut self.interaction {
            Interaction::Editing(form) => Some(form),
            _ => None,
        }
    }

    pub fn drag(&self) -> Option<&DragState> {
        match &self.interaction {
            Interaction::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Outcome {
        tracing::trace!(?command, "dispatch");
        match command {
            Command::OpenCreate(column) => self.open_form(TaskForm {
                target: FormTarget::Create(column),
                title: String::new(),
                description: String::new(),
                priority: self.default_priority,
            }),
            Command::OpenEdit(task_id) => match self.service.find(task_id) {
                Some(task) => {
                    let form = TaskForm {
                        target: FormTarget::Edit(task.id),
                        title: task.title.clone(),
                        description: task.description.clone(),
                        priority: task.priority,
                    };
                    self.open_form(form)
                }
                None => Outcome::error(&BoardError::TaskNotFound(task_id)),
            },
            Command::Submit => self.submit_form(),
            Command::CancelForm => {
                if self.form().is_some() {
                    self.interaction = Interaction::Idle;
                }
                Outcome::none()
            }
            Command::RequestDelete { task_id, column } => {
                if self.interaction == Interaction::Idle && self.board().contains(column, task_id) {
                    self.interaction = Interaction::ConfirmingDelete { task_id, column };
                }
                Outcome::none()
            }
            Command::ResolveDelete(answer) => self.resolve_delete(answer),
            Command::DragStart(task_id) => {
                if self.interaction == Interaction::Idle {
                    if let Some(task) = self.service.find(task_id) {
                        tracing::debug!(task_id, source = %task.column, "drag started");
                        self.interaction = Interaction::Dragging(DragState {
                            task_id,
                            source: task.column,
                            drop_targets: BTreeSet::new(),
                        });
                    }
                }
                Outcome::none()
            }
            Command::DragEnter(column) => {
                if let Interaction::Dragging(drag) = &mut self.interaction {
                    drag.drop_targets.insert(column);
                }
                Outcome::none()
            }
            Command::DragLeave(column) => {
                if let Interaction::Dragging(drag) = &mut self.interaction {
                    drag.drop_targets.remove(&column);
                }
                Outcome::none()
            }
            Command::Drop(column) => self.drop_on(column),
            Command::DragEnd => {
                if self.drag().is_some() {
                    tracing::debug!("drag cancelled");
                    self.interaction = Interaction::Idle;
                }
                Outcome::none()
            }
        }
    }

    fn open_form(&mut self, form: TaskForm) -> Outcome {
        if matches!(self.interaction, Interaction::Idle | Interaction::Editing(_)) {
            self.interaction = Interaction::Editing(form);
        }
        Outcome::none()
    }

    fn submit_form(&mut self) -> Outcome {
        let Some(form) = self.form().cloned() else {
            return Outcome::none();
        };

        let result = match form.target {
            FormTarget::Create(column) => self
                .service
                .create(column, &form.title, &form.description, form.priority)
                .map(|task| format!("Added #{} to {}", task.id, column.title())),
            FormTarget::Edit(task_id) => self
                .service
                .update(task_id, &form.title, &form.description, form.priority)
                .map(|task| format!("Updated #{}", task.id)),
        };

        match result {
            Ok(message) => {
                self.interaction = Interaction::Idle;
                self.repaint();
                Outcome::changed(message)
            }
            // The form stays open so the user can fix the input.
            Err(e) => Outcome::error(&e),
        }
    }

    fn resolve_delete(&mut self, answer: bool) -> Outcome {
        let Interaction::ConfirmingDelete { task_id, column } = self.interaction else {
            return Outcome::none();
        };
        self.interaction = Interaction::Idle;

        match self.service.delete(task_id, column, &mut |_: &Task| answer) {
            Ok(Change::Applied) => {
                self.repaint();
                Outcome::changed(format!("Deleted #{}", task_id))
            }
            Ok(Change::Unchanged) => Outcome::none(),
            Err(e) => Outcome::error(&e),
        }
    }

    fn drop_on(&mut self, column: Column) -> Outcome {
        let drag = match &self.interaction {
            Interaction::Dragging(drag) => drag.clone(),
            _ => return Outcome::none(),
        };
        // Drop marks go away with the drag state.
        self.interaction = Interaction::Idle;
        if column == drag.source {
            return Outcome::none();
        }

        match self.service.transfer(drag.task_id, drag.source, column) {
            Ok(Change::Applied) => {
                self.repaint();
                Outcome::changed(format!("Moved #{} to {}", drag.task_id, column.title()))
            }
            Ok(Change::Unchanged) => Outcome::none(),
            Err(e) => Outcome::error(&e),
        }
    }

    fn repaint(&mut self) {
        let snapshot = BoardSnapshot::build(self.service.board(), sanitize_terminal);
        self.view.refresh(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryKeyValueStore;

    #[derive(Default)]
    struct RecordingView {
        refreshes: usize,
        last: Option<BoardSnapshot>,
    }

    impl View for RecordingView {
        fn refresh(&mut self, snapshot: BoardSnapshot) {
            self.refreshes += 1;
            self.last = Some(snapshot);
        }
    }

    fn controller(store: &MemoryKeyValueStore) -> Controller<&MemoryKeyValueStore, RecordingView> {
        Controller::new(BoardService::new(store), RecordingView::default(), Priority::Medium)
    }

    fn add(
        c: &mut Controller<&MemoryKeyValueStore, RecordingView>,
        column: Column,
        title: &str,
    ) -> Outcome {
        c.dispatch(Command::OpenCreate(column));
        c.form_mut().unwrap().title = title.to_string();
        c.dispatch(Command::Submit)
    }

    fn titles(c: &Controller<&MemoryKeyValueStore, RecordingView>, column: Column) -> Vec<String> {
        let snapshot = c.view().last.as_ref().unwrap();
        snapshot.column(column).cards.iter().map(|card| card.title.clone()).collect()
    }

    #[test]
    fn test_initial_render() {
        let store = MemoryKeyValueStore::new();
        let c = controller(&store);
        assert_eq!(c.view().refreshes, 1);
        assert_eq!(c.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_create_through_form() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);

        c.dispatch(Command::OpenCreate(Column::InProgress));
        let form = c.form().unwrap();
        assert_eq!(form.priority, Priority::Medium);
        assert!(!form.is_edit());

        let outcome = add(&mut c, Column::InProgress, "Write tests");
        assert!(outcome.changed);
        assert_eq!(outcome.notice, Some(Notice::Info("Added #1 to In Progress".to_string())));
        assert_eq!(c.interaction(), &Interaction::Idle);
        assert_eq!(c.view().refreshes, 2);
        assert_eq!(titles(&c, Column::InProgress), vec!["Write tests"]);
        assert_eq!(c.view().last.as_ref().unwrap().column(Column::InProgress).count, 1);
    }

    #[test]
    fn test_blank_title_keeps_form_open() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);

        let outcome = add(&mut c, Column::Todo, "   ");
        assert!(!outcome.changed);
        assert_eq!(outcome.notice, Some(Notice::Error("Please enter a task title".to_string())));
        assert!(c.form().is_some());
        assert_eq!(c.view().refreshes, 1);
        assert_eq!(store.writes(), 0);

        c.dispatch(Command::CancelForm);
        assert_eq!(c.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_edit_prefills_and_updates() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "Draft");

        c.dispatch(Command::OpenEdit(1));
        let form = c.form_mut().unwrap();
        assert!(form.is_edit());
        assert_eq!(form.title, "Draft");
        form.title = "Final".to_string();
        form.priority = Priority::High;

        let outcome = c.dispatch(Command::Submit);
        assert!(outcome.changed);
        let task = c.board().find(1).unwrap();
        assert_eq!(task.title, "Final");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.column, Column::Todo);

        let missing = c.dispatch(Command::OpenEdit(9));
        assert_eq!(missing.notice, Some(Notice::Error("Task #9 not found".to_string())));
        assert_eq!(c.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_delete_waits_for_confirmation() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "A");

        c.dispatch(Command::RequestDelete { task_id: 1, column: Column::Todo });
        assert_eq!(
            c.interaction(),
            &Interaction::ConfirmingDelete { task_id: 1, column: Column::Todo }
        );
        let outcome = c.dispatch(Command::ResolveDelete(false));
        assert!(!outcome.changed);
        assert_eq!(c.board().len(), 1);

        c.dispatch(Command::RequestDelete { task_id: 1, column: Column::Todo });
        let outcome = c.dispatch(Command::ResolveDelete(true));
        assert!(outcome.changed);
        assert!(c.board().is_empty());
        assert!(titles(&c, Column::Todo).is_empty());
    }

    #[test]
    fn test_delete_request_for_unknown_task_is_ignored() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "A");

        c.dispatch(Command::RequestDelete { task_id: 1, column: Column::Done });
        assert_eq!(c.interaction(), &Interaction::Idle);
        assert_eq!(c.dispatch(Command::ResolveDelete(true)), Outcome::default());
        assert_eq!(c.board().len(), 1);
    }

    #[test]
    fn test_drag_and_drop_to_other_column() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "A");
        add(&mut c, Column::Todo, "B");
        add(&mut c, Column::Done, "C");

        c.dispatch(Command::DragStart(1));
        let drag = c.drag().unwrap();
        assert_eq!((drag.task_id, drag.source), (1, Column::Todo));

        c.dispatch(Command::DragEnter(Column::InProgress));
        c.dispatch(Command::DragLeave(Column::InProgress));
        c.dispatch(Command::DragEnter(Column::Done));
        assert!(c.drag().unwrap().is_drop_target(Column::Done));
        assert!(!c.drag().unwrap().is_drop_target(Column::InProgress));

        let outcome = c.dispatch(Command::Drop(Column::Done));
        assert!(outcome.changed);
        assert_eq!(c.interaction(), &Interaction::Idle);
        assert_eq!(titles(&c, Column::Todo), vec!["B"]);
        assert_eq!(titles(&c, Column::Done), vec!["C", "A"]);
        assert_eq!(c.board().find(1).unwrap().column, Column::Done);

        // The browser follows a drop with dragend; it must be harmless.
        assert_eq!(c.dispatch(Command::DragEnd), Outcome::default());
    }

    #[test]
    fn test_drop_on_source_column_is_noop() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "A");
        add(&mut c, Column::Todo, "B");
        let (writes, refreshes) = (store.writes(), c.view().refreshes);

        c.dispatch(Command::DragStart(1));
        c.dispatch(Command::DragEnter(Column::Todo));
        let outcome = c.dispatch(Command::Drop(Column::Todo));

        assert!(!outcome.changed);
        assert_eq!(c.interaction(), &Interaction::Idle);
        assert_eq!(store.writes(), writes);
        assert_eq!(c.view().refreshes, refreshes);
        assert_eq!(titles(&c, Column::Todo), vec!["A", "B"]);
    }

    #[test]
    fn test_drag_end_without_drop_changes_nothing() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "A");
        let writes = store.writes();

        c.dispatch(Command::DragStart(1));
        c.dispatch(Command::DragEnter(Column::Done));
        c.dispatch(Command::DragEnd);

        assert_eq!(c.interaction(), &Interaction::Idle);
        assert_eq!(store.writes(), writes);
        assert_eq!(c.board().find(1).unwrap().column, Column::Todo);
    }

    #[test]
    fn test_drag_events_outside_a_drag_are_ignored() {
        let store = MemoryKeyValueStore::new();
        let mut c = controller(&store);
        add(&mut c, Column::Todo, "A");

        c.dispatch(Command::DragStart(42));
        assert_eq!(c.interaction(), &Interaction::Idle);
        c.dispatch(Command::DragEnter(Column::Done));
        assert_eq!(c.dispatch(Command::Drop(Column::Done)), Outcome::default());
        assert_eq!(c.board().find(1).unwrap().column, Column::Todo);

        // No drag can start while the form is open.
        c.dispatch(Command::OpenCreate(Column::Todo));
        c.dispatch(Command::DragStart(1));
        c.dispatch(Command::Drop(Column::Done));
        assert!(c.form().is_some());
    }
}
