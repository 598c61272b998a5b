//! Main application logic for the terminal user interface.
//!
//! `App` owns the store and every piece of presentation state. Each key press
//! is handled synchronously: store mutations are saved straight away and the
//! derived list and board are refreshed before the next frame.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, error};

use crate::board::{Board, DragOutcome, DragState, DropTarget};
use crate::config::TrackerConfig;
use crate::error::CommitError;
use crate::fields::{DraftField, SortOrder, Status, ViewMode};
use crate::filter::{partition_by_status, FilterCriteria};
use crate::identity::Account;
use crate::session::{Editor, SessionMode};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::{
    board_view::{self, BoardCursor},
    colors::{ERROR_RED, PLUM},
    list_view::{self, ListSelection},
    task_form::{
        TaskForm, ATTACHMENT_FIELD, CATEGORY_FIELD, DESCRIPTION_FIELD, DUE_FIELD, STATUS_FIELD,
        TITLE_FIELD,
    },
    utils::centered_rect,
};
use crate::view::ViewState;

/// What keys currently drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
    /// Waiting for y/n before deleting these ids.
    ConfirmDelete(Vec<u64>),
}

pub struct App {
    store: TaskStore,
    db_path: PathBuf,
    view: ViewState,
    board: Board,
    board_cursor: BoardCursor,
    groups: [Vec<Task>; 3],
    list: ListSelection,
    editor: Editor,
    form: Option<TaskForm>,
    account: Account,
    mode: InputMode,
    status_message: String,
    should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore, db_path: &Path, config: &TrackerConfig, view: Option<ViewMode>) -> Self {
        let criteria = FilterCriteria { sort: config.sort, ..Default::default() };
        let mut board = Board::default();
        board.set_criteria(criteria.clone(), &store);

        let mut account = Account::default();
        if let Some(user) = config.user.clone() {
            account.sign_in(user);
        }

        let mut app = App {
            store,
            db_path: db_path.to_path_buf(),
            view: ViewState::new(view.unwrap_or(config.default_view), criteria),
            board,
            board_cursor: BoardCursor::default(),
            groups: Default::default(),
            list: ListSelection::default(),
            editor: Editor::new(),
            form: None,
            account,
            mode: InputMode::Normal,
            status_message: String::new(),
            should_quit: false,
        };
        app.refresh_list();
        app
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view.mode
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Re-derive the grouped list. The board keeps its buckets.
    fn refresh_list(&mut self) {
        self.groups = partition_by_status(self.store.list(), &self.view.criteria);
        self.list.clamp(&self.groups);
        self.board_cursor.clamp(&self.board);
    }

    /// Rebuild the board from the store, then the list.
    fn refresh_all(&mut self) {
        self.board.set_criteria(self.view.criteria.clone(), &self.store);
        self.board_cursor.hover = None;
        self.refresh_list();
    }

    /// Save the snapshot, reporting failure in the status bar.
    fn persist(&mut self) -> bool {
        match self.store.save(&self.db_path) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, path = %self.db_path.display(), "failed to save tasks");
                self.status_message = format!("Error saving: {e}");
                false
            }
        }
    }

    /// The task the cursor is on in the active view.
    fn current_task(&self) -> Option<u64> {
        match self.view.mode {
            ViewMode::List => self.list.current(&self.groups),
            ViewMode::Board => self.board_cursor.selected_id(&self.board),
        }
    }

    fn open_create(&mut self) {
        self.view.close_menu();
        let session = self.editor.open_create();
        self.form = Some(TaskForm::from_draft(&session.draft));
        self.mode = InputMode::Form;
    }

    fn open_edit(&mut self, id: u64) {
        self.view.close_menu();
        if !self.editor.open_edit(id, &self.store) {
            self.status_message = format!("Task {id} no longer exists");
            self.refresh_all();
            return;
        }
        if let Some(session) = self.editor.current() {
            self.form = Some(TaskForm::from_draft(&session.draft));
            self.mode = InputMode::Form;
        }
    }

    fn close_form(&mut self) {
        self.editor.close();
        self.form = None;
        self.mode = InputMode::Normal;
    }

    fn sync_form(&mut self) {
        if let (Some(form), Some(session)) = (self.form.as_mut(), self.editor.current_mut()) {
            form.sync_into(&mut session.draft);
        }
    }

    fn submit_form(&mut self) {
        self.sync_form();
        match self.editor.commit(&mut self.store) {
            Ok(id) => {
                self.form = None;
                self.mode = InputMode::Normal;
                let saved = self.persist();
                self.refresh_all();
                self.board_cursor.follow(id, &self.board);
                if saved {
                    self.status_message = format!("Saved task {id}");
                }
            }
            Err(e @ CommitError::Invalid(_)) => {
                self.status_message = e.to_string();
            }
            Err(e) => {
                self.form = None;
                self.mode = InputMode::Normal;
                self.status_message = e.to_string();
                self.refresh_all();
            }
        }
    }

    fn ask_delete(&mut self, ids: Vec<u64>) {
        self.view.close_menu();
        if !ids.is_empty() {
            self.mode = InputMode::ConfirmDelete(ids);
        }
    }

    fn delete(&mut self, ids: &[u64]) {
        let removed = self.store.delete_many(ids);
        let saved = self.persist();
        self.refresh_all();
        if saved {
            self.status_message = format!("Deleted {removed} task(s)");
        }
    }

    /// Set `status` on the marked rows, or the cursor row if none are marked.
    fn set_status_on_selection(&mut self, status: Status) {
        let ids: Vec<u64> = if self.list.marked.is_empty() {
            self.current_task().into_iter().collect()
        } else {
            self.list.marked.iter().copied().collect()
        };
        let changed = ids.iter().filter(|&&id| self.store.set_status(id, status)).count();
        if changed > 0 {
            let saved = self.persist();
            self.refresh_all();
            if saved {
                self.status_message = format!("Moved {changed} task(s) to {}", status.section_title());
            }
        }
    }

    fn report_drag(&mut self, outcome: DragOutcome) {
        self.board_cursor.hover = None;
        match outcome {
            DragOutcome::Moved { task_id, to, .. } => {
                let saved = self.persist();
                self.refresh_list();
                self.board_cursor.follow(task_id, &self.board);
                if saved {
                    self.status_message = format!("Moved task to {}", to.key());
                }
            }
            DragOutcome::Unchanged => {}
            DragOutcome::Aborted => {
                self.status_message = "Drop cancelled".to_string();
                self.refresh_list();
            }
        }
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.mode.clone() {
            InputMode::Form => self.handle_form_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::ConfirmDelete(ids) => self.handle_confirm_key(key, &ids),
            InputMode::Normal => {
                self.status_message.clear();
                self.handle_normal_key(key);
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.mode = InputMode::Normal;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.close_form();
                return;
            }
            KeyCode::Enter => {
                self.submit_form();
                return;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.handle_left_right(false),
            KeyCode::Right => form.handle_left_right(true),
            KeyCode::Backspace => form.handle_backspace(),
            KeyCode::Delete => form.handle_delete(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => form.clear_field(),
            KeyCode::Char(c) => form.handle_char(c),
            _ => {}
        }
        self.sync_form();
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.view.criteria.search.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.view.criteria.search.pop();
            }
            KeyCode::Char(c) => self.view.criteria.search.push(c),
            _ => return,
        }
        self.refresh_all();
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, ids: &[u64]) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = InputMode::Normal;
                self.delete(ids);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if let Some(id) = self.view.open_menu() {
            match key.code {
                KeyCode::Char('e') | KeyCode::Enter => self.open_edit(id),
                KeyCode::Char('d') => self.ask_delete(vec![id]),
                _ => self.view.close_menu(),
            }
            return;
        }

        if matches!(self.board.drag_state(), DragState::Dragging { .. }) {
            self.handle_drag_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if !self.view.criteria.is_pass_through() {
                    let sort = self.view.criteria.sort;
                    self.view.criteria = FilterCriteria { sort, ..Default::default() };
                    self.refresh_all();
                    self.status_message = "Filters cleared".to_string();
                }
            }
            KeyCode::Tab => {
                self.view.toggle_mode();
                debug!(mode = ?self.view.mode, "switched view");
            }
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('f') => {
                self.view.criteria.cycle_category();
                self.refresh_all();
            }
            KeyCode::Char('t') => {
                self.view.criteria.cycle_due();
                self.refresh_all();
            }
            KeyCode::Char('s') => {
                self.view.criteria.sort = self.view.criteria.sort.toggled();
                self.refresh_all();
            }
            KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('o') => {
                if self.account.is_signed_in() {
                    self.account.sign_out();
                    self.status_message = "Signed out".to_string();
                }
            }
            KeyCode::Char('m') => {
                if let Some(id) = self.current_task() {
                    self.view.toggle_menu(id);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.current_task() {
                    self.open_edit(id);
                }
            }
            _ => match self.view.mode {
                ViewMode::List => self.handle_list_key(key),
                ViewMode::Board => self.handle_board_key(key),
            },
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.move_cursor(false, &self.groups),
            KeyCode::Down | KeyCode::Char('j') => self.list.move_cursor(true, &self.groups),
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.current_task() {
                    self.list.toggle_mark(id);
                }
            }
            KeyCode::Char('d') => {
                let ids = if self.list.marked.is_empty() {
                    self.current_task().into_iter().collect()
                } else {
                    self.list.marked.iter().copied().collect()
                };
                self.ask_delete(ids);
            }
            KeyCode::Char('1') => self.set_status_on_selection(Status::ToDo),
            KeyCode::Char('2') => self.set_status_on_selection(Status::InProgress),
            KeyCode::Char('3') => self.set_status_on_selection(Status::Completed),
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Left | KeyCode::Right if ctrl => {
                if let Some(id) = self.current_task() {
                    let outcome = self.board.shift_card(id, key.code == KeyCode::Right, &mut self.store);
                    self.report_drag(outcome);
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.board_cursor.move_column(false, &self.board),
            KeyCode::Right | KeyCode::Char('l') => self.board_cursor.move_column(true, &self.board),
            KeyCode::Up | KeyCode::Char('k') => self.board_cursor.move_card(false, &self.board),
            KeyCode::Down | KeyCode::Char('j') => self.board_cursor.move_card(true, &self.board),
            KeyCode::Char(' ') => {
                if let Some(id) = self.current_task() {
                    if self.board.begin_drag(id) {
                        self.board_cursor.hover = Some(self.board_cursor.status());
                        self.status_message =
                            "Moving card: ←/→ choose column, Space to drop, Esc to cancel".to_string();
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.current_task() {
                    self.ask_delete(vec![id]);
                }
            }
            _ => {}
        }
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.board_cursor.move_hover(false),
            KeyCode::Right | KeyCode::Char('l') => self.board_cursor.move_hover(true),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let target = self.board_cursor.hover.map(DropTarget::Bucket);
                let outcome = self.board.drop_on(target, &mut self.store);
                self.report_drag(outcome);
            }
            KeyCode::Esc => {
                self.board.cancel_drag();
                self.board_cursor.hover = None;
            }
            _ => {}
        }
    }

    fn poll_input(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Render the header: brand, view tabs, filter summary, signed-in user.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let tab = |mode: ViewMode, label: &'static str| {
            if self.view.mode == mode {
                Span::styled(label, Style::default().fg(PLUM).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
            } else {
                Span::raw(label)
            }
        };
        let user = self
            .account
            .identity()
            .map(|u| u.display_name().to_string())
            .unwrap_or_else(|| "not signed in".to_string());

        let criteria = &self.view.criteria;
        let sort = match criteria.sort {
            SortOrder::Asc => "due ↑",
            SortOrder::Desc => "due ↓",
        };
        let filters = format!(
            "Category: {}  Due: {}  Sort: {}  Search: {}",
            criteria.category.map_or("Any", |c| c.label()),
            criteria.due.map_or("Any", |d| d.label()),
            sort,
            if criteria.search.is_empty() { "-" } else { criteria.search.as_str() },
        );

        let lines = vec![
            Line::from(vec![
                Span::styled("TaskBuddy", Style::default().fg(PLUM).add_modifier(Modifier::BOLD)),
                Span::raw("   "),
                tab(ViewMode::List, "List"),
                Span::raw(" | "),
                tab(ViewMode::Board, "Board"),
                Span::raw("   "),
                Span::styled(user, Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC)),
            ]),
            Line::from(Span::styled(filters, Style::default().fg(Color::Gray))),
        ];
        let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = match &self.mode {
            InputMode::Search => format!("Search: {}_ (Enter to keep, Esc to clear)", self.view.criteria.search),
            InputMode::Form => "Tab: next field | ←/→: choose | Ctrl+U: clear | Enter: save | Esc: cancel".to_string(),
            InputMode::ConfirmDelete(_) => "Confirm delete: y/n".to_string(),
            InputMode::Normal if !self.status_message.is_empty() => self.status_message.clone(),
            InputMode::Normal => match self.view.mode {
                ViewMode::List => "n: New | e: Edit | d: Delete | x: Mark | 1/2/3: Set status | m: Menu | f/t/s: Filters | /: Search | Tab: Board | q: Quit".to_string(),
                ViewMode::Board => "n: New | Space: Move card | Ctrl+←/→: Shift | e: Edit | d: Delete | f/t/s: Filters | /: Search | Tab: List | q: Quit".to_string(),
            },
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(PLUM).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Render the create/edit modal with inline errors.
    fn render_form(&self, f: &mut Frame, area: Rect) {
        let (Some(form), Some(session)) = (self.form.as_ref(), self.editor.current()) else {
            return;
        };
        let title = match session.mode() {
            SessionMode::Create => "Create Task",
            SessionMode::Edit(_) => "Edit Task",
        };
        let area = centered_rect(70, 80, area);
        f.render_widget(Clear, area);
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(PLUM).add_modifier(Modifier::BOLD));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(5), // Description
                Constraint::Length(3), // Due
                Constraint::Length(3), // Category
                Constraint::Length(3), // Status
                Constraint::Length(3), // Attachment
                Constraint::Min(0),
            ])
            .split(inner);

        let field_block = |order: usize, label: String, error: Option<&str>| {
            let border = if form.current_field == order {
                Style::default().fg(PLUM).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::raw(label)];
            if let Some(msg) = error {
                spans.push(Span::styled(format!(" - {msg}"), Style::default().fg(ERROR_RED)));
            }
            Block::default().borders(Borders::ALL).title(Line::from(spans)).border_style(border)
        };

        let title_err = session.error_for(DraftField::Title);
        f.render_widget(
            Paragraph::new(form.title.value.as_str())
                .block(field_block(TITLE_FIELD, "Task title *".into(), title_err)),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new(form.description.value.as_str())
                .block(field_block(DESCRIPTION_FIELD, "Description".into(), None))
                .wrap(Wrap { trim: false }),
            chunks[1],
        );
        let due_err = form.due_error.as_deref().or_else(|| session.error_for(DraftField::DueDate));
        f.render_widget(
            Paragraph::new(form.due.value.as_str()).block(field_block(
                DUE_FIELD,
                "Due on * (YYYY-MM-DD, today, friday, in 3d)".into(),
                due_err,
            )),
            chunks[2],
        );
        let category = form.category.map_or("Select", |c| c.label());
        f.render_widget(
            Paragraph::new(format!("< {category} >")).block(field_block(
                CATEGORY_FIELD,
                "Task Category *".into(),
                session.error_for(DraftField::Category),
            )),
            chunks[3],
        );
        let status = form.status.map_or("Select", |s| s.section_title());
        f.render_widget(
            Paragraph::new(format!("< {status} >")).block(field_block(
                STATUS_FIELD,
                "Task Status *".into(),
                session.error_for(DraftField::Status),
            )),
            chunks[4],
        );
        f.render_widget(
            Paragraph::new(form.attachment.value.as_str())
                .block(field_block(ATTACHMENT_FIELD, "Attachment (file or URL)".into(), None)),
            chunks[5],
        );

        let cursor_at = match form.current_field {
            TITLE_FIELD => Some((&form.title, chunks[0])),
            DESCRIPTION_FIELD => Some((&form.description, chunks[1])),
            DUE_FIELD => Some((&form.due, chunks[2])),
            ATTACHMENT_FIELD => Some((&form.attachment, chunks[5])),
            _ => None,
        };
        if let Some((input, rect)) = cursor_at {
            let x = rect.x + 1 + (input.cursor as u16).min(rect.width.saturating_sub(3));
            f.set_cursor_position((x, rect.y + 1));
        }
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect, ids: &[u64]) {
        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);
        let what = match ids {
            [id] => self
                .store
                .get(*id)
                .map_or_else(|| format!("task {id}"), |t| format!("\"{}\"", t.title)),
            _ => format!("{} tasks", ids.len()),
        };
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(format!("Delete {what}?"), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let dialog = Paragraph::new(text)
            .block(Block::default().title("Confirm Delete").borders(Borders::ALL).style(Style::default().bg(ERROR_RED)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(dialog, area);
    }

    fn render_menu(&self, f: &mut Frame, area: Rect, id: u64) {
        let area = centered_rect(30, 20, area);
        f.render_widget(Clear, area);
        let title = self.store.get(id).map_or("Task", |t| t.title.as_str());
        let menu = Paragraph::new(vec![
            Line::from("e  Edit"),
            Line::from(Span::styled("d  Delete", Style::default().fg(ERROR_RED))),
            Line::from("any other key closes"),
        ])
        .block(Block::default().borders(Borders::ALL).title(title).border_style(Style::default().fg(PLUM)));
        f.render_widget(menu, area);
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.view.mode {
            ViewMode::List => list_view::render(f, chunks[1], &self.groups, &self.list, self.view.open_menu()),
            ViewMode::Board => board_view::render(f, chunks[1], &self.board, &self.store, &self.board_cursor),
        }
        self.render_status_bar(f, chunks[2]);

        if let Some(id) = self.view.open_menu() {
            self.render_menu(f, chunks[1], id);
        }
        match &self.mode {
            InputMode::Form => self.render_form(f, f.area()),
            InputMode::ConfirmDelete(ids) => self.render_confirm(f, chunks[1], ids),
            _ => {}
        }
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;
            self.poll_input()?;
        }
        Ok(())
    }
}
