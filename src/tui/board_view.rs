//! Kanban board rendering and cursor.
//!
//! Three columns, one per status, filled from the [`Board`] buckets. Cards
//! are moved with a keyboard drag: pick a card up, move the hover column, and
//! drop it or cancel.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::board::{Board, DragState};
use crate::dates::{format_due_short, local_date};
use crate::fields::Status;
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::colors::{status_color, CARD, PLUM};
use crate::tui::utils::wrap_words;

const CARD_HEIGHT: u16 = 5;

/// Selected column and card, plus the hover column while dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCursor {
    pub column: usize,
    pub card: usize,
    pub hover: Option<Status>,
}

impl BoardCursor {
    pub fn status(&self) -> Status {
        Status::ALL[self.column.min(Status::ALL.len() - 1)]
    }

    /// Id under the cursor, if the column has cards.
    pub fn selected_id(&self, board: &Board) -> Option<u64> {
        board.bucket(self.status()).get(self.card).copied()
    }

    pub fn move_column(&mut self, right: bool, board: &Board) {
        if let Some(next) = self.status().neighbour(right) {
            self.column = next.index();
            self.clamp(board);
        }
    }

    pub fn move_card(&mut self, down: bool, board: &Board) {
        if down {
            self.card += 1;
        } else {
            self.card = self.card.saturating_sub(1);
        }
        self.clamp(board);
    }

    /// Move the drop target while a card is held.
    pub fn move_hover(&mut self, right: bool) {
        let from = self.hover.unwrap_or_else(|| self.status());
        self.hover = Some(from.neighbour(right).unwrap_or(from));
    }

    /// Put the cursor on `task_id` wherever it now lives.
    pub fn follow(&mut self, task_id: u64, board: &Board) {
        if let Some(status) = board.locate(task_id) {
            self.column = status.index();
            self.card = board.bucket(status).iter().position(|&id| id == task_id).unwrap_or(0);
        }
        self.clamp(board);
    }

    pub fn clamp(&mut self, board: &Board) {
        let len = board.bucket(self.status()).len();
        self.card = self.card.min(len.saturating_sub(1));
    }
}

/// Render the three columns.
pub fn render(f: &mut Frame, area: Rect, board: &Board, store: &TaskStore, cursor: &BoardCursor) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(area);

    let dragging = match board.drag_state() {
        DragState::Dragging { task_id } => Some(task_id),
        DragState::Idle => None,
    };

    for (status, &column_area) in Status::ALL.iter().zip(columns.iter()) {
        render_column(f, column_area, *status, board, store, cursor, dragging);
    }
}

fn render_column(
    f: &mut Frame,
    area: Rect,
    status: Status,
    board: &Board,
    store: &TaskStore,
    cursor: &BoardCursor,
    dragging: Option<u64>,
) {
    let is_selected = cursor.column == status.index();
    let is_hover = dragging.is_some() && cursor.hover == Some(status);
    let cards = board.bucket_tasks(status, store);

    let border_style = if is_hover {
        Style::default().fg(PLUM).add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else if is_selected {
        Style::default().fg(PLUM).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let title = Line::from(Span::styled(
        format!(" {} ({}) ", status.key(), cards.len()),
        Style::default().bg(status_color(status)).fg(Color::Black),
    ));
    let block = Block::default().borders(Borders::ALL).title(title).border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if cards.is_empty() {
        let empty = Paragraph::new(format!("No Tasks in {}", status.section_title()))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    let offset = if is_selected { (cursor.card + 1).saturating_sub(visible) } else { 0 };
    let today = Local::now().date_naive();

    for (slot, (index, task)) in cards.iter().enumerate().skip(offset).take(visible).enumerate() {
        let card_area = Rect {
            x: inner.x,
            y: inner.y + slot as u16 * CARD_HEIGHT,
            width: inner.width,
            height: CARD_HEIGHT.min(inner.height.saturating_sub(slot as u16 * CARD_HEIGHT)),
        };
        let is_cursor = is_selected && index == cursor.card;
        let is_held = dragging == Some(task.id);
        render_card(f, card_area, task, is_cursor, is_held, today);
    }
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    task: &Task,
    is_cursor: bool,
    is_held: bool,
    today: chrono::NaiveDate,
) {
    let style = if is_held {
        Style::default().bg(PLUM).fg(Color::White).add_modifier(Modifier::BOLD)
    } else if is_cursor {
        Style::default().bg(CARD).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = wrap_words(&task.title, width, 2).into_iter().map(Line::from).collect();
    let due = local_date(&task.due_date, &Local);
    let due_text = if due == today { "Today".to_string() } else { format_due_short(due) };
    lines.push(Line::from(format!("{} | {}", task.category, due_text)));

    let marker = if is_held { " moving " } else { "" };
    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(marker))
        .style(style);
    f.render_widget(card, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Category;
    use crate::task::TaskFields;
    use chrono::{TimeZone, Utc};

    fn board_with(statuses: &[Status]) -> (TaskStore, Board) {
        let mut store = TaskStore::new();
        for (i, status) in statuses.iter().enumerate() {
            let due = Utc.with_ymd_and_hms(2024, 12, 1 + i as u32, 9, 0, 0).unwrap();
            store.add(TaskFields::new(&format!("t{i}"), Category::Work, due, *status));
        }
        let board = Board::from_store(&store);
        (store, board)
    }

    #[test]
    fn column_moves_stop_at_edges() {
        let (_, board) = board_with(&[Status::ToDo]);
        let mut cursor = BoardCursor::default();
        cursor.move_column(false, &board);
        assert_eq!(cursor.status(), Status::ToDo);
        cursor.move_column(true, &board);
        cursor.move_column(true, &board);
        cursor.move_column(true, &board);
        assert_eq!(cursor.status(), Status::Completed);
    }

    #[test]
    fn card_index_is_clamped_to_column() {
        let (_, board) = board_with(&[Status::ToDo, Status::ToDo, Status::InProgress]);
        let mut cursor = BoardCursor::default();
        cursor.move_card(true, &board);
        cursor.move_card(true, &board);
        assert_eq!(cursor.card, 1);
        cursor.move_column(true, &board);
        assert_eq!(cursor.card, 0);
        assert_eq!(cursor.selected_id(&board), Some(3));
    }

    #[test]
    fn hover_stays_on_board() {
        let mut cursor = BoardCursor { column: 1, ..Default::default() };
        cursor.move_hover(true);
        assert_eq!(cursor.hover, Some(Status::Completed));
        cursor.move_hover(true);
        assert_eq!(cursor.hover, Some(Status::Completed));
        cursor.move_hover(false);
        cursor.move_hover(false);
        cursor.move_hover(false);
        assert_eq!(cursor.hover, Some(Status::ToDo));
    }

    #[test]
    fn follow_tracks_moved_card() {
        let (mut store, mut board) = board_with(&[Status::ToDo, Status::ToDo]);
        let mut cursor = BoardCursor { card: 1, ..Default::default() };
        let id = cursor.selected_id(&board).unwrap();
        board.shift_card(id, true, &mut store);
        cursor.follow(id, &board);
        assert_eq!(cursor.status(), Status::InProgress);
        assert_eq!(cursor.selected_id(&board), Some(id));
    }
}
