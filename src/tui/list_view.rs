//! Grouped list rendering and selection.
//!
//! The list shows the filtered, sorted tasks in three status sections. The
//! cursor walks task rows only; section headers are skipped.

use std::collections::BTreeSet;

use chrono::Local;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::dates::{format_due_short, local_date};
use crate::fields::Status;
use crate::task::Task;
use crate::tui::colors::{status_color, PLUM};

/// Cursor position and rows marked for bulk actions.
#[derive(Debug, Clone, Default)]
pub struct ListSelection {
    pub cursor: usize,
    pub marked: BTreeSet<u64>,
}

impl ListSelection {
    /// Task ids in display order.
    pub fn order(groups: &[Vec<Task>; 3]) -> Vec<u64> {
        groups.iter().flatten().map(|t| t.id).collect()
    }

    pub fn current(&self, groups: &[Vec<Task>; 3]) -> Option<u64> {
        groups.iter().flatten().nth(self.cursor).map(|t| t.id)
    }

    pub fn move_cursor(&mut self, down: bool, groups: &[Vec<Task>; 3]) {
        if down {
            self.cursor += 1;
        } else {
            self.cursor = self.cursor.saturating_sub(1);
        }
        self.clamp(groups);
    }

    pub fn toggle_mark(&mut self, id: u64) {
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    /// Drop marks for rows no longer shown and keep the cursor in range.
    pub fn clamp(&mut self, groups: &[Vec<Task>; 3]) {
        let order = Self::order(groups);
        self.marked.retain(|id| order.contains(id));
        self.cursor = self.cursor.min(order.len().saturating_sub(1));
    }
}

/// Render the sections as one table.
pub fn render(
    f: &mut Frame,
    area: Rect,
    groups: &[Vec<Task>; 3],
    selection: &ListSelection,
    open_menu: Option<u64>,
) {
    let today = Local::now().date_naive();
    let mut rows = Vec::new();
    let mut selected_row = None;
    let mut task_index = 0;

    for status in Status::ALL {
        let tasks = &groups[status.index()];
        rows.push(
            Row::new(vec![
                Cell::from(""),
                Cell::from(format!("{} ({})", status.section_title(), tasks.len())),
            ])
                .style(Style::default().bg(status_color(status)).fg(Color::Black).add_modifier(Modifier::BOLD)),
        );
        if tasks.is_empty() {
            rows.push(Row::new(vec![
                Cell::from(""),
                Cell::from(format!("No Tasks in {}", status.section_title())),
            ]).style(Style::default().fg(Color::DarkGray)));
        }
        for task in tasks {
            if task_index == selection.cursor {
                selected_row = Some(rows.len());
            }
            task_index += 1;

            let mark = if selection.marked.contains(&task.id) { "[x]" } else { "[ ]" };
            let due = local_date(&task.due_date, &Local);
            let due_text = if due == today { "Today".to_string() } else { format_due_short(due) };
            let title = if task.status == Status::Completed {
                Line::styled(task.title.clone(), Style::default().add_modifier(Modifier::CROSSED_OUT))
            } else {
                Line::from(task.title.clone())
            };
            let menu = if open_menu == Some(task.id) { "▾" } else { "…" };
            rows.push(Row::new(vec![
                Cell::from(mark),
                Cell::from(title),
                Cell::from(due_text),
                Cell::from(task.status.key()),
                Cell::from(task.category.label()),
                Cell::from(menu),
            ]));
        }
    }

    let header = Row::new(vec!["", "Task name", "Due on", "Task Status", "Task Category", ""])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(13),
        Constraint::Length(14),
        Constraint::Length(2),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(PLUM)))
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(selected_row);
    f.render_stateful_widget(table, area, &mut state);
}
