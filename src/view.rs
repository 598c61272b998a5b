//! Per-view presentation state.
//!
//! Holds what the renderer needs between frames that is not task data: the
//! active presentation, the filter criteria owned by that presentation, and
//! the one row action menu that may be open.

use crate::fields::ViewMode;
use crate::filter::FilterCriteria;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub mode: ViewMode,
    pub criteria: FilterCriteria,
    open_menu: Option<u64>,
}

impl ViewState {
    pub fn new(mode: ViewMode, criteria: FilterCriteria) -> Self {
        Self { mode, criteria, open_menu: None }
    }

    /// Switch between the list and the board. Any open menu is closed.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.open_menu = None;
    }

    /// Open the action menu for `task_id`, or close it if it is already open.
    /// Opening one row's menu closes any other.
    pub fn toggle_menu(&mut self, task_id: u64) {
        self.open_menu = match self.open_menu {
            Some(open) if open == task_id => None,
            _ => Some(task_id),
        };
    }

    pub fn close_menu(&mut self) {
        self.open_menu = None;
    }

    pub fn open_menu(&self) -> Option<u64> {
        self.open_menu
    }

    pub fn is_menu_open(&self, task_id: u64) -> bool {
        self.open_menu == Some(task_id)
    }
}
