//! Board reconciliation engine.
//!
//! The board keeps three status buckets of task ids, derived from the store
//! and the board's filter criteria. Buckets are a cache: [`Board::rebuild`]
//! recreates them from the store at any time. A completed drag writes the new
//! status through the store first and then splices the card between buckets
//! so the two representations agree without a full rebuild.

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info, warn};

use crate::fields::Status;
use crate::filter::{with_status_at, FilterCriteria};
use crate::store::TaskStore;
use crate::task::Task;

/// Where a dragged card was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A bucket's empty space or header.
    Bucket(Status),
    /// Another card; resolves to the bucket holding that card.
    Card(u64),
}

/// Drag-and-drop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { task_id: u64 },
}

/// Result of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Moved { task_id: u64, from: Status, to: Status },
    /// Dropped on itself or on its own bucket.
    Unchanged,
    /// No target, or the card could not be located; nothing was mutated.
    Aborted,
}

/// Status-partitioned view of the store for the board presentation.
#[derive(Debug, Default)]
pub struct Board {
    buckets: [Vec<u64>; 3],
    criteria: FilterCriteria,
    drag: DragState,
}

impl Board {
    /// Build a board showing every task in the store.
    pub fn from_store(store: &TaskStore) -> Self {
        let mut board = Board::default();
        board.rebuild(store);
        board
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replace the filter criteria and rebuild.
    pub fn set_criteria(&mut self, criteria: FilterCriteria, store: &TaskStore) {
        self.criteria = criteria;
        self.rebuild(store);
    }

    /// Recompute every bucket from the store, as of now.
    pub fn rebuild(&mut self, store: &TaskStore) {
        self.rebuild_at(store, &Local::now());
    }

    /// Recompute every bucket from the store, evaluating due filters at `now`.
    ///
    /// Any drag in flight is cancelled.
    pub fn rebuild_at<Tz: TimeZone>(&mut self, store: &TaskStore, now: &DateTime<Tz>) {
        for status in Status::ALL {
            self.buckets[status.index()] = with_status_at(store.list(), &self.criteria, status, now)
                .map(|t| t.id)
                .collect();
        }
        self.drag = DragState::Idle;
        debug!(
            todo = self.buckets[0].len(),
            in_progress = self.buckets[1].len(),
            completed = self.buckets[2].len(),
            "rebuilt board"
        );
    }

    /// Ids in one bucket, top to bottom.
    pub fn bucket(&self, status: Status) -> &[u64] {
        &self.buckets[status.index()]
    }

    /// Tasks in one bucket, resolved against the store.
    pub fn bucket_tasks<'s>(&self, status: Status, store: &'s TaskStore) -> Vec<&'s Task> {
        self.bucket(status).iter().filter_map(|&id| store.get(id)).collect()
    }

    /// The bucket currently holding `task_id`. Linear scan; buckets are small.
    pub fn locate(&self, task_id: u64) -> Option<Status> {
        Status::ALL
            .into_iter()
            .find(|s| self.buckets[s.index()].contains(&task_id))
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Pick up a card. Returns false if the card is not on the board.
    pub fn begin_drag(&mut self, task_id: u64) -> bool {
        if self.locate(task_id).is_none() {
            return false;
        }
        self.drag = DragState::Dragging { task_id };
        true
    }

    /// Abandon the drag in flight; the card stays where it was.
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Release the card picked up by [`Board::begin_drag`].
    pub fn drop_on(&mut self, target: Option<DropTarget>, store: &mut TaskStore) -> DragOutcome {
        let DragState::Dragging { task_id } = std::mem::take(&mut self.drag) else {
            return DragOutcome::Aborted;
        };
        self.handle_drag_end(task_id, target, store)
    }

    /// Reconcile a drag of `task_id` released over `target`.
    ///
    /// The store's `set_status` is the authoritative mutation; the bucket
    /// splice follows it so that after return the card sits in exactly the
    /// bucket matching its stored status.
    pub fn handle_drag_end(
        &mut self,
        task_id: u64,
        target: Option<DropTarget>,
        store: &mut TaskStore,
    ) -> DragOutcome {
        self.drag = DragState::Idle;

        let to = match target {
            None => {
                debug!(task_id, "drag released outside any bucket");
                return DragOutcome::Aborted;
            }
            Some(DropTarget::Card(over)) if over == task_id => return DragOutcome::Unchanged,
            Some(DropTarget::Card(over)) => match self.locate(over) {
                Some(status) => status,
                None => {
                    warn!(task_id, over, "drop target card is not on the board");
                    return DragOutcome::Aborted;
                }
            },
            Some(DropTarget::Bucket(status)) => status,
        };

        let Some(from) = self.locate(task_id) else {
            warn!(task_id, "dragged card is not on the board");
            return DragOutcome::Aborted;
        };
        if from == to {
            return DragOutcome::Unchanged;
        }

        if !store.set_status(task_id, to) {
            // Stale card: the task is gone from the store, so drop it from the cache too.
            self.buckets[from.index()].retain(|&id| id != task_id);
            return DragOutcome::Aborted;
        }
        self.buckets[from.index()].retain(|&id| id != task_id);
        self.buckets[to.index()].push(task_id);
        info!(task_id, %from, %to, "moved card");
        DragOutcome::Moved { task_id, from, to }
    }

    /// Move a card one bucket left or right, as a keyboard drag.
    pub fn shift_card(&mut self, task_id: u64, right: bool, store: &mut TaskStore) -> DragOutcome {
        let Some(next) = self.locate(task_id).and_then(|s| s.neighbour(right)) else {
            return DragOutcome::Unchanged;
        };
        self.handle_drag_end(task_id, Some(DropTarget::Bucket(next)), store)
    }

    /// Check the buckets against the store: every bucketed id exists with the
    /// bucket's status and appears once, and every filtered-in task is bucketed.
    pub fn is_consistent_with_at<Tz: TimeZone>(&self, store: &TaskStore, now: &DateTime<Tz>) -> bool {
        let mut seen = std::collections::HashSet::new();
        for status in Status::ALL {
            for &id in self.bucket(status) {
                let matches = store.get(id).is_some_and(|t| t.status == status);
                if !matches || !seen.insert(id) {
                    return false;
                }
            }
            let expected = with_status_at(store.list(), &self.criteria, status, now).count();
            if expected != self.bucket(status).len() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Category;
    use crate::task::TaskFields;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn fields(title: &str, day: u32, status: Status) -> TaskFields {
        let due = Utc.with_ymd_and_hms(2024, 12, day, 9, 0, 0).unwrap();
        TaskFields::new(title, Category::Work, due, status)
    }

    fn consistent(board: &Board, store: &TaskStore) -> bool {
        board.is_consistent_with_at(store, &Utc::now())
    }

    /// Three to-do cards, one in progress, one completed.
    #[fixture]
    fn populated() -> (TaskStore, Vec<u64>) {
        let mut store = TaskStore::new();
        let ids = vec![
            store.add(fields("a", 1, Status::ToDo)),
            store.add(fields("b", 2, Status::ToDo)),
            store.add(fields("c", 3, Status::InProgress)),
            store.add(fields("d", 4, Status::Completed)),
            store.add(fields("e", 5, Status::ToDo)),
        ];
        (store, ids)
    }

    #[test]
    fn drag_single_card_to_in_progress() {
        let mut store = TaskStore::new();
        let t1 = store.add(fields("T1", 1, Status::ToDo));
        let mut board = Board::from_store(&store);
        assert_eq!(board.bucket(Status::ToDo), &[t1]);

        let outcome = board.handle_drag_end(t1, Some(DropTarget::Bucket(Status::InProgress)), &mut store);

        assert_eq!(outcome, DragOutcome::Moved { task_id: t1, from: Status::ToDo, to: Status::InProgress });
        assert!(board.bucket(Status::ToDo).is_empty());
        assert_eq!(board.bucket(Status::InProgress), &[t1]);
        assert!(board.bucket(Status::Completed).is_empty());
        assert_eq!(store.get(t1).unwrap().status, Status::InProgress);
    }

    #[rstest]
    fn every_task_sits_in_exactly_its_status_bucket(populated: (TaskStore, Vec<u64>)) {
        let (store, ids) = populated;
        let board = Board::from_store(&store);
        for id in ids {
            let task = store.get(id).unwrap();
            let holding: Vec<Status> =
                Status::ALL.into_iter().filter(|s| board.bucket(*s).contains(&id)).collect();
            assert_eq!(holding, vec![task.status]);
        }
        assert!(consistent(&board, &store));
    }

    #[rstest]
    fn drop_on_card_resolves_to_its_bucket(populated: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = populated;
        let mut board = Board::from_store(&store);
        let outcome = board.handle_drag_end(ids[0], Some(DropTarget::Card(ids[3])), &mut store);
        assert_eq!(outcome, DragOutcome::Moved { task_id: ids[0], from: Status::ToDo, to: Status::Completed });
        assert_eq!(board.bucket(Status::Completed), &[ids[3], ids[0]]);
        assert!(consistent(&board, &store));
    }

    #[rstest]
    #[case::onto_itself(Some(DropTarget::Card(1)), DragOutcome::Unchanged)]
    #[case::onto_own_bucket(Some(DropTarget::Bucket(Status::ToDo)), DragOutcome::Unchanged)]
    #[case::onto_sibling_card(Some(DropTarget::Card(2)), DragOutcome::Unchanged)]
    #[case::outside(None, DragOutcome::Aborted)]
    #[case::onto_unknown_card(Some(DropTarget::Card(404)), DragOutcome::Aborted)]
    fn drops_that_change_nothing(
        populated: (TaskStore, Vec<u64>),
        #[case] target: Option<DropTarget>,
        #[case] expected: DragOutcome,
    ) {
        let (mut store, ids) = populated;
        assert_eq!(ids[0], 1);
        let mut board = Board::from_store(&store);
        let before: Vec<Vec<u64>> = Status::ALL.iter().map(|s| board.bucket(*s).to_vec()).collect();

        assert_eq!(board.handle_drag_end(ids[0], target, &mut store), expected);

        let after: Vec<Vec<u64>> = Status::ALL.iter().map(|s| board.bucket(*s).to_vec()).collect();
        assert_eq!(before, after);
        assert_eq!(store.get(ids[0]).unwrap().status, Status::ToDo);
    }

    #[rstest]
    fn unknown_source_aborts_without_touching_store(populated: (TaskStore, Vec<u64>)) {
        let (mut store, _) = populated;
        let mut board = Board::from_store(&store);
        let outcome = board.handle_drag_end(404, Some(DropTarget::Bucket(Status::Completed)), &mut store);
        assert_eq!(outcome, DragOutcome::Aborted);
        assert!(consistent(&board, &store));
    }

    #[rstest]
    fn stale_card_is_dropped_from_cache(populated: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = populated;
        let mut board = Board::from_store(&store);
        store.delete(ids[1]);
        let outcome = board.handle_drag_end(ids[1], Some(DropTarget::Bucket(Status::Completed)), &mut store);
        assert_eq!(outcome, DragOutcome::Aborted);
        assert!(board.locate(ids[1]).is_none());
        assert!(consistent(&board, &store));
    }

    #[rstest]
    fn drag_state_machine(populated: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = populated;
        let mut board = Board::from_store(&store);

        assert_eq!(board.drop_on(Some(DropTarget::Bucket(Status::Completed)), &mut store), DragOutcome::Aborted);
        assert!(!board.begin_drag(404));
        assert_eq!(board.drag_state(), DragState::Idle);

        assert!(board.begin_drag(ids[2]));
        assert_eq!(board.drag_state(), DragState::Dragging { task_id: ids[2] });
        board.cancel_drag();
        assert_eq!(board.drag_state(), DragState::Idle);
        assert_eq!(store.get(ids[2]).unwrap().status, Status::InProgress);

        assert!(board.begin_drag(ids[2]));
        let outcome = board.drop_on(Some(DropTarget::Bucket(Status::Completed)), &mut store);
        assert!(matches!(outcome, DragOutcome::Moved { to: Status::Completed, .. }));
        assert_eq!(board.drag_state(), DragState::Idle);
        assert!(consistent(&board, &store));
    }

    #[rstest]
    fn splice_agrees_with_a_full_rebuild(populated: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = populated;
        let mut board = Board::from_store(&store);
        board.shift_card(ids[0], true, &mut store);
        board.shift_card(ids[2], true, &mut store);
        board.shift_card(ids[3], false, &mut store);

        let rebuilt = Board::from_store(&store);
        for status in Status::ALL {
            let mut spliced = board.bucket(status).to_vec();
            let mut fresh = rebuilt.bucket(status).to_vec();
            spliced.sort_unstable();
            fresh.sort_unstable();
            assert_eq!(spliced, fresh, "bucket {status}");
        }
    }

    #[rstest]
    fn shift_stops_at_the_edges(populated: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = populated;
        let mut board = Board::from_store(&store);
        assert_eq!(board.shift_card(ids[0], false, &mut store), DragOutcome::Unchanged);
        assert_eq!(board.shift_card(ids[3], true, &mut store), DragOutcome::Unchanged);
    }

    #[rstest]
    fn filtered_board_only_holds_matching_tasks(populated: (TaskStore, Vec<u64>)) {
        let (mut store, ids) = populated;
        store.update(ids[1], TaskFields { category: Category::Personal, ..fields("b", 2, Status::ToDo) });
        let mut board = Board::from_store(&store);
        let criteria = FilterCriteria { category: Some(Category::Personal), ..Default::default() };
        board.set_criteria(criteria, &store);
        assert_eq!(board.bucket(Status::ToDo), &[ids[1]]);
        assert!(board.bucket(Status::InProgress).is_empty());
        assert!(consistent(&board, &store));
    }
}
