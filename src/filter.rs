//! Filter/sort pipeline for the list and board views.
//!
//! Pure derivation from the store's task slice: nothing here is cached, so a
//! view can call [`apply`] after every store mutation or criteria change.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::dates::{local_date, start_end_of_this_week};
use crate::fields::{Category, DueFilter, SortOrder, Status};
use crate::task::Task;

/// User-supplied filter, search and sort state for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub due: Option<DueFilter>,
    pub search: String,
    pub sort: SortOrder,
}

impl FilterCriteria {
    /// True when no predicate would reject anything.
    pub fn is_pass_through(&self) -> bool {
        self.category.is_none() && self.due.is_none() && self.search_needle().is_empty()
    }

    /// Lowercased search text without surrounding whitespace.
    fn search_needle(&self) -> String {
        self.search.trim().to_lowercase()
    }

    /// Cycle the category filter: any -> Work -> Personal -> any.
    pub fn cycle_category(&mut self) {
        self.category = match self.category {
            None => Some(Category::Work),
            Some(Category::Work) => Some(Category::Personal),
            Some(Category::Personal) => None,
        };
    }

    /// Cycle the due filter: any -> Today -> This Week -> any.
    pub fn cycle_due(&mut self) {
        self.due = match self.due {
            None => Some(DueFilter::Today),
            Some(DueFilter::Today) => Some(DueFilter::ThisWeek),
            Some(DueFilter::ThisWeek) => None,
        };
    }
}

/// Predicate evaluator bound to a point in time and a viewing time zone.
struct Matcher<Tz: TimeZone> {
    category: Option<Category>,
    due: Option<DueFilter>,
    needle: String,
    tz: Tz,
    today: NaiveDate,
    week: (NaiveDate, NaiveDate),
}

impl<Tz: TimeZone> Matcher<Tz> {
    fn new(criteria: &FilterCriteria, now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        Self {
            category: criteria.category,
            due: criteria.due,
            needle: criteria.search_needle(),
            tz: now.timezone(),
            today,
            week: start_end_of_this_week(today),
        }
    }

    fn matches(&self, task: &Task) -> bool {
        if let Some(c) = self.category {
            if task.category != c {
                return false;
            }
        }
        if let Some(df) = self.due {
            let due = local_date(&task.due_date, &self.tz);
            let hit = match df {
                DueFilter::Today => due == self.today,
                DueFilter::ThisWeek => due >= self.week.0 && due <= self.week.1,
            };
            if !hit {
                return false;
            }
        }
        self.needle.is_empty() || task.title.to_lowercase().contains(&self.needle)
    }
}

/// Filter and sort `tasks` as of `now`, evaluating calendar days in `now`'s zone.
///
/// Category, due-date and search predicates are ANDed. Sorting is by due date
/// in the requested direction and is stable for equal dates.
pub fn apply_at<Tz: TimeZone>(
    tasks: &[Task],
    criteria: &FilterCriteria,
    now: &DateTime<Tz>,
) -> Vec<Task> {
    let mut out: Vec<Task> = filter_at(tasks, criteria, now).cloned().collect();
    match criteria.sort {
        SortOrder::Asc => out.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        SortOrder::Desc => out.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
    }
    out
}

/// [`apply_at`] against the local clock.
pub fn apply(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    apply_at(tasks, criteria, &Local::now())
}

/// Unsorted filtered view, in the order of `tasks`.
pub fn filter_at<'t, Tz: TimeZone>(
    tasks: &'t [Task],
    criteria: &FilterCriteria,
    now: &DateTime<Tz>,
) -> impl Iterator<Item = &'t Task> {
    let matcher = Matcher::new(criteria, now);
    tasks.iter().filter(move |t| matcher.matches(t))
}

/// Grouped list display: the sorted, filtered view split per status.
///
/// Index `i` holds the tasks whose status is `Status::ALL[i]`.
pub fn partition_by_status_at<Tz: TimeZone>(
    tasks: &[Task],
    criteria: &FilterCriteria,
    now: &DateTime<Tz>,
) -> [Vec<Task>; 3] {
    let mut groups: [Vec<Task>; 3] = Default::default();
    for task in apply_at(tasks, criteria, now) {
        groups[task.status.index()].push(task);
    }
    groups
}

/// [`partition_by_status_at`] against the local clock.
pub fn partition_by_status(tasks: &[Task], criteria: &FilterCriteria) -> [Vec<Task>; 3] {
    partition_by_status_at(tasks, criteria, &Local::now())
}

/// The filtered tasks with one status, in the order of `tasks`.
pub fn with_status_at<'t, Tz: TimeZone>(
    tasks: &'t [Task],
    criteria: &FilterCriteria,
    status: Status,
    now: &DateTime<Tz>,
) -> impl Iterator<Item = &'t Task> {
    filter_at(tasks, criteria, now).filter(move |t| t.status == status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::task::TaskFields;
    use chrono::{Duration, FixedOffset, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn store_with(specs: &[(&str, Category, DateTime<Utc>, Status)]) -> TaskStore {
        let mut store = TaskStore::new();
        for (title, category, due, status) in specs {
            store.add(TaskFields::new(title, *category, *due, *status));
        }
        store
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn sample() -> TaskStore {
        store_with(&[
            ("Morning Workout", Category::Personal, at(2024, 12, 18, 7), Status::InProgress),
            ("Code Review", Category::Work, at(2024, 12, 18, 15), Status::InProgress),
            ("Client Presentation", Category::Work, at(2024, 12, 25, 9), Status::Completed),
            ("Interview", Category::Work, at(2024, 12, 19, 11), Status::ToDo),
            ("Grocery Shopping", Category::Personal, at(2024, 12, 16, 18), Status::ToDo),
        ])
    }

    #[test]
    fn category_filter_keeps_relative_order() {
        let store = sample();
        let criteria = FilterCriteria { category: Some(Category::Work), ..Default::default() };
        let got: Vec<&Task> = filter_at(store.list(), &criteria, &at(2024, 12, 18, 12)).collect();
        let expected: Vec<&Task> =
            store.list().iter().filter(|t| t.category == Category::Work).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn search_is_case_insensitive_substring_of_title() {
        let store = sample();
        let criteria = FilterCriteria { search: "SHOP".into(), ..Default::default() };
        let got = apply_at(store.list(), &criteria, &at(2024, 12, 18, 12));
        assert_eq!(titles(&got), vec!["Grocery Shopping"]);
    }

    #[test]
    fn search_ignores_surrounding_whitespace() {
        let store = sample();
        let now = at(2024, 12, 18, 12);
        let padded = FilterCriteria { search: "  shop ".into(), ..Default::default() };
        assert_eq!(titles(&apply_at(store.list(), &padded, &now)), vec!["Grocery Shopping"]);

        let blank = FilterCriteria { search: "   ".into(), ..Default::default() };
        assert!(blank.is_pass_through());
        assert_eq!(apply_at(store.list(), &blank, &now).len(), store.len());
    }

    #[test]
    fn today_compares_calendar_days_not_timestamps() {
        let store = sample();
        let criteria = FilterCriteria { due: Some(DueFilter::Today), ..Default::default() };
        let got = apply_at(store.list(), &criteria, &at(2024, 12, 18, 23));
        assert_eq!(titles(&got), vec!["Morning Workout", "Code Review"]);
    }

    #[test]
    fn today_uses_the_viewing_time_zone() {
        let store = sample();
        let criteria = FilterCriteria { due: Some(DueFilter::Today), ..Default::default() };
        // 02:00 on the 19th in UTC+10 is the 18th at 16:00 UTC.
        let tz = FixedOffset::east_opt(10 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 12, 19, 2, 0, 0).unwrap();
        let got = apply_at(store.list(), &criteria, &now);
        // Code Review (18th 15:00 UTC) is the 19th 01:00 local; Interview is the 19th 21:00 local.
        assert_eq!(titles(&got), vec!["Code Review", "Interview"]);
    }

    #[rstest]
    #[case::preceding_monday(at(2024, 12, 16, 9), true)]
    #[case::that_saturday(at(2024, 12, 21, 20), true)]
    #[case::following_monday(at(2024, 12, 23, 9), false)]
    fn this_week_boundary_for_a_saturday_deadline(
        #[case] now: DateTime<Utc>,
        #[case] included: bool,
    ) {
        let store = store_with(&[("Saturday", Category::Work, at(2024, 12, 21, 17), Status::ToDo)]);
        let criteria = FilterCriteria { due: Some(DueFilter::ThisWeek), ..Default::default() };
        let got = apply_at(store.list(), &criteria, &now);
        assert_eq!(got.len() == 1, included);
    }

    #[test]
    fn this_week_excludes_previous_saturday() {
        let store = store_with(&[("Last Sat", Category::Work, at(2024, 12, 14, 12), Status::ToDo)]);
        let criteria = FilterCriteria { due: Some(DueFilter::ThisWeek), ..Default::default() };
        assert!(apply_at(store.list(), &criteria, &at(2024, 12, 16, 9)).is_empty());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let store = sample();
        let criteria = FilterCriteria {
            category: Some(Category::Work),
            due: Some(DueFilter::ThisWeek),
            search: "e".into(),
            sort: SortOrder::Asc,
        };
        let got = apply_at(store.list(), &criteria, &at(2024, 12, 18, 12));
        assert_eq!(titles(&got), vec!["Code Review", "Interview"]);
    }

    #[test]
    fn sort_directions_and_double_toggle() {
        let store = sample();
        let now = at(2024, 12, 18, 12);
        let mut criteria = FilterCriteria::default();
        let asc = apply_at(store.list(), &criteria, &now);
        assert_eq!(
            titles(&asc),
            vec!["Grocery Shopping", "Morning Workout", "Code Review", "Interview", "Client Presentation"]
        );

        criteria.sort = criteria.sort.toggled();
        let desc = apply_at(store.list(), &criteria, &now);
        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);

        criteria.sort = criteria.sort.toggled();
        assert_eq!(apply_at(store.list(), &criteria, &now), asc);
    }

    #[test]
    fn equal_due_dates_keep_insertion_order_both_ways() {
        let due = at(2024, 12, 20, 9);
        let store = store_with(&[
            ("first", Category::Work, due, Status::ToDo),
            ("second", Category::Work, due + Duration::zero(), Status::ToDo),
            ("earlier", Category::Work, due - Duration::days(1), Status::ToDo),
        ]);
        let now = at(2024, 12, 18, 12);
        let asc = apply_at(store.list(), &FilterCriteria::default(), &now);
        assert_eq!(titles(&asc), vec!["earlier", "first", "second"]);
        let desc_criteria = FilterCriteria { sort: SortOrder::Desc, ..Default::default() };
        let desc = apply_at(store.list(), &desc_criteria, &now);
        assert_eq!(titles(&desc), vec!["first", "second", "earlier"]);
    }

    #[test]
    fn partition_covers_each_status_once() {
        let store = sample();
        let groups = partition_by_status_at(store.list(), &FilterCriteria::default(), &at(2024, 12, 18, 12));
        assert_eq!(titles(&groups[0]), vec!["Grocery Shopping", "Interview"]);
        assert_eq!(titles(&groups[1]), vec!["Morning Workout", "Code Review"]);
        assert_eq!(titles(&groups[2]), vec!["Client Presentation"]);
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), store.len());
    }

    #[test]
    fn criteria_cycles() {
        let mut c = FilterCriteria::default();
        assert!(c.is_pass_through());
        c.cycle_category();
        assert_eq!(c.category, Some(Category::Work));
        c.cycle_due();
        c.cycle_due();
        assert_eq!(c.due, Some(DueFilter::ThisWeek));
        c.cycle_due();
        c.cycle_category();
        c.cycle_category();
        assert!(c.is_pass_through());
    }
}
