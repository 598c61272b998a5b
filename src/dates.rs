//! Due-date parsing, calendar helpers and display formatting.
//!
//! Due dates are stored as absolute UTC timestamps. Calendar questions such as
//! "is this due today" are answered in the viewer's time zone, so every helper
//! here takes the relevant zone or local date explicitly.

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, TimeZone, Utc, Weekday,
};

use crate::error::DueParseError;

/// Parse human-readable due input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - weekday names ("friday", "fri", "next friday")
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
/// - a full RFC 3339 timestamp
///
/// Date-only input resolves to midnight in `tz`.
pub fn parse_due_input_at<Tz: TimeZone>(
    s: &str,
    today: NaiveDate,
    tz: &Tz,
) -> Result<DateTime<Utc>, DueParseError> {
    let raw = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = parse_due_date(&raw.to_lowercase(), today)
        .ok_or_else(|| DueParseError(raw.to_string()))?;
    start_of_day(date, tz).ok_or_else(|| DueParseError(raw.to_string()))
}

/// [`parse_due_input_at`] against the local clock and zone.
pub fn parse_due_input(s: &str) -> Result<DateTime<Utc>, DueParseError> {
    parse_due_input_at(s, Local::now().date_naive(), &Local)
}

fn parse_due_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    match s {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Duration::try_days(n).and_then(|d| today.checked_add_signed(d));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Duration::try_weeks(n).and_then(|d| today.checked_add_signed(d));
        }
    }

    let (next, name) = match s.strip_prefix("next ") {
        Some(name) => (true, name),
        None => (false, s),
    };
    if let Ok(target) = name.parse::<Weekday>() {
        let current = today.weekday().num_days_from_monday() as i64;
        let wanted = target.num_days_from_monday() as i64;
        let mut ahead = (wanted - current).rem_euclid(7);
        if next {
            ahead += 7;
        }
        return today.checked_add_signed(Duration::days(ahead));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Midnight of `date` in `tz`, as UTC. Falls forward over a DST gap.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|t| t.with_timezone(&Utc)),
    }
}

/// Calendar date of a UTC timestamp as seen in `tz`.
pub fn local_date<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// Sunday-to-Saturday calendar week containing `today`, inclusive on both ends.
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let since_sunday = today.weekday().num_days_from_sunday() as i64;
    let start = today - Duration::days(since_sunday);
    (start, start + Duration::days(6))
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

/// Short absolute date, e.g. "25 Dec, 2024".
pub fn format_due_short(due: NaiveDate) -> String {
    due.format("%d %b, %Y").to_string()
}
