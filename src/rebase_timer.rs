//! Countdown to the next rebase, derived from the app slice.

use crate::store::AppState;
use chrono::{SecondsFormat, TimeZone, Utc};

/// Seconds between two chain timestamps. Negative once `end` has passed.
/// Saturates at the `i64` range.
pub fn seconds_until_block(start: u64, end: u64) -> i64 {
    let diff = i128::from(end) - i128::from(start);
    diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn plural(n: i64, one: &str, many: &str) -> String {
    format!("{}{}", n, if n == 1 { one } else { many })
}

/// Render a duration as e.g. `"1 day, 2 hrs, 5 mins"`. Zero components are
/// left out, so anything under a minute (or negative) renders as `""`.
pub fn prettify_seconds(seconds: i64) -> String {
    if seconds <= 0 {
        return String::new();
    }
    let d = seconds / (3600 * 24);
    let h = (seconds % (3600 * 24)) / 3600;
    let m = (seconds % 3600) / 60;

    let mut parts = Vec::new();
    if d > 0 {
        parts.push(plural(d, " day", " days"));
    }
    if h > 0 {
        parts.push(plural(h, " hr", " hrs"));
    }
    if m > 0 {
        parts.push(plural(m, " min", " mins"));
    }
    parts.join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseTimerView {
    /// The current block time is not known yet.
    Loading,
    /// Time left until the next rebase.
    Countdown(String),
    /// Less than a minute left, or the epoch has already ended.
    Rebasing,
}

impl std::fmt::Display for RebaseTimerView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebaseTimerView::Loading => write!(f, "..."),
            RebaseTimerView::Countdown(left) => write!(f, "{} to Next Rebase", left),
            RebaseTimerView::Rebasing => write!(f, "Rebasing"),
        }
    }
}

pub fn rebase_timer_view(app: &AppState) -> RebaseTimerView {
    let current = match app.current_block_time {
        Some(t) if t > 0 => t,
        _ => return RebaseTimerView::Loading,
    };
    match app.next_rebase {
        Some(next) if next > 0 => {
            let left = prettify_seconds(seconds_until_block(current, next));
            if left.is_empty() {
                RebaseTimerView::Rebasing
            } else {
                RebaseTimerView::Countdown(left)
            }
        }
        _ => RebaseTimerView::Rebasing,
    }
}

/// RFC 3339 rendering of a chain timestamp.
pub fn format_timestamp(seconds: u64) -> Option<String> {
    let seconds = i64::try_from(seconds).ok()?;
    Utc.timestamp_opt(seconds, 0).single().map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}
