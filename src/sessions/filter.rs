use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

use super::Session;

pub const MS_PER_DAY: i64 = 86_400_000;

/// The time window a view selects sessions by.
///
/// An immutable value replaced wholesale on each user interaction; the
/// filter itself never mutates the source collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterWindow {
    /// The last N days relative to now, keyed on creation timestamps.
    Rolling { days: i64 },
    /// An inclusive local-time date range. A missing bound fails open.
    Explicit {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl Default for FilterWindow {
    fn default() -> Self {
        Self::Rolling { days: 7 }
    }
}

/// Select the sessions inside the window, preserving relative order.
pub fn filter_by_window(
    sessions: &[Session],
    window: &FilterWindow,
    now: DateTime<Utc>,
) -> Vec<Session> {
    match window {
        FilterWindow::Rolling { days } => {
            let cutoff = now.timestamp_millis() - days * MS_PER_DAY;
            sessions
                .iter()
                .filter(|session| session.id >= cutoff)
                .cloned()
                .collect()
        }
        FilterWindow::Explicit {
            start: Some(start),
            end: Some(end),
        } => {
            let window_start = start.and_time(NaiveTime::MIN);
            let window_end = end.and_time(
                NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time of day"),
            );
            sessions
                .iter()
                .filter(|session| {
                    let local = session.date.with_timezone(&Local).naive_local();
                    local >= window_start && local <= window_end
                })
                .cloned()
                .collect()
        }
        // A half-set custom range fails open rather than hiding everything.
        FilterWindow::Explicit { .. } => sessions.to_vec(),
    }
}
