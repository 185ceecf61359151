//! Weekly chart series: per-day log counts over a trailing window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TrailingWindow;
use crate::models::MedicationLog;

/// One chart bucket: a calendar day and its log count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Bucket log rows per calendar day over a window. The result always has
/// exactly one entry per window day, oldest first; days without logs
/// appear with count 0 and out-of-window rows are ignored.
pub fn series_for_window(logs: &[MedicationLog], window: &TrailingWindow) -> Vec<DayCount> {
    window
        .dates()
        .map(|date| DayCount {
            date,
            count: logs.iter().filter(|l| l.taken_date == date).count() as u32,
        })
        .collect()
}

/// The 7-day series ending at `end` (including `end` itself).
pub fn weekly_series(logs: &[MedicationLog], end: NaiveDate) -> Vec<DayCount> {
    series_for_window(logs, &TrailingWindow::ending(end))
}
