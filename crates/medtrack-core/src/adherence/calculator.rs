//! Adherence percentage calculation.

use super::TrailingWindow;
use crate::models::{Medication, MedicationLog};

/// Completion percentage for a trailing window:
/// `round(taken / (medications × days) × 100)`.
///
/// One log row per medication per day is full credit for that day,
/// regardless of how many schedule slots the medication carries. Zero
/// medications (or a zero-length window) is defined as 0, not a division
/// error. The store's one-row-per-key invariant keeps the result in 0-100.
pub fn adherence_percent(medication_count: usize, window_days: u32, taken_count: usize) -> u8 {
    let expected = medication_count as u64 * window_days as u64;
    if expected == 0 {
        return 0;
    }
    ((taken_count as f64 / expected as f64) * 100.0).round() as u8
}

/// Adherence over a window, counting only in-window log rows.
pub fn adherence_for_window(
    medications: &[Medication],
    logs: &[MedicationLog],
    window: &TrailingWindow,
) -> u8 {
    let taken = logs.iter().filter(|l| window.contains(l.taken_date)).count();
    adherence_percent(medications.len(), window.days(), taken)
}
