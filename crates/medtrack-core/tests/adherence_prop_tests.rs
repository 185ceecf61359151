//! Property tests for the adherence aggregation invariants.

use chrono::NaiveDate;
use proptest::prelude::*;

use medtrack_core::adherence::{
    adherence_percent, resolve_daily_status, weekly_series, DaySummary, TrailingWindow,
};
use medtrack_core::db::Database;
use medtrack_core::models::{Medication, MedicationLog, Patient, Profile};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

proptest! {
    /// With taken <= expected, the percentage stays within 0-100, and the
    /// two endpoints are exact.
    #[test]
    fn percent_bounds(meds in 0usize..20, days in 0u32..30, taken_frac in 0.0f64..=1.0) {
        let expected = meds as u64 * days as u64;
        let taken = (expected as f64 * taken_frac).floor() as usize;

        let pct = adherence_percent(meds, days, taken);
        prop_assert!(pct <= 100);

        if expected > 0 {
            prop_assert_eq!(adherence_percent(meds, days, 0), 0);
            prop_assert_eq!(adherence_percent(meds, days, expected as usize), 100);
        } else {
            prop_assert_eq!(pct, 0);
        }
    }

    /// The weekly series always has 7 chronological entries whose counts
    /// sum to the number of in-window logs.
    #[test]
    fn series_shape(offsets in proptest::collection::vec(0i64..20, 0..40)) {
        let end = day(25);
        let logs: Vec<MedicationLog> = offsets
            .iter()
            .map(|off| MedicationLog::new("m1".into(), end - chrono::Duration::days(*off)))
            .collect();

        let series = weekly_series(&logs, end);
        prop_assert_eq!(series.len(), 7);

        for pair in series.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }

        let window = TrailingWindow::ending(end);
        let in_window = logs.iter().filter(|l| window.contains(l.taken_date)).count() as u32;
        let total: u32 = series.iter().map(|b| b.count).sum();
        prop_assert_eq!(total, in_window);
    }

    /// Taken plus missed always accounts for every medication, and the
    /// empty set reports NoMedications regardless of log contents.
    #[test]
    fn status_partitions_medications(
        med_count in 0usize..10,
        taken_mask in proptest::collection::vec(any::<bool>(), 10),
    ) {
        let date = day(9);
        let meds: Vec<Medication> = (0..med_count)
            .map(|i| Medication::new("p1".into(), format!("Med {}", i), "1 tablet".into()))
            .collect();
        let logs: Vec<MedicationLog> = meds
            .iter()
            .zip(&taken_mask)
            .filter(|(_, taken)| **taken)
            .map(|(m, _)| MedicationLog::new(m.id.clone(), date))
            .collect();

        let status = resolve_daily_status(&meds, &logs, date);

        let taken_count = status.taken.values().filter(|t| **t).count() as u32;
        prop_assert_eq!(taken_count + status.missed_count, med_count as u32);

        if med_count == 0 {
            prop_assert_eq!(status.summary, DaySummary::NoMedications);
        } else if status.missed_count == 0 {
            prop_assert_eq!(status.summary, DaySummary::AllTaken);
        } else {
            prop_assert_eq!(status.summary, DaySummary::Missed(status.missed_count));
        }
    }

    /// Any toggle sequence on one (medication, date) key leaves the state
    /// matching the toggle parity and never more than one row.
    #[test]
    fn toggle_parity(toggles in 1usize..8) {
        let db = Database::open_in_memory().unwrap();
        db.ensure_profile(&Profile::new("identity-1".into())).unwrap();
        let patient = Patient::new("identity-1".into(), "Asha".into());
        db.insert_patient(&patient).unwrap();
        let med = Medication::new(patient.id.clone(), "Metformin".into(), "500mg".into());
        db.insert_medication(&med).unwrap();

        let date = day(9);
        let mut state = false;
        for _ in 0..toggles {
            state = db.toggle_taken(&med.id, date).unwrap();
        }

        prop_assert_eq!(state, toggles % 2 == 1);
        prop_assert_eq!(db.is_taken(&med.id, date).unwrap(), state);

        let rows = db.logs_on_date(&patient.id, date).unwrap();
        prop_assert_eq!(rows.len(), if state { 1 } else { 0 });
    }
}
