//! Golden tests for the adherence aggregation.
//!
//! These tests pin the dashboard arithmetic and message strings against
//! known cases.

use chrono::NaiveDate;
use medtrack_core::adherence::{
    adherence_percent, resolve_daily_status, weekly_series, DaySummary,
};
use medtrack_core::models::{Medication, MedicationLog};

/// Percentage case from golden table.
struct PercentCase {
    id: &'static str,
    medication_count: usize,
    window_days: u32,
    taken_count: usize,
    expected: u8,
}

fn get_percent_cases() -> Vec<PercentCase> {
    vec![
        PercentCase {
            id: "no-medications",
            medication_count: 0,
            window_days: 7,
            taken_count: 0,
            expected: 0,
        },
        PercentCase {
            id: "no-medications-stray-logs",
            medication_count: 0,
            window_days: 7,
            taken_count: 5,
            expected: 0,
        },
        PercentCase {
            id: "zero-logs",
            medication_count: 3,
            window_days: 7,
            taken_count: 0,
            expected: 0,
        },
        PercentCase {
            id: "full-week-single-med",
            medication_count: 1,
            window_days: 7,
            taken_count: 7,
            expected: 100,
        },
        PercentCase {
            id: "full-week-three-meds",
            medication_count: 3,
            window_days: 7,
            taken_count: 21,
            expected: 100,
        },
        PercentCase {
            id: "ten-of-fourteen",
            medication_count: 2,
            window_days: 7,
            taken_count: 10,
            expected: 71,
        },
        PercentCase {
            id: "half-week",
            medication_count: 2,
            window_days: 7,
            taken_count: 7,
            expected: 50,
        },
        PercentCase {
            id: "one-of-three-rounds-down",
            medication_count: 3,
            window_days: 1,
            taken_count: 1,
            expected: 33,
        },
        PercentCase {
            id: "two-of-three-rounds-up",
            medication_count: 3,
            window_days: 1,
            taken_count: 2,
            expected: 67,
        },
        PercentCase {
            id: "zero-length-window",
            medication_count: 2,
            window_days: 0,
            taken_count: 0,
            expected: 0,
        },
    ]
}

#[test]
fn test_percent_golden_cases() {
    for case in get_percent_cases() {
        let got = adherence_percent(case.medication_count, case.window_days, case.taken_count);
        assert_eq!(
            got, case.expected,
            "case '{}': expected {}%, got {}%",
            case.id, case.expected, got
        );
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn med(name: &str) -> Medication {
    Medication::new("patient-1".into(), name.into(), "1 tablet".into())
}

#[test]
fn test_summary_messages() {
    let today = day(9);

    let status = resolve_daily_status(&[], &[], today);
    assert_eq!(status.summary.to_string(), "No medicines assigned yet.");

    let meds = vec![med("Aspirin"), med("Metformin")];
    let all_logs: Vec<_> = meds
        .iter()
        .map(|m| MedicationLog::new(m.id.clone(), today))
        .collect();
    let status = resolve_daily_status(&meds, &all_logs, today);
    assert_eq!(
        status.summary.to_string(),
        "Great job! All medicines taken today."
    );

    let one_log = vec![MedicationLog::new(meds[0].id.clone(), today)];
    let status = resolve_daily_status(&meds, &one_log, today);
    assert_eq!(status.summary, DaySummary::Missed(1));
    assert_eq!(status.summary.to_string(), "You missed 1 medicine(s) today.");
}

#[test]
fn test_weekly_series_shape() {
    let end = day(9);
    let logs = vec![
        MedicationLog::new("m1".into(), day(3)),
        MedicationLog::new("m1".into(), day(6)),
        MedicationLog::new("m2".into(), day(6)),
        MedicationLog::new("m1".into(), day(9)),
        MedicationLog::new("m1".into(), day(2)), // outside window
    ];

    let series = weekly_series(&logs, end);
    assert_eq!(series.len(), 7);

    let dates: Vec<_> = series.iter().map(|b| b.date).collect();
    assert_eq!(dates, (3..=9).map(day).collect::<Vec<_>>());

    let counts: Vec<_> = series.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 0, 0, 2, 0, 0, 1]);
}
