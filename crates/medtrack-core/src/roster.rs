//! Caretaker roster: patient-name search, pagination, and the assignment
//! flow around the store's guarded claim.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::db::{ClaimOutcome, Database, DbResult, MedicationWithPatient};
use crate::models::Patient;

/// Rows shown per roster page.
pub const ROWS_PER_PAGE: usize = 6;

/// Minimum similarity for a non-substring match.
const MIN_NAME_SIMILARITY: f64 = 0.75;

/// Name match quality: best of Jaro-Winkler and normalized Levenshtein,
/// case-insensitive.
fn name_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let jw = jaro_winkler(&a, &b);
    let lev = normalized_levenshtein(&a, &b);
    jw.max(lev)
}

/// Filter roster rows by patient name. Substring matches always qualify;
/// near-misses qualify above [`MIN_NAME_SIMILARITY`]. Results are ranked
/// best match first; an empty query returns all rows unranked.
pub fn filter_by_patient_name(
    rows: &[MedicationWithPatient],
    query: &str,
) -> Vec<MedicationWithPatient> {
    let query = query.trim();
    if query.is_empty() {
        return rows.to_vec();
    }

    let query_lower = query.to_lowercase();
    let mut scored: Vec<(f64, &MedicationWithPatient)> = rows
        .iter()
        .filter_map(|row| {
            if row.patient_name.to_lowercase().contains(&query_lower) {
                return Some((1.0, row));
            }
            let sim = name_similarity(&row.patient_name, query);
            (sim >= MIN_NAME_SIMILARITY).then_some((sim, row))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, row)| row.clone()).collect()
}

/// One page of a client-side paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// 1-based page number actually returned
    pub page: usize,
    /// Total page count (at least 1)
    pub total_pages: usize,
    /// Total row count across all pages
    pub total_rows: usize,
}

/// Slice a filtered list into fixed-size pages. Out-of-range page numbers
/// clamp to the nearest valid page.
pub fn paginate<T: Clone>(rows: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let first = (page - 1) * per_page;
    let last = (first + per_page).min(total_rows);
    let items = if first < total_rows {
        rows[first..last].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items,
        page,
        total_pages,
        total_rows,
    }
}

/// The two patient lists a caretaker works from.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterLists {
    /// Patients no caretaker has claimed
    pub unassigned: Vec<Patient>,
    /// Patients claimed by this caretaker
    pub assigned: Vec<Patient>,
}

/// Fetch both lists fresh from the store.
pub fn refresh_lists(db: &Database, caretaker_id: &str) -> DbResult<RosterLists> {
    Ok(RosterLists {
        unassigned: db.list_unassigned_patients()?,
        assigned: db.list_patients_for_caretaker(caretaker_id)?,
    })
}

/// Attempt to claim a patient and refresh both lists, whatever the
/// outcome. A lost race shows up as `AlreadyAssigned` with the patient
/// absent from the unassigned list.
pub fn claim_patient(
    db: &Database,
    patient_id: &str,
    caretaker_id: &str,
) -> DbResult<(ClaimOutcome, RosterLists)> {
    let outcome = db.claim_for_caretaker(patient_id, caretaker_id)?;
    let lists = refresh_lists(db, caretaker_id)?;
    Ok((outcome, lists))
}
