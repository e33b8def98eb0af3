use crate::model::criteria::FilterCriteria;
use crate::model::row::CurriculumRow;

fn matches_search(search_lower: &str, row: &CurriculumRow) -> bool {
    search_lower.is_empty()
        || row.code.to_lowercase().contains(search_lower)
        || row.name.to_lowercase().contains(search_lower)
}

fn matches_exact(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

pub fn is_visible(criteria: &FilterCriteria, row: &CurriculumRow) -> bool {
    let search_lower = criteria.search_text.to_lowercase();
    row_matches(criteria, &search_lower, row)
}

fn row_matches(criteria: &FilterCriteria, search_lower: &str, row: &CurriculumRow) -> bool {
    matches_search(search_lower, row)
        && matches_exact(&criteria.school_level, &row.school)
        && matches_exact(&criteria.grade_level, &row.grade)
}

/// Visibility of each row, in input order.
pub fn filter(criteria: &FilterCriteria, rows: &[CurriculumRow]) -> Vec<bool> {
    if criteria.is_empty() {
        return vec![true; rows.len()];
    }

    // Lowercase once; rows are compared against the same needle.
    let search_lower = criteria.search_text.to_lowercase();

    rows.iter()
        .map(|row| row_matches(criteria, &search_lower, row))
        .collect()
}
