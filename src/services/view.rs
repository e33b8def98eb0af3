use crate::model::criteria::FilterCriteria;
use crate::model::row::CurriculumRow;
use crate::services::filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    SearchKeyUp,
    SchoolLevelChanged,
    GradeLevelChanged,
    Unknown,
}

impl From<&str> for FilterEvent {
    fn from(s: &str) -> Self {
        match s {
            "search_keyup" => FilterEvent::SearchKeyUp,
            "school_level_changed" => FilterEvent::SchoolLevelChanged,
            "grade_level_changed" => FilterEvent::GradeLevelChanged,
            _ => FilterEvent::Unknown,
        }
    }
}

/// Read side of the page: current values of the filter inputs.
/// `None` means the control is not present at all.
pub trait FilterControls {
    fn search_text(&self) -> Option<String>;
    fn school_level(&self) -> Option<String>;
    fn grade_level(&self) -> Option<String>;
}

/// Write side of the page: per-row display state.
pub trait RowDisplay {
    fn set_visible(&mut self, index: usize, visible: bool);
}

pub fn criteria_from_controls(controls: &dyn FilterControls) -> FilterCriteria {
    FilterCriteria {
        search_text: controls.search_text().unwrap_or_default(),
        school_level: controls.school_level().unwrap_or_default(),
        grade_level: controls.grade_level().unwrap_or_default(),
    }
}

/// Re-evaluates every row and pushes its display state. All events share
/// the same handling; the event only says which control moved.
pub fn on_filter_event(
    _event: FilterEvent,
    controls: &dyn FilterControls,
    rows: &[CurriculumRow],
    display: &mut dyn RowDisplay,
) {
    let criteria = criteria_from_controls(controls);

    for (i, visible) in filter::filter(&criteria, rows).into_iter().enumerate() {
        display.set_visible(i, visible);
    }
}
