use serde::Deserialize;

/// Snapshot of the filter controls. Empty fields impose no constraint.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    #[serde(default, alias = "search")]
    pub search_text: String,

    #[serde(default)]
    pub school_level: String,

    #[serde(default)]
    pub grade_level: String,
}

impl FilterCriteria {
    pub fn new(
        search_text: impl Into<String>,
        school_level: impl Into<String>,
        grade_level: impl Into<String>,
    ) -> Self {
        Self {
            search_text: search_text.into(),
            school_level: school_level.into(),
            grade_level: grade_level.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty() && self.school_level.is_empty() && self.grade_level.is_empty()
    }
}
