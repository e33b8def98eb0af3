use serde::Deserialize;

/// One curriculum entry as rendered in the listing.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CurriculumRow {
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "school_level")]
    pub school: String,

    #[serde(default, alias = "grade_level")]
    pub grade: String,
}
