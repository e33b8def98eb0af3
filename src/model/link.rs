#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurriculumSubjectLink {
    pub curriculum_id: u64,
    pub subject_id: u64,
}

impl CurriculumSubjectLink {
    pub fn new(curriculum_id: u64, subject_id: u64) -> Self {
        Self {
            curriculum_id,
            subject_id,
        }
    }

    pub fn add_path(&self) -> String {
        format!("/curriculum/{}/add-subject", self.curriculum_id)
    }

    pub fn remove_path(&self) -> String {
        format!(
            "/curriculum/{}/remove-subject/{}",
            self.curriculum_id, self.subject_id
        )
    }
}
