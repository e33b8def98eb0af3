#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CurriculumFilter,
    CurriculumAddSubject,
    CurriculumRemoveSubject,
    ConfigGet,
    ConfigSave,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "curriculum.filter" => Command::CurriculumFilter,
            "curriculum.add_subject" => Command::CurriculumAddSubject,
            "curriculum.remove_subject" => Command::CurriculumRemoveSubject,
            "config.get" => Command::ConfigGet,
            "config.save" => Command::ConfigSave,
            _ => Command::Unknown,
        }
    }
}
