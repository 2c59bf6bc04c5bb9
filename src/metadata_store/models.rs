use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseListMetaData {
    pub term_code: String,
    pub hash: String,
    pub last_checked: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionListMetaData {
    pub term_code: String,
    pub course_id: String,
    pub hash: String,
}
