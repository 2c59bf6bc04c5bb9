use crate::catalog_source::models::{Course, Session};
use crate::data_layer_error::Result;

pub(super) struct CourseRow {
    pub term_code: String,
    pub course_id: String,
    pub subject_code: String,
    pub course_name: String,
    pub full_course_name: String,
    pub title: String,
    pub description: String,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            term_code: row.term_code,
            course_id: row.course_id,
            subject_code: row.subject_code,
            course_name: row.course_name,
            full_course_name: row.full_course_name,
            title: row.title,
            description: row.description,
        }
    }
}

pub(super) struct SessionRow {
    pub term_code: String,
    pub course_id: String,
    pub session_id: String,
    pub credit: f64,
    pub is_asynchronous: bool,
    pub online_only: bool,
    /// JSON encoded `Vec<Meeting>`
    pub meetings: String,
}

impl SessionRow {
    pub fn into_session(self) -> Result<Session> {
        Ok(Session {
            term_code: self.term_code,
            course_id: self.course_id,
            session_id: self.session_id,
            credit: self.credit,
            is_asynchronous: self.is_asynchronous,
            online_only: self.online_only,
            meetings: serde_json::from_str(&self.meetings)?,
        })
    }
}
