use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub term_code: String,
    pub course_id: String,
    pub subject_code: String,
    pub course_name: String,
    pub full_course_name: String,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub term_code: String,
    pub course_id: String,
    pub session_id: String,
    pub credit: f64,
    pub is_asynchronous: bool,
    pub online_only: bool,
    pub meetings: Vec<Meeting>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub building_name: Option<String>,
    pub room: Option<String>,
    pub meeting_days_list: Vec<String>,
    pub meeting_type: String,
    pub start_time: MeetingTime,
    pub end_time: MeetingTime,
    pub instructors: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}
