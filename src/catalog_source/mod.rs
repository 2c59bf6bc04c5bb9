pub mod error;
pub mod models;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use error::*;
use models::{Course, Session};

///
/// The authoritative upstream catalog. Calls may be slow or fail; callers
/// must not have mutated any stored state before a call returns successfully.
///
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogSource : Send + Sync {
    ///
    /// Gets the current, ordered course list for the term with the given `term_code`
    ///
    async fn fetch_courses(&self, term_code: &str) -> Result<Vec<Course>>;
    ///
    /// Gets the current, ordered session list for the course with the given `course_id`
    ///
    async fn fetch_sessions(&self, term_code: &str, course_id: &str) -> Result<Vec<Session>>;
}

///
/// Reads catalog snapshots left on disk by the scraper:
/// `<root>/<term_code>/courses.json` and `<root>/<term_code>/sessions/<course_id>.json`
///
pub struct JsonCatalogSource {
    root: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_snapshot<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T> {
        debug!(path = %path.display(), "reading catalog snapshot");
        let contents = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[async_trait]
impl CatalogSource for JsonCatalogSource {
    async fn fetch_courses(&self, term_code: &str) -> Result<Vec<Course>> {
        let path = self.root.join(term_code).join("courses.json");
        let courses: Vec<Course> = self.read_snapshot(path).await?;

        if let Some(course) = courses.iter().find(|c| c.term_code != term_code) {
            return Err(Error::ScopeMismatch {
                scope: term_code.to_string(),
                record: format!("{}/{}", course.term_code, course.course_id),
            });
        }
        Ok(courses)
    }
    async fn fetch_sessions(&self, term_code: &str, course_id: &str) -> Result<Vec<Session>> {
        let path = self.root.join(term_code).join("sessions").join(format!("{course_id}.json"));
        let sessions: Vec<Session> = self.read_snapshot(path).await?;

        if let Some(session) = sessions.iter().find(|s| s.term_code != term_code || s.course_id != course_id) {
            return Err(Error::ScopeMismatch {
                scope: format!("{term_code}/{course_id}"),
                record: format!("{}/{}/{}", session.term_code, session.course_id, session.session_id),
            });
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{error::Error, CatalogSource, JsonCatalogSource};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("catalog_sync_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("1244").join("sessions")).unwrap();
        dir
    }

    const COURSES: &str = r#"[
        {"termCode":"1244","courseId":"CS101","subjectCode":"CS","courseName":"CS 101",
         "fullCourseName":"COMPUTER SCIENCE 101","title":"Intro","description":"Basics"}
    ]"#;

    const SESSIONS: &str = r#"[
        {"termCode":"1244","courseId":"CS101","sessionId":"001","credit":3.0,
         "isAsynchronous":false,"onlineOnly":false,"meetings":[
            {"buildingName":"ENGR","room":"101","meetingDaysList":["M","W"],"meetingType":"LEC",
             "startTime":{"month":1,"day":22,"hour":9,"minute":0},
             "endTime":{"month":5,"day":3,"hour":9,"minute":50},
             "instructors":["Ada Lovelace"]}
        ]}
    ]"#;

    #[tokio::test]
    async fn test_reads_course_and_session_snapshots() {
        let dir = scratch_dir("read");
        std::fs::write(dir.join("1244").join("courses.json"), COURSES).unwrap();
        std::fs::write(dir.join("1244").join("sessions").join("CS101.json"), SESSIONS).unwrap();

        let source = JsonCatalogSource::new(&dir);
        let courses = source.fetch_courses("1244").await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_name, "CS 101");

        let sessions = source.fetch_sessions("1244", "CS101").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].meetings[0].meeting_days_list, vec!["M", "W"]);
        assert_eq!(sessions[0].meetings[0].end_time.minute, 50);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_an_error() {
        let dir = scratch_dir("missing");
        let source = JsonCatalogSource::new(&dir);
        assert!(matches!(source.fetch_courses("1244").await, Err(Error::ReadError(_))));
    }

    #[tokio::test]
    async fn test_rejects_records_from_other_scope() {
        let dir = scratch_dir("scope");
        std::fs::write(dir.join("1244").join("sessions").join("CS102.json"), SESSIONS).unwrap();

        let source = JsonCatalogSource::new(&dir);
        assert!(matches!(
            source.fetch_sessions("1244", "CS102").await,
            Err(Error::ScopeMismatch { .. })
        ));
    }
}
