mod models;

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use tokio_stream::{Stream, StreamExt};

#[cfg(test)]
use mockall::automock;

use models::{CourseRow, SessionRow};
use crate::catalog_source::models::{Course, Session};
use crate::data_layer_error::*;

///
/// The persisted copy of the catalog. Course lists are scoped by term,
/// session lists by (term, course).
///
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore : Send + Sync {
    ///
    /// Gets the ids of every course stored for the term with the given `term_code`
    ///
    async fn list_course_ids(&self, term_code: &str) -> Result<HashSet<String>>;
    ///
    /// Gets the ids of every course that still owns at least one session in the term
    ///
    async fn list_session_course_ids(&self, term_code: &str) -> Result<HashSet<String>>;
    ///
    /// Deletes every course in the term and inserts `courses` in their place,
    /// as a single transaction
    ///
    async fn replace_courses(&self, term_code: &str, courses: &[Course]) -> Result<()>;
    ///
    /// Deletes every session of the course and inserts `sessions` in their place,
    /// as a single transaction
    ///
    async fn replace_sessions(&self, term_code: &str, course_id: &str, sessions: &[Session]) -> Result<()>;
    ///
    /// Deletes every session of the course with the given `course_id`
    ///
    async fn delete_sessions(&self, term_code: &str, course_id: &str) -> Result<()>;
    ///
    /// Gets every course of the term, in upstream order
    ///
    async fn get_courses(&self, term_code: &str) -> Result<Vec<Course>>;
    ///
    /// Gets the first course of the term with the given display name, e.g. "CS 101"
    ///
    async fn find_course(&self, term_code: &str, course_name: &str) -> Result<Option<Course>>;
    ///
    /// Gets every session of the course, in upstream order
    ///
    async fn get_sessions(&self, term_code: &str, course_id: &str) -> Result<Vec<Session>>;
}

pub struct DbRecordStore {
    db: SqlitePool,
}

impl DbRecordStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for DbRecordStore {
    async fn list_course_ids(&self, term_code: &str) -> Result<HashSet<String>> {
        collect_ids(sqlx::query_scalar!(
            r#"SELECT course_id as "course_id!" FROM courses WHERE term_code = ?"#, term_code
        )
            .fetch(&self.db)).await
    }
    async fn list_session_course_ids(&self, term_code: &str) -> Result<HashSet<String>> {
        collect_ids(sqlx::query_scalar!(
            r#"SELECT DISTINCT course_id as "course_id!" FROM sessions WHERE term_code = ?"#, term_code
        )
            .fetch(&self.db)).await
    }
    async fn replace_courses(&self, term_code: &str, courses: &[Course]) -> Result<()> {
        let mut tx = self.db.begin().await?;
        delete_all_courses(&mut *tx, term_code).await?;
        create_many_courses(&mut *tx, courses).await?;
        tx.commit().await?;
        Ok(())
    }
    async fn replace_sessions(&self, term_code: &str, course_id: &str, sessions: &[Session]) -> Result<()> {
        let mut tx = self.db.begin().await?;
        delete_all_sessions(&mut *tx, term_code, course_id).await?;
        create_many_sessions(&mut *tx, sessions).await?;
        tx.commit().await?;
        Ok(())
    }
    async fn delete_sessions(&self, term_code: &str, course_id: &str) -> Result<()> {
        let mut conn = self.db.acquire().await?;
        delete_all_sessions(&mut *conn, term_code, course_id).await
    }
    async fn get_courses(&self, term_code: &str) -> Result<Vec<Course>> {
        Ok(sqlx::query_as!(CourseRow, r#"
            SELECT term_code as "term_code!", course_id as "course_id!", subject_code as "subject_code!",
                course_name as "course_name!", full_course_name as "full_course_name!",
                title as "title!", description as "description!"
            FROM courses WHERE term_code = ? ORDER BY position
            "#, term_code
        )
            .fetch_all(&self.db).await?
            .into_iter().map(Course::from).collect())
    }
    async fn find_course(&self, term_code: &str, course_name: &str) -> Result<Option<Course>> {
        Ok(sqlx::query_as!(CourseRow, r#"
            SELECT term_code as "term_code!", course_id as "course_id!", subject_code as "subject_code!",
                course_name as "course_name!", full_course_name as "full_course_name!",
                title as "title!", description as "description!"
            FROM courses WHERE term_code = ? AND course_name = ? ORDER BY position LIMIT 1
            "#, term_code, course_name
        )
            .fetch_optional(&self.db).await?
            .map(Course::from))
    }
    async fn get_sessions(&self, term_code: &str, course_id: &str) -> Result<Vec<Session>> {
        sqlx::query_as!(SessionRow, r#"
            SELECT term_code as "term_code!", course_id as "course_id!", session_id as "session_id!",
                credit as "credit!: f64", is_asynchronous as "is_asynchronous!: bool",
                online_only as "online_only!: bool", meetings as "meetings!"
            FROM sessions WHERE term_code = ? AND course_id = ? ORDER BY position
            "#, term_code, course_id
        )
            .fetch_all(&self.db).await?
            .into_iter().map(SessionRow::into_session).collect()
    }
}

async fn collect_ids(
    mut rows: impl Stream<Item = std::result::Result<String, sqlx::Error>> + Unpin
) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    while let Some(id) = rows.next().await {
        ids.insert(id?);
    }
    Ok(ids)
}

async fn delete_all_courses(conn: &mut SqliteConnection, term_code: &str) -> Result<()> {
    sqlx::query!("DELETE FROM courses WHERE term_code = ?", term_code)
        .execute(&mut *conn).await?;
    Ok(())
}

async fn create_many_courses(conn: &mut SqliteConnection, courses: &[Course]) -> Result<()> {
    for (position, course) in courses.iter().enumerate() {
        let position = position as i64;
        sqlx::query!(
            "INSERT INTO courses (term_code, course_id, position, subject_code, course_name, full_course_name, title, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            course.term_code, course.course_id, position,
            course.subject_code, course.course_name, course.full_course_name,
            course.title, course.description
        )
            .execute(&mut *conn).await?;
    }
    Ok(())
}

async fn delete_all_sessions(conn: &mut SqliteConnection, term_code: &str, course_id: &str) -> Result<()> {
    sqlx::query!("DELETE FROM sessions WHERE term_code = ? AND course_id = ?", term_code, course_id)
        .execute(&mut *conn).await?;
    Ok(())
}

async fn create_many_sessions(conn: &mut SqliteConnection, sessions: &[Session]) -> Result<()> {
    for (position, session) in sessions.iter().enumerate() {
        let position = position as i64;
        let meetings = serde_json::to_string(&session.meetings)?;
        sqlx::query!(
            "INSERT INTO sessions (term_code, course_id, session_id, position, credit, is_asynchronous, online_only, meetings)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            session.term_code, session.course_id, session.session_id, position,
            session.credit, session.is_asynchronous, session.online_only, meetings
        )
            .execute(&mut *conn).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{DbRecordStore, RecordStore};
    use crate::catalog_source::models::{Course, Meeting, MeetingTime, Session};
    use crate::data_layer_error::test_pool;

    fn course(term_code: &str, course_id: &str) -> Course {
        Course {
            term_code: term_code.to_string(),
            course_id: course_id.to_string(),
            subject_code: "CS".to_string(),
            course_name: format!("CS {course_id}"),
            full_course_name: format!("COMPUTER SCIENCE {course_id}"),
            title: "Title".to_string(),
            description: "Description".to_string(),
        }
    }

    fn session(term_code: &str, course_id: &str, session_id: &str) -> Session {
        Session {
            term_code: term_code.to_string(),
            course_id: course_id.to_string(),
            session_id: session_id.to_string(),
            credit: 4.0,
            is_asynchronous: false,
            online_only: true,
            meetings: vec![Meeting {
                building_name: None,
                room: None,
                meeting_days_list: vec!["Tu".to_string(), "Th".to_string()],
                meeting_type: "LEC".to_string(),
                start_time: MeetingTime { month: 1, day: 22, hour: 14, minute: 0 },
                end_time: MeetingTime { month: 5, day: 3, hour: 15, minute: 15 },
                instructors: vec!["Grace Hopper".to_string()],
            }],
        }
    }

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_replace_courses_swaps_whole_term() {
        let store = DbRecordStore::new(test_pool().await);
        store.replace_courses("1244", &[course("1244", "A"), course("1244", "B")]).await.unwrap();
        store.replace_courses("1252", &[course("1252", "A")]).await.unwrap();

        store.replace_courses("1244", &[course("1244", "C"), course("1244", "A")]).await.unwrap();

        assert_eq!(store.list_course_ids("1244").await.unwrap(), ids(&["A", "C"]));
        assert_eq!(store.list_course_ids("1252").await.unwrap(), ids(&["A"]));
        let ordered: Vec<String> = store.get_courses("1244").await.unwrap()
            .into_iter().map(|c| c.course_id).collect();
        assert_eq!(ordered, vec!["C", "A"]);
    }

    #[tokio::test]
    async fn test_replace_sessions_round_trips_meetings() {
        let store = DbRecordStore::new(test_pool().await);
        let sessions = vec![session("1244", "A", "002"), session("1244", "A", "001")];
        store.replace_sessions("1244", "A", &sessions).await.unwrap();

        assert_eq!(store.get_sessions("1244", "A").await.unwrap(), sessions);

        store.replace_sessions("1244", "A", &[session("1244", "A", "003")]).await.unwrap();
        let stored = store.get_sessions("1244", "A").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].session_id, "003");
    }

    #[tokio::test]
    async fn test_delete_sessions_is_scoped_to_course() {
        let store = DbRecordStore::new(test_pool().await);
        store.replace_sessions("1244", "A", &[session("1244", "A", "001")]).await.unwrap();
        store.replace_sessions("1244", "B", &[session("1244", "B", "001")]).await.unwrap();
        store.replace_sessions("1252", "A", &[session("1252", "A", "001")]).await.unwrap();

        store.delete_sessions("1244", "A").await.unwrap();

        assert!(store.get_sessions("1244", "A").await.unwrap().is_empty());
        assert_eq!(store.list_session_course_ids("1244").await.unwrap(), ids(&["B"]));
        assert_eq!(store.list_session_course_ids("1252").await.unwrap(), ids(&["A"]));
    }

    #[tokio::test]
    async fn test_find_course_by_name() {
        let store = DbRecordStore::new(test_pool().await);
        store.replace_courses("1244", &[course("1244", "101"), course("1244", "102")]).await.unwrap();

        let found = store.find_course("1244", "CS 102").await.unwrap().unwrap();
        assert_eq!(found.course_id, "102");
        assert!(store.find_course("1244", "CS 999").await.unwrap().is_none());
    }
}
