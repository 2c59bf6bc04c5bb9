pub mod models;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

#[cfg(test)]
use mockall::automock;

use models::{CourseListMetaData, SessionListMetaData};
use crate::data_layer_error::*;

///
/// Persists the last known fingerprint of every synced scope:
/// one course list row per term, one session list row per course.
///
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetadataStore : Send + Sync {
    ///
    /// Gets the course list metadata for the term with the given `term_code`, if it was ever synced
    ///
    async fn get_course_list(&self, term_code: &str) -> Result<Option<CourseListMetaData>>;
    ///
    /// Creates the course list metadata row for a term synced for the first time
    ///
    async fn create_course_list(&self, term_code: &str, hash: &str, last_checked: NaiveDateTime) -> Result<()>;
    ///
    /// Updates the `hash` and `last_checked` of an existing course list metadata row
    ///
    async fn update_course_list(&self, term_code: &str, hash: &str, last_checked: NaiveDateTime) -> Result<()>;
    ///
    /// Gets all term codes that have course list metadata, in ascending order
    ///
    async fn list_terms(&self) -> Result<Vec<String>>;
    ///
    /// Gets the session list metadata for the given course, if its sessions were ever synced
    ///
    async fn get_session_list(&self, term_code: &str, course_id: &str) -> Result<Option<SessionListMetaData>>;
    ///
    /// Gets the ids of every course in the term that has a session list metadata row
    ///
    async fn list_session_list_course_ids(&self, term_code: &str) -> Result<HashSet<String>>;
    ///
    /// Creates the session list metadata row for a course synced for the first time
    ///
    async fn create_session_list(&self, term_code: &str, course_id: &str, hash: &str) -> Result<()>;
    ///
    /// Updates the `hash` of an existing session list metadata row
    ///
    async fn update_session_list(&self, term_code: &str, course_id: &str, hash: &str) -> Result<()>;
    ///
    /// Deletes the session list metadata row of a course removed upstream
    ///
    async fn delete_session_list(&self, term_code: &str, course_id: &str) -> Result<()>;
}

pub struct DbMetadataStore {
    db: SqlitePool,
}

impl DbMetadataStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for DbMetadataStore {
    async fn get_course_list(&self, term_code: &str) -> Result<Option<CourseListMetaData>> {
        Ok(sqlx::query_as!(CourseListMetaData,
            r#"SELECT term_code as "term_code!", hash as "hash!", last_checked as "last_checked!: NaiveDateTime"
            FROM course_list_meta WHERE term_code = ?"#, term_code
        )
            .fetch_optional(&self.db).await?)
    }
    async fn create_course_list(&self, term_code: &str, hash: &str, last_checked: NaiveDateTime) -> Result<()> {
        sqlx::query!("INSERT INTO course_list_meta (term_code, hash, last_checked) VALUES (?, ?, ?)",
            term_code, hash, last_checked
        )
            .execute(&self.db).await?;
        Ok(())
    }
    async fn update_course_list(&self, term_code: &str, hash: &str, last_checked: NaiveDateTime) -> Result<()> {
        sqlx::query!("UPDATE course_list_meta SET hash = ?, last_checked = ? WHERE term_code = ?",
            hash, last_checked, term_code
        )
            .execute(&self.db).await?;
        Ok(())
    }
    async fn list_terms(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar!(r#"SELECT term_code as "term_code!" FROM course_list_meta ORDER BY term_code"#)
            .fetch_all(&self.db).await?)
    }
    async fn get_session_list(&self, term_code: &str, course_id: &str) -> Result<Option<SessionListMetaData>> {
        Ok(sqlx::query_as!(SessionListMetaData,
            r#"SELECT term_code as "term_code!", course_id as "course_id!", hash as "hash!"
            FROM session_list_meta WHERE term_code = ? AND course_id = ?"#, term_code, course_id
        )
            .fetch_optional(&self.db).await?)
    }
    async fn list_session_list_course_ids(&self, term_code: &str) -> Result<HashSet<String>> {
        Ok(sqlx::query_scalar!(
            r#"SELECT course_id as "course_id!" FROM session_list_meta WHERE term_code = ?"#, term_code
        )
            .fetch_all(&self.db).await?
            .into_iter().collect())
    }
    async fn create_session_list(&self, term_code: &str, course_id: &str, hash: &str) -> Result<()> {
        sqlx::query!("INSERT INTO session_list_meta (term_code, course_id, hash) VALUES (?, ?, ?)",
            term_code, course_id, hash
        )
            .execute(&self.db).await?;
        Ok(())
    }
    async fn update_session_list(&self, term_code: &str, course_id: &str, hash: &str) -> Result<()> {
        sqlx::query!("UPDATE session_list_meta SET hash = ? WHERE term_code = ? AND course_id = ?",
            hash, term_code, course_id
        )
            .execute(&self.db).await?;
        Ok(())
    }
    async fn delete_session_list(&self, term_code: &str, course_id: &str) -> Result<()> {
        sqlx::query!("DELETE FROM session_list_meta WHERE term_code = ? AND course_id = ?",
            term_code, course_id
        )
            .execute(&self.db).await?;
        Ok(())
    }
}
