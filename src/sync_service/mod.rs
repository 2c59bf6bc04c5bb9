pub mod error;
pub mod lease;
pub mod rate_limiter;

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use error::*;
use lease::{SyncLease, SyncLeases};
use rate_limiter::RateLimiter;

use crate::{
    catalog_source::{models::Course, CatalogSource},
    hash_svc::fingerprint_records,
    metadata_store::{models::CourseListMetaData, MetadataStore},
    record_store::RecordStore,
    time_provider::{elapsed_hours, TimeProvider},
};

#[derive(Clone, Debug)]
pub struct SyncSettings {
    /// Minimum age of a course list before a non-forced sync may re-crawl it
    pub staleness_hours: f64,
    /// Number of courses processed between two pauses
    pub pause_every: usize,
    pub pause: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self { staleness_hours: 12.0, pause_every: 10, pause: Duration::from_secs(1) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseListOutcome {
    /// First sync of the term
    Created,
    /// Fingerprint differed, courses were replaced
    Changed,
    /// Fingerprint matched, only `last_checked` was refreshed
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionListOutcome {
    Updated,
    Unchanged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncReport {
    pub term_code: String,
    pub course_list: CourseListOutcome,
    pub courses_removed: usize,
    pub sessions_updated: usize,
    pub sessions_skipped: usize,
    pub sessions_failed: usize,
    pub pauses: usize,
}

///
/// A synchronization running as a detached task
///
pub struct SyncHandle {
    term_code: String,
    handle: JoinHandle<Result<SyncReport>>,
}

impl SyncHandle {
    pub fn term_code(&self) -> &str {
        &self.term_code
    }
    ///
    /// Cancels the run. Scopes already written stay written, the
    /// interrupted scope is redone by the next run.
    ///
    pub fn abort(&self) {
        self.handle.abort();
    }
    pub async fn wait(self) -> Result<SyncReport> {
        self.handle.await?
    }
}

/// A request that passed the lease and the staleness gate
struct Admission {
    lease: SyncLease,
    now: NaiveDateTime,
    previous: Option<CourseListMetaData>,
}

///
/// Keeps the stored catalog of a term eventually consistent with the
/// `CatalogSource`, rewriting only the scopes whose fingerprint changed.
///
pub struct CatalogSyncService {
    catalog: Arc<dyn CatalogSource>,
    metadata: Arc<dyn MetadataStore>,
    records: Arc<dyn RecordStore>,
    time_provider: Arc<dyn TimeProvider>,
    leases: SyncLeases,
    settings: SyncSettings,
}

impl CatalogSyncService {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        metadata: Arc<dyn MetadataStore>,
        records: Arc<dyn RecordStore>,
        time_provider: Arc<dyn TimeProvider>,
        settings: SyncSettings,
    ) -> Self {
        Self { catalog, metadata, records, time_provider, leases: SyncLeases::new(), settings }
    }

    ///
    /// Accepts a synchronization of `term_code` and runs it as a detached task.
    /// Conflicts (a fresh course list without `force_update`, or a run already
    /// in flight for the term) are returned before anything is fetched.
    ///
    pub async fn synchronize(self: &Arc<Self>, term_code: &str, force_update: bool) -> Result<SyncHandle> {
        let admission = self.admit(term_code, force_update).await?;

        let svc = Arc::clone(self);
        let task_term = term_code.to_string();
        let handle = tokio::spawn(async move {
            let result = svc.run(&task_term, admission).await;
            if let Err(e) = &result {
                error!(term_code = %task_term, error = %e, "catalog synchronization failed");
            }
            result
        });

        info!(term_code, force_update, "catalog synchronization accepted");
        Ok(SyncHandle { term_code: term_code.to_string(), handle })
    }

    ///
    /// Same as `synchronize`, but runs to completion on the caller's task
    ///
    pub async fn sync_now(&self, term_code: &str, force_update: bool) -> Result<SyncReport> {
        let admission = self.admit(term_code, force_update).await?;
        self.run(term_code, admission).await
    }

    async fn admit(&self, term_code: &str, force_update: bool) -> Result<Admission> {
        let lease = self.leases.acquire(term_code)
            .ok_or_else(|| Error::InProgress { term_code: term_code.to_string() })?;

        let now = self.time_provider.naive_utc_now();
        let previous = self.metadata.get_course_list(term_code).await?;
        if let (Some(meta), false) = (&previous, force_update) {
            let hours_since_check = elapsed_hours(meta.last_checked, now);
            if hours_since_check < self.settings.staleness_hours {
                debug!(term_code, hours_since_check, "course list is still fresh");
                return Err(Error::Stale { term_code: term_code.to_string(), hours_since_check });
            }
        }

        Ok(Admission { lease, now, previous })
    }

    async fn run(&self, term_code: &str, admission: Admission) -> Result<SyncReport> {
        // Held until every course of the term has been processed
        let Admission { lease: _lease, now, previous } = admission;

        let (course_list, courses, courses_removed) =
            self.sync_course_list(term_code, previous, now).await?;

        let mut report = SyncReport {
            term_code: term_code.to_string(),
            course_list,
            courses_removed,
            sessions_updated: 0,
            sessions_skipped: 0,
            sessions_failed: 0,
            pauses: 0,
        };

        let mut limiter = RateLimiter::new(self.settings.pause_every, self.settings.pause);
        for course in &courses {
            match self.sync_session_list(term_code, &course.course_id).await {
                Ok(SessionListOutcome::Updated) => report.sessions_updated += 1,
                Ok(SessionListOutcome::Unchanged) => report.sessions_skipped += 1,
                Err(e) => {
                    warn!(term_code, course_id = %course.course_id, error = %e, "session list sync failed");
                    report.sessions_failed += 1;
                }
            }
            limiter.tick().await;
        }
        report.pauses = limiter.pauses();

        info!(
            term_code,
            course_list = ?report.course_list,
            courses = courses.len(),
            courses_removed = report.courses_removed,
            sessions_updated = report.sessions_updated,
            sessions_skipped = report.sessions_skipped,
            sessions_failed = report.sessions_failed,
            "catalog synchronization finished"
        );
        Ok(report)
    }

    ///
    /// Fetches the course list of the term and replaces the stored one if its
    /// fingerprint changed. Returns the outcome, the fetched courses, and the
    /// number of courses whose sessions were cascade-deleted.
    ///
    async fn sync_course_list(
        &self,
        term_code: &str,
        previous: Option<CourseListMetaData>,
        now: NaiveDateTime,
    ) -> Result<(CourseListOutcome, Vec<Course>, usize)> {
        let courses = self.catalog.fetch_courses(term_code).await?;
        let hash = fingerprint_records(&[term_code, term_code], &courses)?;

        if let Some(meta) = &previous {
            if meta.hash == hash {
                debug!(term_code, "course list unchanged");
                self.metadata.update_course_list(term_code, &hash, now).await?;
                return Ok((CourseListOutcome::Unchanged, courses, 0));
            }
        }

        // Courses that owned sessions before this run but are gone upstream.
        // Courses still holding sessions or session metadata are included so that
        // a sweep interrupted by an earlier failure is finished here.
        let fetched_ids: HashSet<&str> = courses.iter().map(|c| c.course_id.as_str()).collect();
        let mut removed_ids = self.records.list_course_ids(term_code).await?;
        removed_ids.extend(self.records.list_session_course_ids(term_code).await?);
        removed_ids.extend(self.metadata.list_session_list_course_ids(term_code).await?);
        removed_ids.retain(|id| !fetched_ids.contains(id.as_str()));

        self.records.replace_courses(term_code, &courses).await?;
        for course_id in &removed_ids {
            debug!(term_code, course_id = %course_id, "removing sessions of dropped course");
            // Metadata first: leftover sessions without metadata are always re-synced
            self.metadata.delete_session_list(term_code, course_id).await?;
            self.records.delete_sessions(term_code, course_id).await?;
        }

        // Written last so an interrupted run is redone in full by the next one
        let outcome = match previous {
            None => {
                self.metadata.create_course_list(term_code, &hash, now).await?;
                CourseListOutcome::Created
            }
            Some(_) => {
                self.metadata.update_course_list(term_code, &hash, now).await?;
                CourseListOutcome::Changed
            }
        };

        info!(term_code, courses = courses.len(), removed = removed_ids.len(), "course list replaced");
        Ok((outcome, courses, removed_ids.len()))
    }

    async fn sync_session_list(&self, term_code: &str, course_id: &str) -> Result<SessionListOutcome> {
        let sessions = self.catalog.fetch_sessions(term_code, course_id).await?;
        let hash = fingerprint_records(&[term_code, course_id], &sessions)?;

        let existing = self.metadata.get_session_list(term_code, course_id).await?;
        if existing.as_ref().is_some_and(|meta| meta.hash == hash) {
            return Ok(SessionListOutcome::Unchanged);
        }

        self.records.replace_sessions(term_code, course_id, &sessions).await?;
        match existing {
            None => self.metadata.create_session_list(term_code, course_id, &hash).await?,
            Some(_) => self.metadata.update_session_list(term_code, course_id, &hash).await?,
        }

        debug!(term_code, course_id, sessions = sessions.len(), "session list replaced");
        Ok(SessionListOutcome::Updated)
    }
}
