//! Data sources.
//!
//! One trait, two implementations:
//! - firestore: live document store over REST
//! - sample: in-memory copy of the sample dataset, mutable for the session
//!
//! The source is chosen once, in [`from_config`], and shared behind an
//! `Arc<dyn DataSource>`.

pub mod document;
pub mod firestore;
pub mod sample;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Config;
use crate::dates::WeekRange;
use crate::error::Result;
use crate::types::{ScheduleEntry, Site, SitePatch, SiteTask, Task, TaskStatus, VisitLog};

pub use firestore::{FirestoreClient, FirestoreSource};
pub use sample::SampleSource;

/// Which backend answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Live,
    Sample,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    // Sites
    async fn list_sites(&self) -> Result<Vec<Site>>;
    async fn get_site(&self, id: &str) -> Result<Option<Site>>;
    /// Store a new site; the returned copy carries the generated id.
    async fn create_site(&self, site: Site) -> Result<Site>;
    async fn update_site(&self, id: &str, patch: &SitePatch) -> Result<()>;

    // Tasks
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn tasks_due_on(&self, day: &str) -> Result<Vec<Task>>;
    async fn create_task(&self, task: Task) -> Result<Task>;
    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()>;

    // Site checklist tasks
    async fn site_tasks(&self, site_id: &str) -> Result<Vec<SiteTask>>;
    async fn set_site_task_done(
        &self,
        id: &str,
        is_done: bool,
        last_completed_on: Option<&str>,
    ) -> Result<()>;
    async fn update_site_task_notes(&self, id: &str, notes: &str) -> Result<()>;

    // Schedule
    /// Flat schedule list used by the dashboard counts.
    async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>>;
    /// Entries whose day falls inside `range`, inclusive on both ends.
    async fn weekly_schedule(&self, range: &WeekRange) -> Result<Vec<ScheduleEntry>>;
    /// Write under the `{day}-{siteId}` key, merging with any stored fields.
    async fn upsert_schedule_entry(&self, entry: &ScheduleEntry) -> Result<()>;

    // Visit logs
    async fn log_visit(&self, visit: VisitLog) -> Result<VisitLog>;
    /// Newest visit first.
    async fn visit_logs_by_site(&self, site_id: &str) -> Result<Vec<VisitLog>>;
}

/// Live source when Firebase is fully configured, sample source otherwise.
pub fn from_config(config: &Config) -> Arc<dyn DataSource> {
    if !config.live_enabled() {
        log::info!("Firebase not configured, using sample data");
        return Arc::new(SampleSource::new());
    }
    match FirestoreSource::from_config(config) {
        Ok(source) => {
            log::info!(
                "Using Firestore project {}",
                config.firebase.project_id.as_deref().unwrap_or_default()
            );
            Arc::new(source)
        }
        Err(e) => {
            log::warn!("Failed to build Firestore client: {e}. Using sample data.");
            Arc::new(SampleSource::new())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A source whose every call fails, for fallback and rollback paths.

    use super::*;
    use crate::error::FieldOpsError;

    pub struct FailingSource;

    fn fail<T>() -> Result<T> {
        Err(FieldOpsError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    #[async_trait]
    impl DataSource for FailingSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Live
        }
        async fn list_sites(&self) -> Result<Vec<Site>> {
            fail()
        }
        async fn get_site(&self, _id: &str) -> Result<Option<Site>> {
            fail()
        }
        async fn create_site(&self, _site: Site) -> Result<Site> {
            fail()
        }
        async fn update_site(&self, _id: &str, _patch: &SitePatch) -> Result<()> {
            fail()
        }
        async fn list_tasks(&self) -> Result<Vec<Task>> {
            fail()
        }
        async fn tasks_due_on(&self, _day: &str) -> Result<Vec<Task>> {
            fail()
        }
        async fn create_task(&self, _task: Task) -> Result<Task> {
            fail()
        }
        async fn update_task_status(&self, _id: &str, _status: TaskStatus) -> Result<()> {
            fail()
        }
        async fn site_tasks(&self, _site_id: &str) -> Result<Vec<SiteTask>> {
            fail()
        }
        async fn set_site_task_done(
            &self,
            _id: &str,
            _is_done: bool,
            _last_completed_on: Option<&str>,
        ) -> Result<()> {
            fail()
        }
        async fn update_site_task_notes(&self, _id: &str, _notes: &str) -> Result<()> {
            fail()
        }
        async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>> {
            fail()
        }
        async fn weekly_schedule(&self, _range: &WeekRange) -> Result<Vec<ScheduleEntry>> {
            fail()
        }
        async fn upsert_schedule_entry(&self, _entry: &ScheduleEntry) -> Result<()> {
            fail()
        }
        async fn log_visit(&self, _visit: VisitLog) -> Result<VisitLog> {
            fail()
        }
        async fn visit_logs_by_site(&self, _site_id: &str) -> Result<Vec<VisitLog>> {
            fail()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_config_selects_sample_source() {
        let source = from_config(&Config::default());
        assert_eq!(source.kind(), SourceKind::Sample);
    }
}
