//! In-memory data source seeded from the sample dataset.
//!
//! Writes land in this process only and vanish with it.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{DataSource, SourceKind};
use crate::dates::WeekRange;
use crate::error::{FieldOpsError, Result};
use crate::sample;
use crate::types::{ScheduleEntry, Site, SitePatch, SiteTask, Task, TaskStatus, VisitLog};

#[derive(Debug, Clone)]
struct SampleStore {
    sites: Vec<Site>,
    tasks: Vec<Task>,
    site_tasks: Vec<SiteTask>,
    schedule: Vec<ScheduleEntry>,
    visit_logs: Vec<VisitLog>,
}

pub struct SampleSource {
    store: RwLock<SampleStore>,
}

impl Default for SampleSource {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn missing(collection: &str, id: &str) -> FieldOpsError {
    FieldOpsError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

impl SampleSource {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(SampleStore {
                sites: sample::sample_sites(),
                tasks: sample::sample_tasks(),
                site_tasks: sample::sample_site_tasks(),
                schedule: sample::sample_schedule(),
                visit_logs: sample::sample_visit_logs(),
            }),
        }
    }
}

#[async_trait]
impl DataSource for SampleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Sample
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        Ok(self.store.read().sites.clone())
    }

    async fn get_site(&self, id: &str) -> Result<Option<Site>> {
        Ok(self.store.read().sites.iter().find(|s| s.id == id).cloned())
    }

    async fn create_site(&self, site: Site) -> Result<Site> {
        let site = Site { id: new_id(), ..site };
        self.store.write().sites.push(site.clone());
        Ok(site)
    }

    async fn update_site(&self, id: &str, patch: &SitePatch) -> Result<()> {
        let mut store = self.store.write();
        let site = store
            .sites
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| missing("sites", id))?;
        patch.apply(site);
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.store.read().tasks.clone())
    }

    async fn tasks_due_on(&self, day: &str) -> Result<Vec<Task>> {
        Ok(self
            .store
            .read()
            .tasks
            .iter()
            .filter(|t| t.due_date == day)
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: Task) -> Result<Task> {
        let task = Task { id: new_id(), ..task };
        self.store.write().tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        let mut store = self.store.write();
        let task = store
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| missing("tasks", id))?;
        task.status = status;
        Ok(())
    }

    async fn site_tasks(&self, site_id: &str) -> Result<Vec<SiteTask>> {
        Ok(self
            .store
            .read()
            .site_tasks
            .iter()
            .filter(|t| t.site_id == site_id)
            .cloned()
            .collect())
    }

    async fn set_site_task_done(
        &self,
        id: &str,
        is_done: bool,
        last_completed_on: Option<&str>,
    ) -> Result<()> {
        let mut store = self.store.write();
        let task = store
            .site_tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| missing("tasks", id))?;
        task.is_done = is_done;
        task.last_completed_on = last_completed_on.map(str::to_string);
        Ok(())
    }

    async fn update_site_task_notes(&self, id: &str, notes: &str) -> Result<()> {
        let mut store = self.store.write();
        let task = store
            .site_tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| missing("tasks", id))?;
        task.notes = notes.to_string();
        Ok(())
    }

    async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>> {
        Ok(self.store.read().schedule.clone())
    }

    async fn weekly_schedule(&self, range: &WeekRange) -> Result<Vec<ScheduleEntry>> {
        Ok(self
            .store
            .read()
            .schedule
            .iter()
            .filter(|e| range.contains_day(&e.day))
            .cloned()
            .collect())
    }

    async fn upsert_schedule_entry(&self, entry: &ScheduleEntry) -> Result<()> {
        let mut store = self.store.write();
        match store.schedule.iter().position(|e| e.same_slot(entry)) {
            Some(idx) => merge_entry(&mut store.schedule[idx], entry),
            None => store.schedule.push(entry.clone()),
        }
        Ok(())
    }

    async fn log_visit(&self, visit: VisitLog) -> Result<VisitLog> {
        let visit = VisitLog { id: new_id(), ..visit };
        self.store.write().visit_logs.push(visit.clone());
        Ok(visit)
    }

    async fn visit_logs_by_site(&self, site_id: &str) -> Result<Vec<VisitLog>> {
        let mut logs: Vec<VisitLog> = self
            .store
            .read()
            .visit_logs
            .iter()
            .filter(|v| v.site_id == site_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        Ok(logs)
    }
}

/// Same merge rule as the live upsert: optional fields absent from the
/// update keep their stored values.
fn merge_entry(existing: &mut ScheduleEntry, update: &ScheduleEntry) {
    existing.tasks = update.tasks.clone();
    if update.time_window.is_some() {
        existing.time_window = update.time_window.clone();
    }
    if update.crew_lead.is_some() {
        existing.crew_lead = update.crew_lead.clone();
    }
    if update.notes.is_some() {
        existing.notes = update.notes.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso_date;

    #[tokio::test]
    async fn test_weekly_schedule_filters_by_range() {
        let source = SampleSource::new();
        let range = WeekRange::for_week_start(parse_iso_date("2024-12-30").unwrap());
        let entries = source.weekly_schedule(&range).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| range.contains_day(&e.day)));
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_entry_per_slot_and_merges() {
        let source = SampleSource::new();
        let update = ScheduleEntry {
            day: "2024-12-31".to_string(),
            site_id: "site-1".to_string(),
            tasks: vec!["task-1".to_string()],
            ..Default::default()
        };
        source.upsert_schedule_entry(&update).await.unwrap();

        let schedule = source.list_schedule().await.unwrap();
        let slot: Vec<&ScheduleEntry> = schedule.iter().filter(|e| e.same_slot(&update)).collect();
        assert_eq!(slot.len(), 1);
        assert_eq!(slot[0].tasks, vec!["task-1".to_string()]);
        // stored time window survives a partial update
        assert_eq!(slot[0].time_window.as_deref(), Some("8:00 AM - 12:00 PM"));
    }

    #[tokio::test]
    async fn test_upsert_new_slot_appends() {
        let source = SampleSource::new();
        let before = source.list_schedule().await.unwrap().len();
        let entry = ScheduleEntry {
            day: "2025-01-03".to_string(),
            site_id: "site-1".to_string(),
            tasks: vec![],
            ..Default::default()
        };
        source.upsert_schedule_entry(&entry).await.unwrap();
        assert_eq!(source.list_schedule().await.unwrap().len(), before + 1);
    }

    #[tokio::test]
    async fn test_create_site_assigns_id() {
        let source = SampleSource::new();
        let site = source
            .create_site(Site {
                name: "Harbor Park".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!site.id.is_empty());
        assert_eq!(source.get_site(&site.id).await.unwrap().unwrap().name, "Harbor Park");
    }

    #[tokio::test]
    async fn test_update_unknown_task_is_not_found() {
        let source = SampleSource::new();
        let err = source
            .update_task_status("nope", TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, FieldOpsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_visit_logs_newest_first() {
        let source = SampleSource::new();
        source
            .log_visit(VisitLog {
                site_id: "site-1".to_string(),
                visit_date: "2025-01-07".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let logs = source.visit_logs_by_site("site-1").await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].visit_date, "2025-01-07");
    }
}
