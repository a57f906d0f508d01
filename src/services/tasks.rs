// Tasks service: the dashboard task board and the per-site checklist.
// Both apply edits locally first, then write through the data source.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::{DataOrigin, Loaded};
use crate::dates::to_iso;
use crate::error::Advisory;
use crate::sample::{sample_site_tasks, sample_tasks};
use crate::source::{DataSource, SourceKind};
use crate::types::{SiteTask, Task, TaskCategory, TaskStatus};

pub const STATUS_FAILED_MESSAGE: &str = "Could not update task status. Please try again.";
pub const NOTES_FAILED_MESSAGE: &str = "Could not save notes. Please try again.";
pub const TASK_SAVE_FAILED_MESSAGE: &str = "Could not save task. Please try again.";
pub const SITE_TASKS_FALLBACK_MESSAGE: &str = "Unable to load tasks right now. Showing sample data.";

/// Where a locally applied edit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateState {
    /// Applied locally, not (yet) persisted.
    Pending,
    /// Applied locally and persisted.
    Committed,
    /// The write failed and the local value was restored.
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub id: String,
    pub state: UpdateState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

impl UpdateOutcome {
    fn committed(id: &str) -> Self {
        Self {
            id: id.to_string(),
            state: UpdateState::Committed,
            advisory: None,
        }
    }
}

/// A status change applied to the board but not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingStatus {
    pub id: String,
    pub previous: TaskStatus,
    pub next: TaskStatus,
}

impl PendingStatus {
    pub fn state(&self) -> UpdateState {
        UpdateState::Pending
    }
}

// =============================================================================
// Task board
// =============================================================================

pub struct TaskBoard {
    source: Arc<dyn DataSource>,
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(source: Arc<dyn DataSource>, tasks: Vec<Task>) -> Self {
        Self { source, tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// `None` shows every category.
    pub fn filtered(&self, category: Option<TaskCategory>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }

    /// Add a task under a local id, then swap in the stored id once the
    /// write succeeds. A failed write leaves the local task in place.
    pub async fn add_task(&mut self, task: Task) -> UpdateOutcome {
        let local_id = uuid::Uuid::new_v4().to_string();
        let local = Task {
            id: local_id.clone(),
            ..task
        };
        self.tasks.push(local.clone());

        match self.source.create_task(local).await {
            Ok(stored) => {
                if let Some(t) = self.tasks.iter_mut().find(|t| t.id == local_id) {
                    t.id = stored.id.clone();
                }
                UpdateOutcome::committed(&stored.id)
            }
            Err(e) => {
                log::error!("Failed to persist new task: {e}");
                UpdateOutcome {
                    id: local_id,
                    state: UpdateState::Pending,
                    advisory: Some(Advisory::write_failed(TASK_SAVE_FAILED_MESSAGE)),
                }
            }
        }
    }

    /// Apply a status locally. `None` when the board has no such task.
    pub fn begin_status_change(&mut self, id: &str, status: TaskStatus) -> Option<PendingStatus> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let previous = task.status;
        task.status = status;
        Some(PendingStatus {
            id: id.to_string(),
            previous,
            next: status,
        })
    }

    /// Write a pending change; on failure the previous status is restored.
    pub async fn commit_status_change(&mut self, change: PendingStatus) -> UpdateOutcome {
        match self.source.update_task_status(&change.id, change.next).await {
            Ok(()) => UpdateOutcome::committed(&change.id),
            Err(e) => {
                log::error!("Failed to update status of task {}: {e}", change.id);
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == change.id) {
                    task.status = change.previous;
                }
                UpdateOutcome {
                    id: change.id,
                    state: UpdateState::RolledBack,
                    advisory: Some(Advisory::write_failed(STATUS_FAILED_MESSAGE)),
                }
            }
        }
    }

    pub async fn update_status(&mut self, id: &str, status: TaskStatus) -> Option<UpdateOutcome> {
        let change = self.begin_status_change(id, status)?;
        Some(self.commit_status_change(change).await)
    }

    pub async fn mark_complete(&mut self, id: &str) -> Option<UpdateOutcome> {
        self.update_status(id, TaskStatus::Done).await
    }

    /// Discard local edits and show the sample tasks.
    pub fn reset_to_sample(&mut self) {
        self.tasks = sample_tasks();
    }
}

// =============================================================================
// Site checklist
// =============================================================================

/// Checklist tasks for one site.
pub async fn load_site_tasks(source: &dyn DataSource, site_id: &str) -> Loaded<Vec<SiteTask>> {
    let fallback_tasks = || -> Vec<SiteTask> {
        sample_site_tasks()
            .into_iter()
            .filter(|t| t.site_id == site_id)
            .collect()
    };
    let kind = source.kind();
    match source.site_tasks(site_id).await {
        Ok(tasks) if tasks.is_empty() && kind == SourceKind::Live => Loaded::sample(fallback_tasks()),
        Ok(tasks) => Loaded {
            data: tasks,
            origin: kind.into(),
            advisory: None,
        },
        Err(e) if e.is_not_configured() => Loaded::sample(fallback_tasks()),
        Err(e) => {
            log::warn!("Failed to fetch tasks for site {site_id}: {e}");
            Loaded {
                data: fallback_tasks(),
                origin: DataOrigin::Sample,
                advisory: Some(Advisory::read_fallback(SITE_TASKS_FALLBACK_MESSAGE)),
            }
        }
    }
}

pub struct SiteTaskList {
    source: Arc<dyn DataSource>,
    site_id: String,
    tasks: Vec<SiteTask>,
    advisory: Option<Advisory>,
}

impl SiteTaskList {
    pub async fn open(source: Arc<dyn DataSource>, site_id: &str) -> Self {
        let loaded = load_site_tasks(source.as_ref(), site_id).await;
        Self {
            source,
            site_id: site_id.to_string(),
            tasks: loaded.data,
            advisory: loaded.advisory,
        }
    }

    pub async fn refresh(&mut self) {
        let loaded = load_site_tasks(self.source.as_ref(), &self.site_id).await;
        self.tasks = loaded.data;
        self.advisory = loaded.advisory;
    }

    pub fn tasks(&self) -> &[SiteTask] {
        &self.tasks
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    /// Mark a checklist item done (stamped with `today`) or open again.
    /// A failed write restores the item as it was.
    pub async fn toggle_completion(
        &mut self,
        id: &str,
        is_done: bool,
        today: NaiveDate,
    ) -> Option<UpdateOutcome> {
        let last_completed_on = is_done.then(|| to_iso(today));
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let previous = task.clone();
        task.is_done = is_done;
        task.last_completed_on = last_completed_on.clone();

        let result = self
            .source
            .set_site_task_done(id, is_done, last_completed_on.as_deref())
            .await;
        let outcome = match result {
            Ok(()) => UpdateOutcome::committed(id),
            Err(e) => {
                log::error!("Failed to update task status: {e}");
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *task = previous;
                }
                UpdateOutcome {
                    id: id.to_string(),
                    state: UpdateState::RolledBack,
                    advisory: Some(Advisory::write_failed(STATUS_FAILED_MESSAGE)),
                }
            }
        };
        self.advisory = outcome.advisory.clone();
        Some(outcome)
    }

    /// Notes stay as typed even when the write fails.
    pub async fn save_notes(&mut self, id: &str, notes: &str) -> Option<UpdateOutcome> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.notes = notes.to_string();

        let outcome = match self.source.update_site_task_notes(id, notes).await {
            Ok(()) => UpdateOutcome::committed(id),
            Err(e) => {
                log::error!("Failed to update task notes: {e}");
                UpdateOutcome {
                    id: id.to_string(),
                    state: UpdateState::Pending,
                    advisory: Some(Advisory::write_failed(NOTES_FAILED_MESSAGE)),
                }
            }
        };
        self.advisory = outcome.advisory.clone();
        Some(outcome)
    }
}
