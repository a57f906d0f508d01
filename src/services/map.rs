// Map service: the sites and tasks due today that make up today's route.

use std::sync::Arc;

use chrono::NaiveDate;

use super::tasks::{UpdateOutcome, UpdateState};
use super::DataOrigin;
use crate::dates::to_iso;
use crate::error::{Advisory, Result};
use crate::queries::map::{build_map_view, MapView};
use crate::sample::{sample_sites, sample_tasks};
use crate::source::DataSource;
use crate::types::{Site, Task, TaskStatus};

pub const MAP_FALLBACK_MESSAGE: &str = "Unable to load live data. Showing sample data instead.";
pub const COMPLETE_FAILED_MESSAGE: &str = "Unable to update the task right now. Please try again.";

pub struct TodayRoute {
    source: Arc<dyn DataSource>,
    map_enabled: bool,
    sites: Vec<Site>,
    tasks: Vec<Task>,
    selected: Option<String>,
    origin: DataOrigin,
    advisory: Option<Advisory>,
}

async fn read_route(source: &dyn DataSource, day: &str) -> Result<(Vec<Site>, Vec<Task>)> {
    let sites = source.list_sites().await?;
    let tasks = source.tasks_due_on(day).await?;
    Ok((sites, tasks))
}

fn sample_route(day: &str) -> (Vec<Site>, Vec<Task>) {
    let tasks = sample_tasks().into_iter().filter(|t| t.due_date == day).collect();
    (sample_sites(), tasks)
}

impl TodayRoute {
    /// Load every site and the tasks due on `today`.
    pub async fn open(source: Arc<dyn DataSource>, today: NaiveDate, map_enabled: bool) -> Self {
        let day = to_iso(today);
        let ((sites, tasks), origin, advisory) = match read_route(source.as_ref(), &day).await {
            Ok(data) => (data, source.kind().into(), None),
            Err(e) if e.is_not_configured() => (sample_route(&day), DataOrigin::Sample, None),
            Err(e) => {
                log::error!("Unable to load live data. Falling back to sample data: {e}");
                (
                    sample_route(&day),
                    DataOrigin::Sample,
                    Some(Advisory::read_fallback(MAP_FALLBACK_MESSAGE)),
                )
            }
        };
        Self {
            source,
            map_enabled,
            sites,
            tasks,
            selected: None,
            origin,
            advisory,
        }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn origin(&self) -> DataOrigin {
        self.origin
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    pub fn select(&mut self, site_id: Option<&str>) {
        self.selected = site_id.map(str::to_string);
    }

    pub fn view(&self) -> MapView {
        build_map_view(&self.sites, &self.tasks, self.selected.as_deref(), self.map_enabled)
    }

    /// Mark a task done. The local copy changes only after the write
    /// succeeds, so a failure leaves the route as it was.
    pub async fn mark_complete(&mut self, id: &str) -> UpdateOutcome {
        match self.source.update_task_status(id, TaskStatus::Done).await {
            Ok(()) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.status = TaskStatus::Done;
                }
                UpdateOutcome {
                    id: id.to_string(),
                    state: UpdateState::Committed,
                    advisory: None,
                }
            }
            Err(e) => {
                log::error!("Failed to mark task {id} complete: {e}");
                let advisory = Advisory::write_failed(COMPLETE_FAILED_MESSAGE);
                self.advisory = Some(advisory.clone());
                UpdateOutcome {
                    id: id.to_string(),
                    state: UpdateState::RolledBack,
                    advisory: Some(advisory),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso_date;
    use crate::source::testing::FailingSource;
    use crate::source::SampleSource;

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[tokio::test]
    async fn test_route_loads_tasks_due_today() {
        let route = TodayRoute::open(Arc::new(SampleSource::new()), date("2025-01-02"), true).await;
        assert_eq!(route.tasks().len(), 1);
        assert_eq!(route.tasks()[0].id, "task-2");
        let view = route.view();
        assert_eq!(view.route, vec!["site-2"]);
        assert_eq!(view.center.lat, 47.6062);
    }

    #[tokio::test]
    async fn test_read_error_shows_sample_route() {
        let route = TodayRoute::open(Arc::new(FailingSource), date("2024-12-31"), false).await;
        assert_eq!(route.sites().len(), 3);
        assert_eq!(route.tasks().len(), 1);
        assert_eq!(route.advisory().unwrap().message, MAP_FALLBACK_MESSAGE);
        assert!(route.view().placeholder.is_some());
    }

    #[tokio::test]
    async fn test_mark_complete_updates_after_write() {
        let mut route = TodayRoute::open(Arc::new(SampleSource::new()), date("2024-12-31"), true).await;
        let outcome = route.mark_complete("task-1").await;
        assert_eq!(outcome.state, UpdateState::Committed);
        assert_eq!(route.tasks()[0].status, TaskStatus::Done);
        assert_eq!(route.view().markers[0].open_tasks_today, 0);
    }

    #[tokio::test]
    async fn test_failed_mark_complete_leaves_task_open() {
        let mut route = TodayRoute::open(Arc::new(FailingSource), date("2024-12-31"), true).await;
        let outcome = route.mark_complete("task-1").await;
        assert_eq!(outcome.state, UpdateState::RolledBack);
        assert_eq!(route.tasks()[0].status, TaskStatus::InProgress);
        assert_eq!(route.advisory().unwrap().message, COMPLETE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_selection_moves_center() {
        let mut route = TodayRoute::open(Arc::new(SampleSource::new()), date("2024-12-31"), true).await;
        route.select(Some("site-3"));
        assert_eq!(route.view().center.lat, 37.3382);
        route.select(None);
        assert_eq!(route.view().center.lat, 45.5152);
    }
}
