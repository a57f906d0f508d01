// Dashboard service: sites, tasks and schedule loaded together for the
// operations overview, with per-collection sample fallback.

use serde::Serialize;

use super::DataOrigin;
use crate::error::{Advisory, Result};
use crate::queries::snapshot::compute_snapshot;
use crate::sample::{sample_schedule, sample_sites, sample_tasks};
use crate::source::DataSource;
use crate::types::{DashboardSnapshot, ScheduleEntry, Site, Task};

pub const DASHBOARD_FALLBACK_MESSAGE: &str =
    "Unable to load live data. Showing sample data instead.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub sites: Vec<Site>,
    pub tasks: Vec<Task>,
    pub schedule: Vec<ScheduleEntry>,
    pub snapshot: DashboardSnapshot,
    pub origin: DataOrigin,
    /// Collections that came back empty and were filled from sample data.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample_collections: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

impl Dashboard {
    fn all_sample(advisory: Option<Advisory>) -> Self {
        let (sites, tasks, schedule) = (sample_sites(), sample_tasks(), sample_schedule());
        Self {
            snapshot: compute_snapshot(&sites, &tasks, &schedule),
            sites,
            tasks,
            schedule,
            origin: DataOrigin::Sample,
            sample_collections: Vec::new(),
            advisory,
        }
    }

    /// Reload every collection as stored, without empty substitution.
    ///
    /// On failure the current data stays and the error is only logged.
    pub async fn refresh(&mut self, source: &dyn DataSource) {
        match read_all(source).await {
            Ok((sites, tasks, schedule)) => {
                self.snapshot = compute_snapshot(&sites, &tasks, &schedule);
                self.sites = sites;
                self.tasks = tasks;
                self.schedule = schedule;
                self.origin = source.kind().into();
                self.sample_collections.clear();
                self.advisory = None;
            }
            Err(e) => log::error!("Failed to refresh dashboard data: {e}"),
        }
    }
}

async fn read_all(source: &dyn DataSource) -> Result<(Vec<Site>, Vec<Task>, Vec<ScheduleEntry>)> {
    let sites = source.list_sites().await?;
    let tasks = source.list_tasks().await?;
    let schedule = source.list_schedule().await?;
    Ok((sites, tasks, schedule))
}

/// Replace an empty collection with its sample counterpart.
fn or_sample<T>(items: Vec<T>, name: &str, sample: fn() -> Vec<T>, used: &mut Vec<String>) -> Vec<T> {
    if items.is_empty() {
        used.push(name.to_string());
        sample()
    } else {
        items
    }
}

/// Load the dashboard.
///
/// Each empty collection falls back to sample data on its own; any read
/// error replaces all three with sample data.
pub async fn load_dashboard(source: &dyn DataSource) -> Dashboard {
    match read_all(source).await {
        Ok((sites, tasks, schedule)) => {
            let mut used = Vec::new();
            let sites = or_sample(sites, "sites", sample_sites, &mut used);
            let tasks = or_sample(tasks, "tasks", sample_tasks, &mut used);
            let schedule = or_sample(schedule, "schedule", sample_schedule, &mut used);
            if !used.is_empty() {
                log::info!("Empty collections filled from sample data: {}", used.join(", "));
            }
            Dashboard {
                snapshot: compute_snapshot(&sites, &tasks, &schedule),
                sites,
                tasks,
                schedule,
                origin: source.kind().into(),
                sample_collections: used,
                advisory: None,
            }
        }
        Err(e) if e.is_not_configured() => Dashboard::all_sample(None),
        Err(e) => {
            log::warn!("Falling back to sample data after read error: {e}");
            Dashboard::all_sample(Some(Advisory::read_fallback(DASHBOARD_FALLBACK_MESSAGE)))
        }
    }
}
