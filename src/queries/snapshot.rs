//! Dashboard header counts.

use crate::types::{DashboardSnapshot, ScheduleEntry, Site, Task, TaskPriority};

/// Counts derived from whatever collections are currently loaded.
///
/// "Due this week" counts every open task regardless of due date, matching
/// what the dashboard has always shown under that heading.
pub fn compute_snapshot(sites: &[Site], tasks: &[Task], schedule: &[ScheduleEntry]) -> DashboardSnapshot {
    DashboardSnapshot {
        site_count: sites.len(),
        tasks_due_this_week: tasks.iter().filter(|t| t.status.is_open()).count(),
        high_priority_tasks: tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::High)
            .count(),
        visits_scheduled: schedule.len(),
    }
}
