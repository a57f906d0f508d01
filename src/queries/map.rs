//! Map surface view model: which sites to plot and where to center.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Coordinates, Site, Task, TaskPriority, TaskStatus};

/// Geographic center of the contiguous US, used when there is nothing to plot.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 39.5,
    lng: -98.35,
};

pub const MAP_PLACEHOLDER: &str = "Add GOOGLE_MAPS_API_KEY to enable the interactive map.";

/// A task due today, as listed in a marker's info window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerTask {
    pub id: String,
    pub title: String,
    pub priority: TaskPriority,
    pub priority_label: &'static str,
    pub status: TaskStatus,
    pub status_label: &'static str,
}

impl MarkerTask {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            priority_label: task.priority.label(),
            status: task.status,
            status_label: task.status.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMarker {
    pub site_id: String,
    pub name: String,
    pub city: String,
    pub position: Coordinates,
    pub status_label: &'static str,
    pub frequency_label: &'static str,
    pub open_tasks_today: usize,
    pub tasks_today: Vec<MarkerTask>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub center: Coordinates,
    pub markers: Vec<SiteMarker>,
    /// Sites the viewport should fit: today's sites, or every site when
    /// nothing is due today.
    pub route: Vec<String>,
}

/// Group tasks by owning site, keeping input order within each group.
pub fn tasks_by_site(tasks: &[Task]) -> HashMap<&str, Vec<&Task>> {
    let mut map: HashMap<&str, Vec<&Task>> = HashMap::new();
    for task in tasks {
        map.entry(task.site_id.as_str()).or_default().push(task);
    }
    map
}

/// Sites with at least one task in `tasks` (normally tasks due today).
pub fn sites_with_tasks<'a>(sites: &'a [Site], tasks: &[Task]) -> Vec<&'a Site> {
    let grouped = tasks_by_site(tasks);
    sites
        .iter()
        .filter(|s| grouped.get(s.id.as_str()).is_some_and(|t| !t.is_empty()))
        .collect()
}

/// Selected site, then first site with work today, then first site, then
/// [`DEFAULT_CENTER`].
pub fn map_center(sites: &[Site], today_sites: &[&Site], selected: Option<&str>) -> Coordinates {
    selected
        .and_then(|id| sites.iter().find(|s| s.id == id))
        .or_else(|| today_sites.first().copied())
        .or_else(|| sites.first())
        .map(|s| s.coordinates)
        .unwrap_or(DEFAULT_CENTER)
}

pub fn build_map_view(
    sites: &[Site],
    tasks_today: &[Task],
    selected: Option<&str>,
    enabled: bool,
) -> MapView {
    let grouped = tasks_by_site(tasks_today);
    let today_sites = sites_with_tasks(sites, tasks_today);
    let center = map_center(sites, &today_sites, selected);

    let route_sites: Vec<&Site> = if today_sites.is_empty() {
        sites.iter().collect()
    } else {
        today_sites
    };

    let markers = sites
        .iter()
        .map(|s| {
            let due = grouped.get(s.id.as_str()).map(Vec::as_slice).unwrap_or_default();
            SiteMarker {
                site_id: s.id.clone(),
                name: s.name.clone(),
                city: s.city.clone(),
                position: s.coordinates,
                status_label: s.status.label(),
                frequency_label: s.service_frequency.label(),
                open_tasks_today: due.iter().filter(|t| t.status.is_open()).count(),
                tasks_today: due.iter().map(|t| MarkerTask::from_task(t)).collect(),
                selected: selected == Some(s.id.as_str()),
            }
        })
        .collect();

    MapView {
        enabled,
        placeholder: (!enabled).then(|| MAP_PLACEHOLDER.to_string()),
        center,
        markers,
        route: route_sites.into_iter().map(|s| s.id.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{sample_sites, sample_tasks};

    fn due_on(day: &str) -> Vec<Task> {
        sample_tasks().into_iter().filter(|t| t.due_date == day).collect()
    }

    #[test]
    fn test_center_prefers_selected_site() {
        let sites = sample_sites();
        let tasks = due_on("2025-01-02");
        let today = sites_with_tasks(&sites, &tasks);
        let center = map_center(&sites, &today, Some("site-3"));
        assert_eq!(center.lat, 37.3382);
    }

    #[test]
    fn test_center_falls_back_to_first_today_site() {
        let sites = sample_sites();
        let tasks = due_on("2025-01-02");
        let today = sites_with_tasks(&sites, &tasks);
        assert_eq!(today.len(), 1);
        assert_eq!(map_center(&sites, &today, None).lat, 47.6062);
        // unknown selection behaves like no selection
        assert_eq!(map_center(&sites, &today, Some("nope")).lat, 47.6062);
    }

    #[test]
    fn test_center_defaults_without_sites() {
        assert_eq!(map_center(&[], &[], None), DEFAULT_CENTER);
    }

    #[test]
    fn test_route_covers_all_sites_on_quiet_day() {
        let view = build_map_view(&sample_sites(), &[], None, false);
        assert_eq!(view.route, vec!["site-1", "site-2", "site-3"]);
        assert_eq!(view.placeholder.as_deref(), Some(MAP_PLACEHOLDER));
        assert_eq!(view.center.lat, 45.5152);
    }

    #[test]
    fn test_markers_count_open_tasks_today() {
        let tasks = due_on("2024-12-31");
        let view = build_map_view(&sample_sites(), &tasks, Some("site-1"), true);
        assert!(view.placeholder.is_none());
        assert_eq!(view.route, vec!["site-1"]);
        let marker = view.markers.iter().find(|m| m.site_id == "site-1").unwrap();
        assert_eq!(marker.open_tasks_today, 1);
        assert!(marker.selected);
    }

    #[test]
    fn test_markers_carry_display_labels() {
        let tasks = due_on("2024-12-31");
        let view = build_map_view(&sample_sites(), &tasks, None, true);
        let marker = &view.markers[0];
        assert_eq!(marker.status_label, "On track");
        assert_eq!(marker.frequency_label, "Weekly");
        assert_eq!(marker.tasks_today.len(), 1);
        assert_eq!(marker.tasks_today[0].title, "Seasonal pruning");
        assert_eq!(marker.tasks_today[0].priority_label, "High");
        assert_eq!(marker.tasks_today[0].status_label, "In progress");

        let lakeside = &view.markers[1];
        assert_eq!(lakeside.status_label, "At risk");
        assert_eq!(lakeside.frequency_label, "Bi-weekly");
        assert!(lakeside.tasks_today.is_empty());

        let json = serde_json::to_value(marker).unwrap();
        assert_eq!(json["statusLabel"], "On track");
        assert_eq!(json["tasksToday"][0]["priority"], "high");
    }
}
