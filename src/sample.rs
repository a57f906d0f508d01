//! Static sample dataset.
//!
//! Served when no live backend is configured, and substituted for live data
//! whenever a read fails.

use crate::dates::WeekRange;
use crate::types::{
    Coordinates, ScheduleEntry, ServiceFrequency, Site, SiteStatus, SiteTask, Task, TaskCategory,
    TaskPriority, TaskStatus, VisitLog, VisitOutcome,
};

#[allow(clippy::too_many_arguments)]
fn site(
    id: &str,
    name: &str,
    address: &str,
    city: &str,
    contact: (&str, &str),
    service_frequency: ServiceFrequency,
    notes: &str,
    status: SiteStatus,
    next_visit: &str,
    coordinates: (f64, f64),
    active_tasks: u32,
) -> Site {
    let (contact_name, contact_phone) = contact;
    Site {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        contact_name: contact_name.to_string(),
        contact_phone: contact_phone.to_string(),
        manager: Some(contact_name.to_string()),
        phone: Some(contact_phone.to_string()),
        status,
        coordinates: Coordinates {
            lat: coordinates.0,
            lng: coordinates.1,
        },
        service_frequency,
        notes: notes.to_string(),
        next_visit: next_visit.to_string(),
        active_tasks,
        ..Default::default()
    }
}

pub fn sample_sites() -> Vec<Site> {
    vec![
        site(
            "site-1",
            "Green Meadows Estate",
            "123 Greenway Blvd",
            "Portland, OR",
            ("Alyssa Hart", "(555) 201-4433"),
            ServiceFrequency::Weekly,
            "Focus on winter pruning and irrigation checks.",
            SiteStatus::OnTrack,
            "2024-12-31",
            (45.5152, -122.6784),
            6,
        ),
        site(
            "site-2",
            "Lakeside Villas",
            "980 Lake Shore Dr",
            "Seattle, WA",
            ("Jacob Mills", "(555) 667-2399"),
            ServiceFrequency::Fortnightly,
            "Drainage issues near the north entrance.",
            SiteStatus::AtRisk,
            "2025-01-02",
            (47.6062, -122.3321),
            4,
        ),
        site(
            "site-3",
            "Sunrise Corporate Campus",
            "4100 Innovation Way",
            "San Jose, CA",
            ("Priya Desai", "(555) 842-7788"),
            ServiceFrequency::Monthly,
            "Irrigation controller upgrade scheduled.",
            SiteStatus::Delayed,
            "2025-01-04",
            (37.3382, -121.8863),
            7,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    site_id: &str,
    title: &str,
    description: &str,
    priority: TaskPriority,
    status: TaskStatus,
    due_date: &str,
    assignee: &str,
    category: TaskCategory,
) -> Task {
    Task {
        id: id.to_string(),
        site_id: site_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        priority,
        status,
        due_date: due_date.to_string(),
        assignee: assignee.to_string(),
        category,
        ..Default::default()
    }
}

pub fn sample_tasks() -> Vec<Task> {
    vec![
        task(
            "task-1",
            "site-1",
            "Seasonal pruning",
            "Prune flowering shrubs and remove dead branches.",
            TaskPriority::High,
            TaskStatus::InProgress,
            "2024-12-31",
            "Lucia Kim",
            TaskCategory::Maintenance,
        ),
        task(
            "task-2",
            "site-2",
            "Drainage inspection",
            "Check standing water after rainfall and clear gutters.",
            TaskPriority::Medium,
            TaskStatus::Todo,
            "2025-01-02",
            "Samir Patel",
            TaskCategory::Inspection,
        ),
        task(
            "task-3",
            "site-3",
            "Irrigation controller upgrade",
            "Replace controller and test zones 1-4.",
            TaskPriority::High,
            TaskStatus::Todo,
            "2025-01-03",
            "Karla Gomez",
            TaskCategory::Irrigation,
        ),
        task(
            "task-4",
            "site-1",
            "Mulch refresh",
            "Top up mulch on flower beds near main lobby.",
            TaskPriority::Low,
            TaskStatus::Done,
            "2024-12-27",
            "Omar Reed",
            TaskCategory::Landscaping,
        ),
    ]
}

pub fn sample_site_tasks() -> Vec<SiteTask> {
    vec![
        SiteTask {
            id: "site-task-1".to_string(),
            site_id: "site-1".to_string(),
            title: "Check irrigation coverage near lobby".to_string(),
            is_done: false,
            last_completed_on: None,
            notes: "Zone 3 sprinkler still needs adjustment.".to_string(),
        },
        SiteTask {
            id: "site-task-2".to_string(),
            site_id: "site-1".to_string(),
            title: "Refresh mulch by main walkway".to_string(),
            is_done: true,
            last_completed_on: Some("2024-12-28".to_string()),
            notes: "Completed during last visit; monitor for weeds.".to_string(),
        },
        SiteTask {
            id: "site-task-3".to_string(),
            site_id: "site-2".to_string(),
            title: "Inspect drainage near north entrance".to_string(),
            is_done: false,
            last_completed_on: None,
            notes: "Standing water after heavy rain.".to_string(),
        },
    ]
}

fn entry(day: &str, site_id: &str, tasks: &[&str], time_window: &str, crew_lead: &str) -> ScheduleEntry {
    ScheduleEntry {
        day: day.to_string(),
        site_id: site_id.to_string(),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
        time_window: Some(time_window.to_string()),
        crew_lead: Some(crew_lead.to_string()),
        notes: None,
    }
}

pub fn sample_schedule() -> Vec<ScheduleEntry> {
    vec![
        entry(
            "2024-12-31",
            "site-1",
            &["task-1", "task-4"],
            "8:00 AM - 12:00 PM",
            "Lucia Kim",
        ),
        entry("2025-01-02", "site-2", &["task-2"], "9:00 AM - 1:00 PM", "Samir Patel"),
        entry("2025-01-04", "site-3", &["task-3"], "7:00 AM - 11:00 AM", "Karla Gomez"),
    ]
}

pub fn sample_visit_logs() -> Vec<VisitLog> {
    vec![VisitLog {
        id: "visit-1".to_string(),
        site_id: "site-1".to_string(),
        visit_date: "2024-12-27".to_string(),
        crew_lead: "Omar Reed".to_string(),
        outcome: VisitOutcome::Completed,
        completed_tasks: vec!["Mulch refresh".to_string()],
        notes: Some("Beds by the lobby topped up.".to_string()),
        ..Default::default()
    }]
}

/// Sample schedule entries whose day falls inside `range`.
pub fn sample_entries_for_week(range: &WeekRange) -> Vec<ScheduleEntry> {
    sample_schedule()
        .into_iter()
        .filter(|e| range.contains_day(&e.day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_iso_date;

    #[test]
    fn test_sample_entries_never_leave_the_week() {
        let mut monday = parse_iso_date("2024-12-02").unwrap();
        for _ in 0..12 {
            let range = WeekRange::for_week_start(monday);
            for e in sample_entries_for_week(&range) {
                assert!(range.contains_day(&e.day), "{} outside {:?}", e.day, range);
            }
            monday += chrono::Duration::days(7);
        }
    }

    #[test]
    fn test_sample_entries_for_new_year_week() {
        let range = WeekRange::for_week_start(parse_iso_date("2024-12-30").unwrap());
        let entries = sample_entries_for_week(&range);
        assert_eq!(entries.len(), 3);

        let next = WeekRange::for_week_start(parse_iso_date("2025-01-06").unwrap());
        assert!(sample_entries_for_week(&next).is_empty());
    }

    #[test]
    fn test_sample_tasks_reference_sample_sites() {
        let site_ids: Vec<String> = sample_sites().into_iter().map(|s| s.id).collect();
        for t in sample_tasks() {
            assert!(site_ids.contains(&t.site_id), "{} has unknown site", t.id);
        }
    }
}
