//! Weekly planner view model: day columns and the today overview.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{day_label, to_iso, WeekRange};
use crate::types::{ScheduleEntry, Site, Task};

const UNASSIGNED_SITE: &str = "Unassigned site";
const LOCATION_PENDING: &str = "Location pending";
/// Task titles shown per visit in the today overview.
const TODAY_TASK_PREVIEW: usize = 3;

/// One site visit as rendered in a day column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitCard {
    pub key: String,
    pub site_id: String,
    pub site_name: String,
    pub city: String,
    /// Title per task id; ids with no matching task are shown as-is.
    pub task_titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_lead: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: String,
    pub label: String,
    pub is_today: bool,
    pub visits: Vec<VisitCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub week_start: String,
    pub week_end: String,
    pub range_label: String,
    pub days: Vec<DayBucket>,
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayVisit {
    pub site_name: String,
    pub city: String,
    pub task_titles: Vec<String>,
    /// Tasks beyond the preview.
    pub more_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayOverview {
    pub date: String,
    pub visits: Vec<TodayVisit>,
}

/// Id → record lookups built once per view.
struct Lookup<'a> {
    sites: HashMap<&'a str, &'a Site>,
    tasks: HashMap<&'a str, &'a Task>,
}

impl<'a> Lookup<'a> {
    fn new(sites: &'a [Site], tasks: &'a [Task]) -> Self {
        Self {
            sites: sites.iter().map(|s| (s.id.as_str(), s)).collect(),
            tasks: tasks.iter().map(|t| (t.id.as_str(), t)).collect(),
        }
    }

    fn task_title(&self, task_id: &str) -> String {
        self.tasks
            .get(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| task_id.to_string())
    }

    fn site_labels(&self, site_id: &str) -> (String, String) {
        match self.sites.get(site_id) {
            Some(site) => (site.name.clone(), site.city.clone()),
            None => (UNASSIGNED_SITE.to_string(), LOCATION_PENDING.to_string()),
        }
    }

    fn visit_card(&self, entry: &ScheduleEntry) -> VisitCard {
        let (site_name, city) = self.site_labels(&entry.site_id);
        VisitCard {
            key: entry.key(),
            site_id: entry.site_id.clone(),
            site_name,
            city,
            task_titles: entry.tasks.iter().map(|id| self.task_title(id)).collect(),
            time_window: entry.time_window.clone(),
            crew_lead: entry.crew_lead.clone(),
        }
    }
}

/// Bucket a week's entries into Monday..Sunday columns.
///
/// `today` marks at most one bucket by exact ISO-date equality; entries
/// outside the week are not shown in any bucket.
pub fn build_week_view(
    week_start: NaiveDate,
    entries: &[ScheduleEntry],
    sites: &[Site],
    tasks: &[Task],
    today: NaiveDate,
) -> WeekView {
    let range = WeekRange::for_week_start(week_start);
    let lookup = Lookup::new(sites, tasks);
    let today_iso = to_iso(today);

    let days: Vec<DayBucket> = range
        .days()
        .into_iter()
        .map(|date| {
            let iso = to_iso(date);
            let visits = entries
                .iter()
                .filter(|e| e.day == iso)
                .map(|e| lookup.visit_card(e))
                .collect();
            DayBucket {
                is_today: iso == today_iso,
                label: day_label(date),
                date: iso,
                visits,
            }
        })
        .collect();

    let is_empty = days.iter().all(|d| d.visits.is_empty());
    WeekView {
        week_start: range.start_iso(),
        week_end: range.end_iso(),
        range_label: range.label(),
        days,
        is_empty,
    }
}

/// Visits scheduled for `today`, each with a short task preview.
pub fn today_overview(
    entries: &[ScheduleEntry],
    sites: &[Site],
    tasks: &[Task],
    today: NaiveDate,
) -> TodayOverview {
    let lookup = Lookup::new(sites, tasks);
    let today_iso = to_iso(today);

    let visits = entries
        .iter()
        .filter(|e| e.day == today_iso)
        .map(|e| {
            let (site_name, city) = lookup.site_labels(&e.site_id);
            let task_titles: Vec<String> = e
                .tasks
                .iter()
                .take(TODAY_TASK_PREVIEW)
                .map(|id| lookup.task_title(id))
                .collect();
            TodayVisit {
                site_name,
                city,
                more_count: e.tasks.len() - task_titles.len(),
                task_titles,
            }
        })
        .collect();

    TodayOverview {
        date: today_iso,
        visits,
    }
}
