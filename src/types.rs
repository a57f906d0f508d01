//! Domain records shared by every data source.
//!
//! Field names serialize in camelCase and enum values in snake_case so the
//! same structs round-trip through the Firestore document codec and the
//! JSON view models.

use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Site health as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    #[default]
    OnTrack,
    AtRisk,
    Delayed,
}

impl SiteStatus {
    pub fn label(self) -> &'static str {
        match self {
            SiteStatus::OnTrack => "On track",
            SiteStatus::AtRisk => "At risk",
            SiteStatus::Delayed => "Delayed",
        }
    }
}

/// How often a site is visited.
///
/// Stored documents also carry the display spellings ("Weekly",
/// "Bi-weekly", "Monthly"); those are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFrequency {
    #[default]
    #[serde(alias = "Weekly")]
    Weekly,
    #[serde(alias = "Fortnightly", alias = "Bi-weekly", alias = "bi_weekly", alias = "biweekly")]
    Fortnightly,
    #[serde(alias = "Monthly")]
    Monthly,
}

impl ServiceFrequency {
    pub fn label(self) -> &'static str {
        match self {
            ServiceFrequency::Weekly => "Weekly",
            ServiceFrequency::Fortnightly => "Bi-weekly",
            ServiceFrequency::Monthly => "Monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn label(self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

/// Task workflow state. Any state may be set directly from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To do",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Completed",
        }
    }

    pub fn is_open(self) -> bool {
        self != TaskStatus::Done
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    #[default]
    Maintenance,
    Landscaping,
    Irrigation,
    Inspection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOutcome {
    #[default]
    Completed,
    Partial,
    Missed,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A serviced property.
///
/// Every field defaults so a sparse stored document still decodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact_name: String,
    pub contact_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: SiteStatus,
    pub coordinates: Coordinates,
    pub service_frequency: ServiceFrequency,
    pub notes: String,
    pub next_visit: String,
    pub active_tasks: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Partial site update: only the populated fields are written.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SiteStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_visit: Option<String>,
}

impl SitePatch {
    pub fn apply(&self, site: &mut Site) {
        if let Some(status) = self.status {
            site.status = status;
        }
        if let Some(ref notes) = self.notes {
            site.notes = notes.clone();
        }
        if let Some(ref next_visit) = self.next_visit {
            site.next_visit = next_visit.clone();
        }
    }
}

/// A unit of maintenance work tied to a site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub site_id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: String,
    pub assignee: String,
    pub category: TaskCategory,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Site-scoped checklist item shown on the site detail page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteTask {
    pub id: String,
    pub site_id: String,
    pub title: String,
    pub is_done: bool,
    pub last_completed_on: Option<String>,
    pub notes: String,
}

/// Assignment of a site's tasks to one calendar day.
///
/// Keyed by `(day, site_id)`; see [`ScheduleEntry::key`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleEntry {
    /// ISO date (YYYY-MM-DD). Older `schedule` documents call it `date`.
    #[serde(alias = "date")]
    pub day: String,
    pub site_id: String,
    pub tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_lead: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScheduleEntry {
    /// Deterministic document id: one entry per site per day.
    pub fn key(&self) -> String {
        format!("{}-{}", self.day, self.site_id)
    }

    pub fn same_slot(&self, other: &ScheduleEntry) -> bool {
        self.day == other.day && self.site_id == other.site_id
    }
}

/// Record of the work done during an actual visit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitLog {
    pub id: String,
    pub site_id: String,
    pub visit_date: String,
    pub crew_lead: String,
    pub outcome: VisitOutcome,
    /// Free-text labels, not task references.
    pub completed_tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Summary counts for the dashboard header. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub site_count: usize,
    pub tasks_due_this_week: usize,
    pub high_priority_tasks: usize,
    pub visits_scheduled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_site_document_fills_defaults() {
        let site: Site = serde_json::from_value(serde_json::json!({
            "name": "Green Meadows Estate"
        }))
        .unwrap();
        assert_eq!(site.name, "Green Meadows Estate");
        assert_eq!(site.status, SiteStatus::OnTrack);
        assert_eq!(site.coordinates, Coordinates { lat: 0.0, lng: 0.0 });
        assert_eq!(site.active_tasks, 0);
    }

    #[test]
    fn test_service_frequency_accepts_display_spellings() {
        let freq: ServiceFrequency = serde_json::from_str("\"Bi-weekly\"").unwrap();
        assert_eq!(freq, ServiceFrequency::Fortnightly);
        let freq: ServiceFrequency = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(freq, ServiceFrequency::Monthly);
    }

    #[test]
    fn test_task_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskStatus::Done.label(), "Completed");
        assert!(!TaskStatus::Done.is_open());
    }

    #[test]
    fn test_schedule_entry_key_and_legacy_date_field() {
        let entry: ScheduleEntry = serde_json::from_value(serde_json::json!({
            "date": "2024-12-31",
            "siteId": "site-1",
            "tasks": ["task-1"]
        }))
        .unwrap();
        assert_eq!(entry.day, "2024-12-31");
        assert_eq!(entry.key(), "2024-12-31-site-1");
    }

    #[test]
    fn test_site_patch_touches_only_populated_fields() {
        let mut site = Site {
            notes: "Keep".to_string(),
            ..Default::default()
        };
        let patch = SitePatch {
            status: Some(SiteStatus::Delayed),
            ..Default::default()
        };
        patch.apply(&mut site);
        assert_eq!(site.status, SiteStatus::Delayed);
        assert_eq!(site.notes, "Keep");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "delayed" }));
    }
}
