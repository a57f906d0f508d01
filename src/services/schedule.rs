// Schedule service: weekly schedule loading, refresh and entry saves.
// Holds one week of entries for the planner surface.

use std::sync::Arc;

use chrono::NaiveDate;

use super::{fallback, DataOrigin, Loaded};
use crate::dates::{start_of_week, WeekRange};
use crate::error::{Advisory, Result};
use crate::queries::schedule::{build_week_view, today_overview, TodayOverview, WeekView};
use crate::sample::sample_entries_for_week;
use crate::source::DataSource;
use crate::types::{ScheduleEntry, Site, Task};

pub const LOAD_FALLBACK_MESSAGE: &str =
    "Unable to load schedule from Firestore. Showing sample data instead.";
pub const REFRESH_FAILED_MESSAGE: &str = "Unable to refresh schedule. Please try again.";

/// Entries for the week starting `week_start`, or the sample entries for
/// that week when the source cannot answer.
pub async fn load_week(source: &dyn DataSource, week_start: NaiveDate) -> Loaded<Vec<ScheduleEntry>> {
    let range = WeekRange::for_week_start(week_start);
    let result = source.weekly_schedule(&range).await;
    fallback(
        source.kind(),
        "weekly schedule",
        result,
        || sample_entries_for_week(&range),
        LOAD_FALLBACK_MESSAGE,
    )
}

/// One week of the planner: the loaded entries plus the last advisory.
pub struct WeeklySchedule {
    source: Arc<dyn DataSource>,
    week_start: NaiveDate,
    entries: Vec<ScheduleEntry>,
    origin: DataOrigin,
    advisory: Option<Advisory>,
}

impl WeeklySchedule {
    /// Open the week containing `date`.
    pub async fn open(source: Arc<dyn DataSource>, date: NaiveDate) -> Self {
        let week_start = start_of_week(date);
        let loaded = load_week(source.as_ref(), week_start).await;
        Self {
            source,
            week_start,
            entries: loaded.data,
            origin: loaded.origin,
            advisory: loaded.advisory,
        }
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn range(&self) -> WeekRange {
        WeekRange::for_week_start(self.week_start)
    }

    pub fn range_label(&self) -> String {
        self.range().label()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn origin(&self) -> DataOrigin {
        self.origin
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    /// Move to the week containing `date` and load it.
    pub async fn go_to(&mut self, date: NaiveDate) {
        let week_start = start_of_week(date);
        let loaded = load_week(self.source.as_ref(), week_start).await;
        self.week_start = week_start;
        self.entries = loaded.data;
        self.origin = loaded.origin;
        self.advisory = loaded.advisory;
    }

    /// Jump back to the current week.
    pub async fn go_to_today(&mut self, today: NaiveDate) {
        self.go_to(today).await;
    }

    /// Reload the current week.
    ///
    /// A failed refresh does not substitute sample data: the entries already
    /// on screen stay and the advisory asks the user to retry.
    pub async fn refresh(&mut self) -> Option<&Advisory> {
        let range = self.range();
        match self.source.weekly_schedule(&range).await {
            Ok(entries) => {
                self.entries = entries;
                self.origin = self.source.kind().into();
                self.advisory = None;
            }
            Err(e) if e.is_not_configured() => {
                self.entries = sample_entries_for_week(&range);
                self.origin = DataOrigin::Sample;
                self.advisory = None;
            }
            Err(e) => {
                log::error!("Failed to refresh weekly schedule: {e}");
                self.advisory = Some(Advisory::read_failed(REFRESH_FAILED_MESSAGE));
            }
        }
        self.advisory.as_ref()
    }

    /// Persist `entry`, then mirror it locally: the entry for the same
    /// (day, site) is replaced, otherwise it is appended.
    ///
    /// The local copy is untouched when the write fails.
    pub async fn save_entry(&mut self, entry: ScheduleEntry) -> Result<()> {
        if let Err(e) = self.source.upsert_schedule_entry(&entry).await {
            log::error!("Failed to save schedule entry {}: {e}", entry.key());
            return Err(e);
        }
        match self.entries.iter().position(|e| e.same_slot(&entry)) {
            Some(idx) => self.entries[idx] = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    pub fn week_view(&self, sites: &[Site], tasks: &[Task], today: NaiveDate) -> WeekView {
        build_week_view(self.week_start, &self.entries, sites, tasks, today)
    }

    pub fn today_overview(&self, sites: &[Site], tasks: &[Task], today: NaiveDate) -> TodayOverview {
        today_overview(&self.entries, sites, tasks, today)
    }
}
