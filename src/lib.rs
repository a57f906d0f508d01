pub mod config;
pub mod dates;
pub mod error;
pub mod queries;
pub mod sample;
pub mod services;
pub mod source;
pub mod state;
pub mod types;

use chrono::NaiveDate;
use serde::Serialize;

use error::Advisory;
use queries::map::MapView;
use queries::schedule::{TodayOverview, WeekView};
use services::dashboard::load_dashboard;
use services::map::TodayRoute;
use services::schedule::WeeklySchedule;
use source::SourceKind;
use state::AppState;
use types::DashboardSnapshot;

/// Everything the operations overview shows for one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub source: SourceKind,
    pub advisories: Vec<Advisory>,
    pub snapshot: DashboardSnapshot,
    pub week: WeekView,
    pub today: TodayOverview,
    pub map: MapView,
}

/// Load the dashboard, the week containing `today` and today's route.
pub async fn overview(state: &AppState, today: NaiveDate) -> Overview {
    let source = state.source.clone();
    let dashboard = load_dashboard(source.as_ref()).await;
    let schedule = WeeklySchedule::open(source.clone(), today).await;
    let route = TodayRoute::open(source, today, state.config.map_enabled()).await;

    let advisories = [
        dashboard.advisory.as_ref(),
        schedule.advisory(),
        route.advisory(),
    ]
    .into_iter()
    .flatten()
    .cloned()
    .collect();

    Overview {
        source: state.source_kind(),
        advisories,
        snapshot: dashboard.snapshot,
        week: schedule.week_view(&dashboard.sites, &dashboard.tasks, today),
        today: schedule.today_overview(&dashboard.sites, &dashboard.tasks, today),
        map: route.view(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::source::testing::FailingSource;

    #[tokio::test]
    async fn test_sample_overview_for_new_year_week() {
        let state = AppState::sample();
        let today = dates::parse_iso_date("2024-12-31").unwrap();
        let overview = overview(&state, today).await;

        assert_eq!(overview.source, SourceKind::Sample);
        assert!(overview.advisories.is_empty());
        assert_eq!(overview.snapshot.site_count, 3);
        assert_eq!(overview.week.week_start, "2024-12-30");
        assert!(overview.week.days[1].is_today);
        assert_eq!(overview.today.visits.len(), 1);
        assert_eq!(overview.today.visits[0].site_name, "Green Meadows Estate");
        assert_eq!(overview.map.route, vec!["site-1"]);
    }

    #[tokio::test]
    async fn test_failing_source_collects_advisories() {
        let state = AppState::with_source(Config::default(), Arc::new(FailingSource));
        let today = dates::parse_iso_date("2024-12-31").unwrap();
        let overview = overview(&state, today).await;

        assert_eq!(overview.advisories.len(), 3);
        assert_eq!(overview.snapshot.visits_scheduled, 3);
        assert!(!overview.week.is_empty);
    }
}
