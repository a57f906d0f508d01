// Visit log service: recording visits and listing a site's history.

use super::{fallback, Loaded};
use crate::dates::parse_iso_date;
use crate::error::{FieldOpsError, Result};
use crate::sample::sample_visit_logs;
use crate::source::DataSource;
use crate::types::VisitLog;

pub const VISIT_LOGS_FALLBACK_MESSAGE: &str =
    "Unable to load visit history. Showing sample data instead.";

/// Record a visit. The stored copy carries the generated id.
pub async fn log_visit(source: &dyn DataSource, visit: VisitLog) -> Result<VisitLog> {
    if visit.site_id.trim().is_empty() {
        return Err(FieldOpsError::Validation("Visit needs a site.".to_string()));
    }
    parse_iso_date(&visit.visit_date)?;
    let site_id = visit.site_id.clone();
    source.log_visit(visit).await.inspect_err(|e| {
        log::error!("Failed to log visit for site {site_id}: {e}");
    })
}

/// A site's visits, newest first.
pub async fn visit_history(source: &dyn DataSource, site_id: &str) -> Loaded<Vec<VisitLog>> {
    let result = source.visit_logs_by_site(site_id).await;
    fallback(
        source.kind(),
        "visit logs",
        result,
        || {
            let mut logs: Vec<VisitLog> = sample_visit_logs()
                .into_iter()
                .filter(|v| v.site_id == site_id)
                .collect();
            logs.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
            logs
        },
        VISIT_LOGS_FALLBACK_MESSAGE,
    )
}
