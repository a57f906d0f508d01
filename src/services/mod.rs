// Services layer: what each surface loads and how it degrades.
//
// Reads degrade to sample data with an advisory; failed writes are logged
// and reported on the returned outcome.

pub mod dashboard;
pub mod map;
pub mod schedule;
pub mod sites;
pub mod tasks;
pub mod visits;

use serde::Serialize;

use crate::error::{Advisory, Result};
use crate::source::SourceKind;

/// Where the data in a [`Loaded`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Sample,
}

impl From<SourceKind> for DataOrigin {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Live => DataOrigin::Live,
            SourceKind::Sample => DataOrigin::Sample,
        }
    }
}

/// A read result plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Loaded<T> {
    pub data: T,
    pub origin: DataOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

impl<T> Loaded<T> {
    pub fn sample(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Sample,
            advisory: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.advisory.is_some()
    }
}

/// Apply the read fallback rule to a source result.
///
/// Success keeps the source's data. `NotConfigured` switches to sample data
/// silently. Any other error is logged (as a warning when a retry could
/// succeed) and answered with sample data plus `message` as a read-fallback
/// advisory.
pub(crate) fn fallback<T>(
    kind: SourceKind,
    what: &str,
    result: Result<T>,
    sample: impl FnOnce() -> T,
    message: &str,
) -> Loaded<T> {
    match result {
        Ok(data) => Loaded {
            data,
            origin: kind.into(),
            advisory: None,
        },
        Err(e) if e.is_not_configured() => Loaded::sample(sample()),
        Err(e) => {
            if e.is_retryable() {
                log::warn!("Failed to load {what}: {e}. Using sample data.");
            } else {
                log::error!("Failed to load {what}: {e}. Using sample data.");
            }
            Loaded {
                data: sample(),
                origin: DataOrigin::Sample,
                advisory: Some(Advisory::read_fallback(message)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdvisoryKind, FieldOpsError};

    #[test]
    fn test_fallback_keeps_successful_data() {
        let loaded = fallback(SourceKind::Live, "sites", Ok(vec![1, 2]), Vec::new, "msg");
        assert_eq!(loaded.data, vec![1, 2]);
        assert_eq!(loaded.origin, DataOrigin::Live);
        assert!(!loaded.is_degraded());
    }

    #[test]
    fn test_fallback_not_configured_is_silent() {
        let loaded = fallback(
            SourceKind::Live,
            "sites",
            Err(FieldOpsError::NotConfigured),
            || vec![9],
            "msg",
        );
        assert_eq!(loaded.data, vec![9]);
        assert_eq!(loaded.origin, DataOrigin::Sample);
        assert!(loaded.advisory.is_none());
    }

    #[test]
    fn test_fallback_read_error_attaches_advisory() {
        let loaded: Loaded<Vec<i32>> = fallback(
            SourceKind::Live,
            "sites",
            Err(FieldOpsError::Decode("bad".to_string())),
            || vec![9],
            "Showing sample data.",
        );
        assert_eq!(loaded.data, vec![9]);
        let advisory = loaded.advisory.unwrap();
        assert_eq!(advisory.kind, AdvisoryKind::ReadFallback);
        assert_eq!(advisory.message, "Showing sample data.");
    }
}
