//! Application state shared across services.

use std::sync::Arc;

use crate::config::{load_config, Config};
use crate::source::{self, DataSource, SampleSource, SourceKind};

/// Process-wide state: the loaded config and the one data source every
/// service reads through.
pub struct AppState {
    pub config: Config,
    pub source: Arc<dyn DataSource>,
}

impl AppState {
    /// Load config from file and environment and pick the data source.
    ///
    /// An unreadable config file is logged and treated as empty, so the
    /// app still starts on sample data.
    pub fn new() -> Self {
        let config = match load_config() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {e}. Using defaults.");
                Config::default()
            }
        };
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let source = source::from_config(&config);
        Self { config, source }
    }

    pub fn with_source(config: Config, source: Arc<dyn DataSource>) -> Self {
        Self { config, source }
    }

    /// Sample-only state, independent of the environment.
    pub fn sample() -> Self {
        Self::with_source(Config::default(), Arc::new(SampleSource::new()))
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_runs_on_sample_data() {
        let state = AppState::with_config(Config::default());
        assert_eq!(state.source_kind(), SourceKind::Sample);
        assert!(!state.config.map_enabled());
    }
}
