//! Runtime configuration.
//!
//! Read from `~/.fieldops/config.json` (or the file named by
//! `FIELDOPS_CONFIG`), then overridden by environment variables. Live mode
//! needs every required Firebase value; anything missing routes all reads
//! to the sample dataset.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_PATH_ENV: &str = "FIELDOPS_CONFIG";

/// Firebase web-app settings. Only `project_id` and `api_key` are used on
/// the wire; the rest gate live mode the same way the web client did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
    /// Override for the Firestore REST endpoint (emulator, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl FirebaseConfig {
    /// All required values present and non-empty.
    pub fn is_configured(&self) -> bool {
        [
            &self.api_key,
            &self.auth_domain,
            &self.project_id,
            &self.storage_bucket,
            &self.messaging_sender_id,
            &self.app_id,
        ]
        .into_iter()
        .all(present)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            firebase: FirebaseConfig::default(),
            maps_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Interactive map is shown only with a maps key; otherwise a placeholder.
    pub fn map_enabled(&self) -> bool {
        present(&self.maps_api_key)
    }

    pub fn live_enabled(&self) -> bool {
        self.firebase.is_configured()
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fb = &mut self.firebase;
        let slots: [(&str, &mut Option<String>); 7] = [
            ("FIREBASE_API_KEY", &mut fb.api_key),
            ("FIREBASE_AUTH_DOMAIN", &mut fb.auth_domain),
            ("FIREBASE_PROJECT_ID", &mut fb.project_id),
            ("FIREBASE_STORAGE_BUCKET", &mut fb.storage_bucket),
            ("FIREBASE_MESSAGING_SENDER_ID", &mut fb.messaging_sender_id),
            ("FIREBASE_APP_ID", &mut fb.app_id),
            ("FIREBASE_MEASUREMENT_ID", &mut fb.measurement_id),
        ];
        for (key, slot) in slots {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
        if let Some(url) = lookup("FIRESTORE_BASE_URL") {
            fb.base_url = Some(url);
        }
        if let Some(key) = lookup("GOOGLE_MAPS_API_KEY") {
            self.maps_api_key = Some(key);
        }
    }
}

/// `~/.fieldops/config.json`, unless `FIELDOPS_CONFIG` names another file.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::home_dir().map(|home| home.join(".fieldops").join("config.json"))
}

/// Read a config file. A missing file is not an error and yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Config file (if any) with environment overrides applied.
pub fn load_config() -> Result<Config> {
    let mut config = match default_config_path() {
        Some(path) => load_config_from(&path)?,
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_AUTH_DOMAIN", "crew.firebaseapp.com"),
            ("FIREBASE_PROJECT_ID", "crew"),
            ("FIREBASE_STORAGE_BUCKET", "crew.appspot.com"),
            ("FIREBASE_MESSAGING_SENDER_ID", "1234"),
            ("FIREBASE_APP_ID", "1:1234:web:abcd"),
        ])
    }

    #[test]
    fn test_all_required_values_enable_live_mode() {
        let env = full_env();
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert!(config.live_enabled());
        assert!(config.firebase.measurement_id.is_none());
    }

    #[test]
    fn test_any_missing_value_disables_live_mode() {
        for missing in full_env().keys() {
            let mut env = full_env();
            env.remove(missing);
            let mut config = Config::default();
            config.apply_env(|k| env.get(k).map(|v| v.to_string()));
            assert!(!config.live_enabled(), "{missing} absent");
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("FIREBASE_APP_ID", "  ");
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert!(!config.live_enabled());
    }

    #[test]
    fn test_map_enabled_requires_key() {
        let mut config = Config::default();
        assert!(!config.map_enabled());
        config.apply_env(|k| (k == "GOOGLE_MAPS_API_KEY").then(|| "maps-key".to_string()));
        assert!(config.map_enabled());
    }

    #[test]
    fn test_load_config_from_file_then_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "firebase": {{ "projectId": "from-file", "apiKey": "file-key" }}, "requestTimeoutSecs": 5 }}"#
        )
        .unwrap();

        let mut config = load_config_from(file.path()).unwrap();
        assert_eq!(config.firebase.project_id.as_deref(), Some("from-file"));
        assert_eq!(config.request_timeout_secs, 5);

        config.apply_env(|k| (k == "FIREBASE_PROJECT_ID").then(|| "from-env".to_string()));
        assert_eq!(config.firebase.project_id.as_deref(), Some("from-env"));
        assert_eq!(config.firebase.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.json")).unwrap();
        assert!(!config.live_enabled());
        assert_eq!(config.request_timeout_secs, 15);
    }
}
