use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eventdex_engine::{AuthorId, TrackerSettings};
use eventdex_logging::{dex_info, dex_warn};
use serde::{Deserialize, Serialize};

pub(crate) const CONFIG_FILENAME: &str = "eventdex.ron";

/// On-disk configuration. Every field is optional so a partial file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub overall_deadline_secs: u64,
    pub idle_deadline_secs: u64,
    pub wait_slice_secs: u64,
    pub fetch_timeout_secs: u64,
    pub store_timeout_secs: u64,
    pub report_timeout_secs: u64,
    pub trusted_author: Option<AuthorId>,
    pub store_path: PathBuf,
    pub catalog_path: PathBuf,
    pub pages_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = TrackerSettings::default();
        Self {
            overall_deadline_secs: settings.overall_deadline.as_secs(),
            idle_deadline_secs: settings.idle_deadline.as_secs(),
            wait_slice_secs: settings.wait_slice.as_secs(),
            fetch_timeout_secs: settings.fetch_timeout.as_secs(),
            store_timeout_secs: settings.store_timeout.as_secs(),
            report_timeout_secs: settings.report_timeout.as_secs(),
            trusted_author: settings.trusted_author,
            store_path: PathBuf::from("eventdex_inventory.ron"),
            catalog_path: PathBuf::from("event_species.txt"),
            pages_dir: PathBuf::from("pages"),
        }
    }
}

impl AppConfig {
    pub(crate) fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            overall_deadline: Duration::from_secs(self.overall_deadline_secs),
            idle_deadline: Duration::from_secs(self.idle_deadline_secs),
            wait_slice: Duration::from_secs(self.wait_slice_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            store_timeout: Duration::from_secs(self.store_timeout_secs),
            report_timeout: Duration::from_secs(self.report_timeout_secs),
            trusted_author: self.trusted_author,
        }
    }
}

/// Loads the configuration, falling back to defaults when the file is missing or unreadable.
pub(crate) fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            dex_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            dex_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            dex_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join(CONFIG_FILENAME));

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tracker_settings(), TrackerSettings::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(idle_deadline_secs: 5, trusted_author: Some(42))").unwrap();

        let settings = load_config(&path).tracker_settings();

        assert_eq!(settings.idle_deadline, Duration::from_secs(5));
        assert_eq!(settings.overall_deadline, Duration::from_secs(300));
        assert_eq!(settings.trusted_author, Some(42));
    }

    #[test]
    fn unparsable_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "idle = 5").unwrap();

        assert_eq!(load_config(&path), AppConfig::default());
    }
}
