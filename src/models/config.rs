use crate::models::{AppConfig, AppKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Persisted settings from `starrdesk.yaml`
///
/// Every field has a default so a missing or partial file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Language code of the message catalog
    pub lang: String,

    pub dark_mode: bool,

    pub log: LogConfig,

    /// Minimum duration of mutating remote calls, in milliseconds
    pub busy_floor_ms: u64,

    /// Starting directory for import/export files
    pub export_dir: String,

    /// Saved instances keyed by lowercase app kind
    pub instances: IndexMap<String, Vec<AppConfig>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            dark_mode: false,
            log: LogConfig::default(),
            busy_floor_ms: default_busy_floor_ms(),
            export_dir: String::new(),
            instances: AppKind::ALL
                .iter()
                .map(|kind| (kind.as_str().to_string(), Vec::new()))
                .collect(),
        }
    }
}

impl Settings {
    pub fn busy_floor(&self) -> Duration {
        Duration::from_millis(self.busy_floor_ms)
    }

    /// Saved instances for one application kind
    pub fn instances_for(&self, app: AppKind) -> &[AppConfig] {
        self.instances
            .get(app.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every saved instance, in settings order
    pub fn all_instances(&self) -> impl Iterator<Item = &AppConfig> {
        self.instances.values().flatten()
    }
}

fn default_busy_floor_ms() -> u64 {
    1000
}

/// Logging settings; `level` can be re-applied at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "info" or "starrdesk=debug"
    pub level: String,

    /// Directory for rotating log files
    pub dir: String,

    /// Log file prefix
    pub prefix: String,

    /// Mirror log output to the console
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            prefix: "starrdesk".to_string(),
            console: false,
        }
    }
}
