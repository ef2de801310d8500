use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::periodic::{IndexConfiguration, PeriodicConfig, WeekStart};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub vault_root: String,
    /// Folders to skip while listing notes (relative to vault_root).
    #[serde(default)]
    pub excluded_folders: Vec<String>,
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default)]
    pub periodic: PeriodicSection,
}

/// `[profiles.<name>.periodic.<granularity>]` tables.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodicSection {
    #[serde(default)]
    pub day: PeriodicConfig,
    #[serde(default)]
    pub week: PeriodicConfig,
    #[serde(default)]
    pub month: PeriodicConfig,
    #[serde(default)]
    pub quarter: PeriodicConfig,
    #[serde(default)]
    pub year: PeriodicConfig,
}

impl PeriodicSection {
    pub fn to_index_configuration(&self, week_start: WeekStart) -> IndexConfiguration {
        IndexConfiguration {
            day: self.day.clone(),
            week: self.week.clone(),
            month: self.month.clone(),
            quarter: self.quarter.clone(),
            year: self.year.clone(),
            week_start,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    /// Folders to skip while listing notes (resolved to absolute paths).
    pub excluded_folders: Vec<PathBuf>,
    pub periodic: IndexConfiguration,
    pub logging: LoggingConfig,
}
