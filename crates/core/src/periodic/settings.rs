//! Per-granularity folder/format settings consumed by the index.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::granularity::{Granularity, WeekRules};

/// Settings for one granularity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodicConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Folder holding the notes; empty or `/` means the whole vault.
    #[serde(default)]
    pub folder: String,
    /// Moment-style filename format; empty means the granularity default.
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub template_path: String,
}

impl PeriodicConfig {
    pub fn enabled(folder: &str, format: &str) -> Self {
        Self {
            enabled: true,
            folder: folder.to_string(),
            format: format.to_string(),
            template_path: String::new(),
        }
    }

    /// Folder without leading or trailing slashes; the vault root is `""`.
    pub fn normalized_folder(&self) -> &str {
        self.folder.trim().trim_matches('/')
    }

    /// Whether a vault path lies inside this granularity's folder.
    pub fn contains(&self, path: &str) -> bool {
        let folder = self.normalized_folder();
        folder.is_empty()
            || path
                .strip_prefix(folder)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    pub fn effective_format(&self, granularity: Granularity) -> &str {
        match self.format.trim() {
            "" => granularity.default_format(),
            format => format,
        }
    }

    pub fn template(&self) -> Option<&str> {
        Some(self.template_path.trim()).filter(|t| !t.is_empty())
    }
}

/// First day of the week used for week notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Tuesday => Weekday::Tue,
            WeekStart::Wednesday => Weekday::Wed,
            WeekStart::Thursday => Weekday::Thu,
            WeekStart::Friday => Weekday::Fri,
            WeekStart::Saturday => Weekday::Sat,
        }
    }
}

/// Folder/format settings for every granularity.
///
/// The index treats this as an immutable snapshot; replacing it resets the
/// whole index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfiguration {
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
    #[serde(default)]
    pub week_start: WeekStart,
}

impl IndexConfiguration {
    pub fn get(&self, granularity: Granularity) -> &PeriodicConfig {
        match granularity {
            Granularity::Day => &self.day,
            Granularity::Week => &self.week,
            Granularity::Month => &self.month,
            Granularity::Quarter => &self.quarter,
            Granularity::Year => &self.year,
        }
    }

    pub fn get_mut(&mut self, granularity: Granularity) -> &mut PeriodicConfig {
        match granularity {
            Granularity::Day => &mut self.day,
            Granularity::Week => &mut self.week,
            Granularity::Month => &mut self.month,
            Granularity::Quarter => &mut self.quarter,
            Granularity::Year => &mut self.year,
        }
    }

    /// Builder-style helper used by hosts and tests.
    pub fn with(mut self, granularity: Granularity, config: PeriodicConfig) -> Self {
        *self.get_mut(granularity) = config;
        self
    }

    pub fn is_enabled(&self, granularity: Granularity) -> bool {
        self.get(granularity).enabled
    }

    /// Enabled granularities, finest first.
    pub fn enabled_granularities(&self) -> Vec<Granularity> {
        Granularity::ALL.into_iter().filter(|g| self.is_enabled(*g)).collect()
    }

    pub fn week_rules(&self) -> WeekRules {
        WeekRules::starting_on(self.week_start.weekday())
    }

    /// Whether a path lies in the folder of any enabled granularity.
    pub fn watches(&self, path: &str) -> bool {
        Granularity::ALL.into_iter().any(|g| self.is_enabled(g) && self.get(g).contains(path))
    }
}
