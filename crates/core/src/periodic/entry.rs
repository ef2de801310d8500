//! Index entries.

use chrono::NaiveDate;
use serde::Serialize;

use super::granularity::{Granularity, WeekRules};

/// Where the date of a periodic note was found.
///
/// Variants are ordered by precedence: a later variant always wins over an
/// earlier one for the same file or the same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Heuristically inferred from the filename.
    FilenameLoose,
    /// Parsed from the filename with one of the configured formats.
    FilenameStrict,
    /// Read from the frontmatter field named after the granularity.
    Frontmatter,
}

impl MatchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchSource::FilenameLoose => "filename-loose",
            MatchSource::FilenameStrict => "filename",
            MatchSource::Frontmatter => "frontmatter",
        }
    }
}

/// A file classified as the note for one calendar period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodicNoteEntry {
    pub file_path: String,
    pub date: NaiveDate,
    pub granularity: Granularity,
    /// `YYYY-MM-DD` rendering of `date`, used to order entries.
    pub canonical_date_key: String,
    pub match_source: MatchSource,
    pub is_exact: bool,
}

impl PeriodicNoteEntry {
    pub fn new(
        file_path: impl Into<String>,
        date: NaiveDate,
        granularity: Granularity,
        match_source: MatchSource,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            date,
            granularity,
            canonical_date_key: date.format("%Y-%m-%d").to_string(),
            match_source,
            is_exact: match_source != MatchSource::FilenameLoose,
        }
    }

    pub fn period_key(&self, weeks: WeekRules) -> PeriodKey {
        PeriodKey::new(self.granularity, self.date, weeks)
    }
}

/// Reverse index key: a granularity and the first day of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub granularity: Granularity,
    pub start: NaiveDate,
}

impl PeriodKey {
    pub fn new(granularity: Granularity, date: NaiveDate, weeks: WeekRules) -> Self {
        Self { granularity, start: granularity.period_start(date, weeks) }
    }
}
