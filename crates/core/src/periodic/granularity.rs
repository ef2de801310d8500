//! Period granularities and calendar normalization.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The bucket size a periodic note represents.
///
/// Variants are declared finest first; the derived ordering is the total
/// order used by range queries (day < week < month < quarter < year).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// All granularities in resolution priority order (finest first).
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// Format used when no format is configured, and for frontmatter values.
    pub fn default_format(self) -> &'static str {
        match self {
            Granularity::Day => "YYYY-MM-DD",
            Granularity::Week => "gggg-[W]ww",
            Granularity::Month => "YYYY-MM",
            Granularity::Quarter => "YYYY-[Q]Q",
            Granularity::Year => "YYYY",
        }
    }

    /// First day of the period containing `date`.
    pub fn period_start(self, date: NaiveDate, weeks: WeekRules) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => weeks.start_of_week(date),
            Granularity::Month => date.with_day(1).unwrap_or(date),
            Granularity::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// Whether two dates fall inside the same period of this granularity.
    pub fn same_period(self, a: NaiveDate, b: NaiveDate, weeks: WeekRules) -> bool {
        self.period_start(a, weeks) == self.period_start(b, weeks)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown granularity: {0} (expected day, week, month, quarter or year)")]
pub struct UnknownGranularity(pub String);

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            "quarter" | "quarterly" => Ok(Granularity::Quarter),
            "year" | "yearly" => Ok(Granularity::Year),
            _ => Err(UnknownGranularity(s.to_string())),
        }
    }
}

/// Locale-style week numbering.
///
/// Week 1 of a week-year is the week containing January `first_week_day`.
/// A Monday start uses the ISO rule (January 4th); any other start uses the
/// week containing January 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRules {
    pub first_day: Weekday,
    pub first_week_day: u32,
}

impl WeekRules {
    pub const ISO: WeekRules = WeekRules { first_day: Weekday::Mon, first_week_day: 4 };

    pub fn starting_on(first_day: Weekday) -> Self {
        if first_day == Weekday::Mon {
            Self::ISO
        } else {
            Self { first_day, first_week_day: 1 }
        }
    }

    pub fn start_of_week(self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.first_day.num_days_from_monday())
            % 7;
        date - Duration::days(i64::from(offset))
    }

    /// Zero-based position of `date` within its week.
    pub fn day_of_week(self, date: NaiveDate) -> u32 {
        (7 + date.weekday().num_days_from_monday() - self.first_day.num_days_from_monday())
            % 7
    }

    /// First day of week 1 of `week_year`.
    pub fn week_one_start(self, week_year: i32) -> Option<NaiveDate> {
        let anchor = NaiveDate::from_ymd_opt(week_year, 1, self.first_week_day)?;
        Some(self.start_of_week(anchor))
    }

    pub fn weeks_in_year(self, week_year: i32) -> Option<u32> {
        let start = self.week_one_start(week_year)?;
        let next = self.week_one_start(week_year + 1)?;
        u32::try_from((next - start).num_days() / 7).ok()
    }

    /// Week-year and week number (1-based) of `date`.
    pub fn week_of(self, date: NaiveDate) -> (i32, u32) {
        let year = date.year();
        let week_year = match self.week_one_start(year + 1) {
            Some(next) if date >= next => year + 1,
            _ => match self.week_one_start(year) {
                Some(start) if date < start => year - 1,
                _ => year,
            },
        };
        let start = self.week_one_start(week_year).unwrap_or(date);
        let week = (self.start_of_week(date) - start).num_days() / 7 + 1;
        (week_year, u32::try_from(week).unwrap_or(1))
    }

    /// Date of the given day (zero-based from the week start) of a week.
    pub fn date_of_week(self, week_year: i32, week: u32, day: u32) -> Option<NaiveDate> {
        if week == 0 || week > self.weeks_in_year(week_year)? || day > 6 {
            return None;
        }
        let start = self.week_one_start(week_year)?;
        Some(start + Duration::days(i64::from((week - 1) * 7 + day)))
    }
}

impl Default for WeekRules {
    fn default() -> Self {
        Self::ISO
    }
}
