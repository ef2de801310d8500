//! Best-effort date extraction from arbitrary filenames.
//!
//! Used when a file does not match any configured format. Matches are
//! low-confidence: they are indexed, but never returned by point lookups.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::granularity::{Granularity, WeekRules};

static FULL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[-._]?(0[1-9]|1[0-2])[-._]?(0[1-9]|[12]\d|3[01])")
        .expect("valid regex")
});

static WEEK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-?[Ww](\d{1,2})\b").expect("valid regex"));

static QUARTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-?[Qq]([1-4])\b").expect("valid regex"));

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[-._](0[1-9]|1[0-2])(?:\D|$)").expect("valid regex")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));

/// A date inferred from a filename, with the granularity it most likely names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LooseMatch {
    pub date: NaiveDate,
    pub granularity: Granularity,
}

/// Infer a plausible date from a bare filename (no directory, no extension).
///
/// Patterns are tried from most to least specific; Zettelkasten timestamps
/// such as `202403151230 Meeting` resolve to their day.
pub fn loosely_matched_date(basename: &str, weeks: WeekRules) -> Option<LooseMatch> {
    if let Some(caps) = FULL_DATE_RE.captures(basename) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
        if let Some(date) = date {
            return Some(LooseMatch { date, granularity: Granularity::Day });
        }
    }

    if let Some(caps) = WEEK_RE.captures(basename)
        && let Some(date) = weeks.date_of_week(caps[1].parse().ok()?, caps[2].parse().ok()?, 0)
    {
        return Some(LooseMatch { date, granularity: Granularity::Week });
    }

    if let Some(caps) = QUARTER_RE.captures(basename) {
        let quarter: u32 = caps[2].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, (quarter - 1) * 3 + 1, 1)?;
        return Some(LooseMatch { date, granularity: Granularity::Quarter });
    }

    if let Some(caps) = MONTH_RE.captures(basename) {
        let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 1)?;
        return Some(LooseMatch { date, granularity: Granularity::Month });
    }

    let caps = YEAR_RE.captures(basename)?;
    let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, 1, 1)?;
    Some(LooseMatch { date, granularity: Granularity::Year })
}
