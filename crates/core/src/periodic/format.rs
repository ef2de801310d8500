//! Moment-style date formats: strict parsing and formatting.
//!
//! Periodic note filenames are described with the token syntax used by most
//! note-taking apps (`YYYY-MM-DD`, `gggg-[W]ww`, `YYYY-[Q]Q`, ...). Text
//! inside `[...]` is literal, and so is any character that is not a token.
//!
//! Parsing is strict: the whole input must be consumed, padded tokens need
//! exactly two digits, and the resulting date must exist.

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;

use super::granularity::{Granularity, WeekRules};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] =
    ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

const WEEKDAY_MIN: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Characters that cannot appear in a note filename.
const ILLEGAL_FILENAME_CHARS: [char; 8] = ['\\', ':', '*', '?', '"', '<', '>', '|'];

/// Errors reported when validating a configured format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("format '{0}' contains no date tokens")]
    NoDateTokens(String),

    #[error("format '{0}' has no year token")]
    MissingYear(String),

    #[error("format '{format}' produces illegal filename character '{ch}'")]
    IllegalCharacter { format: String, ch: char },

    #[error("format '{format}' cannot parse its own output '{output}'")]
    RoundTrip { format: String, output: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year,
    ShortYear,
    WeekYear,
    IsoWeekYear,
    Quarter,
    MonthName,
    MonthAbbr,
    Month { padded: bool },
    DayOfYear { padded: bool },
    Day { padded: bool },
    DayOrdinal,
    Week { padded: bool },
    IsoWeek { padded: bool },
    WeekdayName,
    WeekdayAbbr,
    WeekdayMin,
    WeekdayNum,
    LocaleWeekday,
    IsoWeekday,
    Hour { padded: bool },
    Minute { padded: bool },
    Second { padded: bool },
}

/// Token spellings, longest first so that `DDDD` wins over `DD`.
static TOKEN_TABLE: [(&str, Token); 30] = [
    ("YYYY", Token::Year),
    ("GGGG", Token::IsoWeekYear),
    ("gggg", Token::WeekYear),
    ("MMMM", Token::MonthName),
    ("DDDD", Token::DayOfYear { padded: true }),
    ("dddd", Token::WeekdayName),
    ("MMM", Token::MonthAbbr),
    ("DDD", Token::DayOfYear { padded: false }),
    ("ddd", Token::WeekdayAbbr),
    ("YY", Token::ShortYear),
    ("MM", Token::Month { padded: true }),
    ("Do", Token::DayOrdinal),
    ("DD", Token::Day { padded: true }),
    ("ww", Token::Week { padded: true }),
    ("WW", Token::IsoWeek { padded: true }),
    ("dd", Token::WeekdayMin),
    ("HH", Token::Hour { padded: true }),
    ("mm", Token::Minute { padded: true }),
    ("ss", Token::Second { padded: true }),
    ("Q", Token::Quarter),
    ("M", Token::Month { padded: false }),
    ("D", Token::Day { padded: false }),
    ("w", Token::Week { padded: false }),
    ("W", Token::IsoWeek { padded: false }),
    ("d", Token::WeekdayNum),
    ("e", Token::LocaleWeekday),
    ("E", Token::IsoWeekday),
    ("H", Token::Hour { padded: false }),
    ("m", Token::Minute { padded: false }),
    ("s", Token::Second { padded: false }),
];

/// A compiled date format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    source: String,
    tokens: Vec<Token>,
}

/// Date components collected while parsing.
#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    week_year: Option<i32>,
    iso_week_year: Option<i32>,
    quarter: Option<u32>,
    month: Option<u32>,
    day: Option<u32>,
    day_of_year: Option<u32>,
    week: Option<u32>,
    iso_week: Option<u32>,
    weekday: Option<Weekday>,
    locale_weekday: Option<u32>,
    iso_weekday: Option<u32>,
}

impl DateFormat {
    pub fn new(format: &str) -> Self {
        Self { source: format.to_string(), tokens: tokenize(format) }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of path segments a formatted date spans (`YYYY/MM/DD` spans 3).
    pub fn nesting_depth(&self) -> usize {
        let slashes: usize = self
            .tokens
            .iter()
            .map(|t| match t {
                Token::Literal(s) => s.matches('/').count(),
                _ => 0,
            })
            .sum();
        slashes + 1
    }

    fn has_date_tokens(&self) -> bool {
        self.tokens.iter().any(|t| !matches!(t, Token::Literal(_)))
    }

    fn has_year(&self) -> bool {
        self.tokens.iter().any(|t| {
            matches!(t, Token::Year | Token::ShortYear | Token::WeekYear | Token::IsoWeekYear)
        })
    }

    fn has_week(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Week { .. } | Token::IsoWeek { .. }))
    }

    fn has_month_or_day(&self) -> bool {
        self.tokens.iter().any(|t| {
            matches!(
                t,
                Token::Month { .. }
                    | Token::MonthName
                    | Token::MonthAbbr
                    | Token::Day { .. }
                    | Token::DayOrdinal
                    | Token::DayOfYear { .. }
            )
        })
    }

    /// Strictly parse `input`, returning the date it names.
    pub fn parse(&self, input: &str, weeks: WeekRules) -> Option<NaiveDate> {
        let mut rest = input;
        let mut fields = Fields::default();

        for token in &self.tokens {
            rest = parse_token(token, rest, &mut fields)?;
        }
        if !rest.is_empty() {
            return None;
        }

        fields.into_date(weeks)
    }

    /// Render `date` with this format.
    pub fn format(&self, date: NaiveDate, weeks: WeekRules) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            format_token(token, date, weeks, &mut out);
        }
        out
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn tokenize(format: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = format;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[')
            && let Some(end) = after.find(']')
        {
            literal.push_str(&after[..end]);
            rest = &after[end + 1..];
            continue;
        }

        if let Some((spelling, token)) =
            TOKEN_TABLE.iter().find(|(spelling, _)| rest.starts_with(spelling))
        {
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(token.clone());
            rest = &rest[spelling.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            literal.push(c);
        }
        rest = chars.as_str();
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

/// Consume between `min` and `max` ASCII digits (greedy).
fn take_number(input: &str, min: usize, max: usize) -> Option<(u32, &str)> {
    let len = input.bytes().take(max).take_while(u8::is_ascii_digit).count();
    if len < min {
        return None;
    }
    let value = input[..len].parse().ok()?;
    Some((value, &input[len..]))
}

fn take_ranged(
    input: &str,
    padded: bool,
    range: std::ops::RangeInclusive<u32>,
) -> Option<(u32, &str)> {
    let (value, rest) =
        (if padded { take_number(input, 2, 2) } else { take_number(input, 1, 2) })?;
    range.contains(&value).then_some((value, rest))
}

/// Case-insensitive match of one of `names`; returns its index.
fn take_name<'a>(input: &'a str, names: &[&str]) -> Option<(usize, &'a str)> {
    names.iter().enumerate().find_map(|(i, name)| {
        let head = input.get(..name.len())?;
        head.eq_ignore_ascii_case(name).then(|| (i, &input[name.len()..]))
    })
}

fn weekday_from_sunday(index: u32) -> Option<Weekday> {
    let from_monday = (index + 6) % 7;
    Weekday::try_from(u8::try_from(from_monday).ok()?).ok()
}

fn parse_token<'a>(token: &Token, input: &'a str, f: &mut Fields) -> Option<&'a str> {
    match token {
        Token::Literal(text) => input.strip_prefix(text.as_str()),
        Token::Year => {
            let (v, rest) = take_number(input, 4, 4)?;
            f.year = Some(i32::try_from(v).ok()?);
            Some(rest)
        }
        Token::ShortYear => {
            let (v, rest) = take_number(input, 2, 2)?;
            let v = i32::try_from(v).ok()?;
            f.year = Some(if v > 68 { 1900 + v } else { 2000 + v });
            Some(rest)
        }
        Token::WeekYear => {
            let (v, rest) = take_number(input, 4, 4)?;
            f.week_year = Some(i32::try_from(v).ok()?);
            Some(rest)
        }
        Token::IsoWeekYear => {
            let (v, rest) = take_number(input, 4, 4)?;
            f.iso_week_year = Some(i32::try_from(v).ok()?);
            Some(rest)
        }
        Token::Quarter => {
            let (v, rest) = take_number(input, 1, 1)?;
            f.quarter = Some(v).filter(|q| (1..=4).contains(q));
            f.quarter.map(|_| rest)
        }
        Token::MonthName => {
            let (i, rest) = take_name(input, &MONTH_NAMES)?;
            f.month = Some(u32::try_from(i).ok()? + 1);
            Some(rest)
        }
        Token::MonthAbbr => {
            let abbrs: Vec<&str> = MONTH_NAMES.iter().map(|n| &n[..3]).collect();
            let (i, rest) = take_name(input, &abbrs)?;
            f.month = Some(u32::try_from(i).ok()? + 1);
            Some(rest)
        }
        Token::Month { padded } => {
            let (v, rest) = take_ranged(input, *padded, 1..=12)?;
            f.month = Some(v);
            Some(rest)
        }
        Token::DayOfYear { padded } => {
            let (v, rest) =
                (if *padded { take_number(input, 3, 3) } else { take_number(input, 1, 3) })?;
            f.day_of_year = Some(v).filter(|d| (1..=366).contains(d));
            f.day_of_year.map(|_| rest)
        }
        Token::Day { padded } => {
            let (v, rest) = take_ranged(input, *padded, 1..=31)?;
            f.day = Some(v);
            Some(rest)
        }
        Token::DayOrdinal => {
            let (v, rest) = take_ranged(input, false, 1..=31)?;
            let (_, rest) = take_name(rest, &["st", "nd", "rd", "th"])?;
            f.day = Some(v);
            Some(rest)
        }
        Token::Week { padded } => {
            let (v, rest) = take_ranged(input, *padded, 1..=53)?;
            f.week = Some(v);
            Some(rest)
        }
        Token::IsoWeek { padded } => {
            let (v, rest) = take_ranged(input, *padded, 1..=53)?;
            f.iso_week = Some(v);
            Some(rest)
        }
        Token::WeekdayName => {
            let (i, rest) = take_name(input, &WEEKDAY_NAMES)?;
            f.weekday = weekday_from_sunday(u32::try_from(i).ok()?);
            Some(rest)
        }
        Token::WeekdayAbbr => {
            let abbrs: Vec<&str> = WEEKDAY_NAMES.iter().map(|n| &n[..3]).collect();
            let (i, rest) = take_name(input, &abbrs)?;
            f.weekday = weekday_from_sunday(u32::try_from(i).ok()?);
            Some(rest)
        }
        Token::WeekdayMin => {
            let (i, rest) = take_name(input, &WEEKDAY_MIN)?;
            f.weekday = weekday_from_sunday(u32::try_from(i).ok()?);
            Some(rest)
        }
        Token::WeekdayNum => {
            let (v, rest) = take_number(input, 1, 1)?;
            f.weekday = Some(weekday_from_sunday(v).filter(|_| v <= 6)?);
            Some(rest)
        }
        Token::LocaleWeekday => {
            let (v, rest) = take_number(input, 1, 1)?;
            f.locale_weekday = Some(v).filter(|d| *d <= 6);
            f.locale_weekday.map(|_| rest)
        }
        Token::IsoWeekday => {
            let (v, rest) = take_number(input, 1, 1)?;
            f.iso_weekday = Some(v).filter(|d| (1..=7).contains(d));
            f.iso_weekday.map(|_| rest)
        }
        Token::Hour { padded } => take_ranged(input, *padded, 0..=23).map(|(_, r)| r),
        Token::Minute { padded } | Token::Second { padded } => {
            take_ranged(input, *padded, 0..=59).map(|(_, r)| r)
        }
    }
}

impl Fields {
    fn into_date(self, weeks: WeekRules) -> Option<NaiveDate> {
        if let Some(week) = self.iso_week {
            let year = self.iso_week_year.or(self.year)?;
            let day = match (self.iso_weekday, self.weekday) {
                (Some(e), _) => e - 1,
                (None, Some(wd)) => wd.num_days_from_monday(),
                (None, None) => 0,
            };
            return WeekRules::ISO.date_of_week(year, week, day);
        }

        if let Some(week) = self.week {
            let year = self.week_year.or(self.year)?;
            let day = match (self.locale_weekday, self.weekday) {
                (Some(e), _) => e,
                (None, Some(wd)) => {
                    (7 + wd.num_days_from_monday() - weeks.first_day.num_days_from_monday())
                        % 7
                }
                (None, None) => 0,
            };
            return weeks.date_of_week(year, week, day);
        }

        let year = self.year.or(self.week_year).or(self.iso_week_year)?;

        let date = if let Some(ordinal) = self.day_of_year {
            NaiveDate::from_yo_opt(year, ordinal)?
        } else {
            let quarter_month = self.quarter.map(|q| (q - 1) * 3 + 1);
            if let (Some(month), Some(first)) = (self.month, quarter_month)
                && !(first..first + 3).contains(&month)
            {
                return None;
            }
            let month = self.month.or(quarter_month).unwrap_or(1);
            NaiveDate::from_ymd_opt(year, month, self.day.unwrap_or(1))?
        };

        if let Some(wd) = self.weekday
            && date.weekday() != wd
        {
            return None;
        }
        if let Some(e) = self.iso_weekday
            && date.weekday().number_from_monday() != e
        {
            return None;
        }
        if let Some(e) = self.locale_weekday
            && weeks.day_of_week(date) != e
        {
            return None;
        }
        Some(date)
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 100, day % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    }
}

fn push_number(out: &mut String, value: u32, padded: bool) {
    if padded {
        out.push_str(&format!("{value:02}"));
    } else {
        out.push_str(&value.to_string());
    }
}

fn format_token(token: &Token, date: NaiveDate, weeks: WeekRules, out: &mut String) {
    let weekday = date.weekday().num_days_from_sunday() as usize;
    match token {
        Token::Literal(text) => out.push_str(text),
        Token::Year => out.push_str(&format!("{:04}", date.year())),
        Token::ShortYear => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
        Token::WeekYear => out.push_str(&format!("{:04}", weeks.week_of(date).0)),
        Token::IsoWeekYear => out.push_str(&format!("{:04}", WeekRules::ISO.week_of(date).0)),
        Token::Quarter => out.push_str(&(date.month0() / 3 + 1).to_string()),
        Token::MonthName => out.push_str(MONTH_NAMES[date.month0() as usize]),
        Token::MonthAbbr => out.push_str(&MONTH_NAMES[date.month0() as usize][..3]),
        Token::Month { padded } => push_number(out, date.month(), *padded),
        Token::DayOfYear { padded } => {
            if *padded {
                out.push_str(&format!("{:03}", date.ordinal()));
            } else {
                out.push_str(&date.ordinal().to_string());
            }
        }
        Token::Day { padded } => push_number(out, date.day(), *padded),
        Token::DayOrdinal => {
            out.push_str(&format!("{}{}", date.day(), ordinal_suffix(date.day())));
        }
        Token::Week { padded } => push_number(out, weeks.week_of(date).1, *padded),
        Token::IsoWeek { padded } => push_number(out, WeekRules::ISO.week_of(date).1, *padded),
        Token::WeekdayName => out.push_str(WEEKDAY_NAMES[weekday]),
        Token::WeekdayAbbr => out.push_str(&WEEKDAY_NAMES[weekday][..3]),
        Token::WeekdayMin => out.push_str(WEEKDAY_MIN[weekday]),
        Token::WeekdayNum => out.push_str(&weekday.to_string()),
        Token::LocaleWeekday => out.push_str(&weeks.day_of_week(date).to_string()),
        Token::IsoWeekday => out.push_str(&date.weekday().number_from_monday().to_string()),
        Token::Hour { padded } | Token::Minute { padded } | Token::Second { padded } => {
            push_number(out, 0, *padded);
        }
    }
}

/// Formats worth trying for a configured format string.
///
/// Nested formats such as `YYYY/YYYY-MM-DD` also match files that only carry
/// the last segment in their name.
pub fn possible_formats(format: &str) -> Vec<DateFormat> {
    let mut formats = vec![DateFormat::new(format)];
    if let Some((_, last)) = format.rsplit_once('/')
        && !last.is_empty()
    {
        formats.push(DateFormat::new(last));
    }
    formats
}

/// The part of `path` a format should be matched against: the filename stem,
/// or as many trailing path segments as the format spans.
pub fn date_input(path: &str, format: &DateFormat) -> String {
    let stem = match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path,
    };
    let parts: Vec<&str> = stem.split('/').collect();
    let depth = format.nesting_depth().min(parts.len());
    parts[parts.len() - depth..].join("/")
}

/// Strictly match a vault path against a configured format and its
/// last-segment fallback.
pub fn match_path(path: &str, format: &str, weeks: WeekRules) -> Option<NaiveDate> {
    possible_formats(format).iter().find_map(|f| f.parse(&date_input(path, f), weeks))
}

/// Whether a week format also carries month or day tokens, which makes the
/// week ambiguous when the two disagree.
pub fn is_format_ambiguous(format: &str, granularity: Granularity) -> bool {
    if granularity != Granularity::Week {
        return false;
    }
    let compiled = DateFormat::new(format);
    compiled.has_week() && compiled.has_month_or_day()
}

/// Check a configured format before it is used for matching.
pub fn validate_format(format: &str, granularity: Granularity) -> Result<(), FormatError> {
    let compiled = DateFormat::new(format);
    if !compiled.has_date_tokens() {
        return Err(FormatError::NoDateTokens(format.to_string()));
    }
    if !compiled.has_year() {
        return Err(FormatError::MissingYear(format.to_string()));
    }

    let samples = [NaiveDate::from_ymd_opt(2024, 1, 5), NaiveDate::from_ymd_opt(2024, 11, 23)];
    for sample in samples.into_iter().flatten() {
        let output = compiled.format(sample, WeekRules::ISO);
        if let Some(ch) = output.chars().find(|c| ILLEGAL_FILENAME_CHARS.contains(c)) {
            return Err(FormatError::IllegalCharacter { format: format.to_string(), ch });
        }
        if granularity == Granularity::Day
            && compiled.parse(&output, WeekRules::ISO) != Some(sample)
        {
            return Err(FormatError::RoundTrip { format: format.to_string(), output });
        }
    }
    Ok(())
}
