//! Date arguments on the command line.
//!
//! Accepts `YYYY-MM-DD`, `today`, `yesterday`, `tomorrow`, and any of the
//! three followed by an offset such as `today + 3d`, `today-1w`,
//! `tomorrow + 2M` or `today - 1y`.

use std::sync::LazyLock;

use chrono::{Days, Months, NaiveDate};
use regex::Regex;

static EXPR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(today|yesterday|tomorrow)\s*(?:([+-])\s*(\d+)([dwMy]))?$").expect("valid regex")
});

pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    let invalid =
        || format!("invalid date '{input}' (expected YYYY-MM-DD or today[+-N{{d,w,M,y}}])");
    let caps = EXPR_RE.captures(input).ok_or_else(invalid)?;

    let base = match &caps[1] {
        "yesterday" => today.pred_opt(),
        "tomorrow" => today.succ_opt(),
        _ => Some(today),
    }
    .ok_or_else(invalid)?;

    let (Some(sign), Some(amount), Some(unit)) = (caps.get(2), caps.get(3), caps.get(4)) else {
        return Ok(base);
    };
    let amount: u32 = amount.as_str().parse().map_err(|_| invalid())?;
    let forward = sign.as_str() == "+";

    let shifted = match unit.as_str() {
        "d" => shift_days(base, u64::from(amount), forward),
        "w" => shift_days(base, u64::from(amount) * 7, forward),
        "M" => shift_months(base, amount, forward),
        _ => amount.checked_mul(12).and_then(|months| shift_months(base, months, forward)),
    };
    shifted.ok_or_else(invalid)
}

fn shift_days(date: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, months: u32, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_months(Months::new(months))
    } else {
        date.checked_sub_months(Months::new(months))
    }
}
