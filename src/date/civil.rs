use super::CalendarDate;
use crate::clock::Millis;
use anyhow::{bail, Context, Result};

const MS_PER_DAY: u64 = 86_400_000;

/// UTC calendar date for a wall-clock timestamp.
pub fn today_utc(now: Millis) -> CalendarDate {
    let days = (now.0 / MS_PER_DAY) as i64;
    civil_from_days(days)
}

/// Gregorian date for a count of days since 1970-01-01 (Hinnant's algorithm).
pub(super) fn civil_from_days(days: i64) -> CalendarDate {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    CalendarDate::new(year as i32, month as u8, day as u8)
}

/// Parses `YYYY-MM-DD`.
pub fn parse_calendar_date(value: &str) -> Result<CalendarDate> {
    let trimmed = value.trim();
    let parts: Vec<&str> = trimmed.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        bail!("date '{trimmed}' must look like YYYY-MM-DD");
    };
    let year: i32 = year
        .parse()
        .with_context(|| format!("invalid year in date '{trimmed}'"))?;
    let month: u8 = month
        .parse()
        .with_context(|| format!("invalid month in date '{trimmed}'"))?;
    let day: u8 = day
        .parse()
        .with_context(|| format!("invalid day in date '{trimmed}'"))?;
    let date = CalendarDate::new(year, month, day);
    if !date.is_valid() {
        bail!("date '{trimmed}' does not exist in the Gregorian calendar");
    }
    Ok(date)
}
