//! Day/month/year selection driven by discrete dwell actions.

mod civil;
#[cfg(test)]
mod tests;

pub use civil::{parse_calendar_date, today_utc};

use crate::dwell::Action;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    Day,
    Month,
    Year,
}

impl DateField {
    pub fn next(self) -> Self {
        match self {
            DateField::Day => DateField::Month,
            DateField::Month => DateField::Year,
            DateField::Year => DateField::Day,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateField::Day => "day",
            DateField::Month => "month",
            DateField::Year => "year",
        }
    }
}

/// A plain Gregorian date. Serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.month, self.year)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Inclusive year range the picker may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn new(min: i32, max: i32) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }
}

/// Snapshot handed to renderers every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSelection {
    pub day: u8,
    pub month: u8,
    pub year: i32,
    pub focused: DateField,
}

impl DateSelection {
    pub fn date(&self) -> CalendarDate {
        CalendarDate::new(self.year, self.month, self.day)
    }
}

/// Result of applying one action to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Updated,
    Submitted(CalendarDate),
    /// The picker was already frozen by an earlier submit.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct DatePicker {
    selection: DateSelection,
    bounds: YearBounds,
    submitted: Option<CalendarDate>,
}

impl DatePicker {
    /// Starts on `start`, pulled into `bounds` and onto a real calendar day.
    pub fn new(start: CalendarDate, bounds: YearBounds) -> Self {
        let year = bounds.clamp(start.year);
        let month = start.month.clamp(1, 12);
        let mut picker = Self {
            selection: DateSelection {
                day: start.day.max(1),
                month,
                year,
                focused: DateField::Day,
            },
            bounds,
            submitted: None,
        };
        picker.clamp_day();
        picker
    }

    pub fn selection(&self) -> DateSelection {
        self.selection
    }

    pub fn bounds(&self) -> YearBounds {
        self.bounds
    }

    pub fn submitted(&self) -> Option<CalendarDate> {
        self.submitted
    }

    pub fn is_frozen(&self) -> bool {
        self.submitted.is_some()
    }

    pub fn apply(&mut self, action: Action) -> ApplyOutcome {
        if self.submitted.is_some() {
            return ApplyOutcome::Rejected;
        }
        match action {
            Action::AdvanceField => {
                self.selection.focused = self.selection.focused.next();
            }
            Action::Increment => self.step(1),
            Action::Decrement => self.step(-1),
            Action::Submit => {
                let date = self.selection.date();
                self.submitted = Some(date);
                return ApplyOutcome::Submitted(date);
            }
        }
        self.clamp_day();
        ApplyOutcome::Updated
    }

    fn step(&mut self, delta: i32) {
        let sel = &mut self.selection;
        match sel.focused {
            DateField::Day => {
                let max = i32::from(days_in_month(sel.month, sel.year));
                sel.day = (i32::from(sel.day) + delta).clamp(1, max) as u8;
            }
            DateField::Month => {
                let zero_based = (i32::from(sel.month) - 1 + delta).rem_euclid(12);
                sel.month = (zero_based + 1) as u8;
            }
            DateField::Year => {
                sel.year = self.bounds.clamp(sel.year.saturating_add(delta));
            }
        }
    }

    fn clamp_day(&mut self) {
        let max = days_in_month(self.selection.month, self.selection.year);
        self.selection.day = self.selection.day.clamp(1, max);
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(month: u8, year: i32) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}
