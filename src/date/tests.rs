use super::civil::civil_from_days;
use super::{
    days_in_month, is_leap_year, parse_calendar_date, today_utc, ApplyOutcome, CalendarDate,
    DateField, DatePicker, YearBounds,
};
use crate::clock::Millis;
use crate::dwell::Action;

fn bounds() -> YearBounds {
    YearBounds::new(1900, 2100)
}

fn picker_on(year: i32, month: u8, day: u8) -> DatePicker {
    DatePicker::new(CalendarDate::new(year, month, day), bounds())
}

fn focus(picker: &mut DatePicker, field: DateField) {
    while picker.selection().focused != field {
        picker.apply(Action::AdvanceField);
    }
}

#[test]
fn advance_field_cycles_day_month_year() {
    let mut picker = picker_on(2024, 5, 10);
    assert_eq!(picker.selection().focused, DateField::Day);
    picker.apply(Action::AdvanceField);
    assert_eq!(picker.selection().focused, DateField::Month);
    picker.apply(Action::AdvanceField);
    assert_eq!(picker.selection().focused, DateField::Year);
    picker.apply(Action::AdvanceField);
    assert_eq!(picker.selection().focused, DateField::Day);
}

#[test]
fn day_saturates_at_month_end() {
    let mut picker = picker_on(2024, 1, 31);
    assert_eq!(picker.apply(Action::Increment), ApplyOutcome::Updated);
    assert_eq!(picker.selection().day, 31);
}

#[test]
fn day_saturates_at_one() {
    let mut picker = picker_on(2024, 1, 1);
    picker.apply(Action::Decrement);
    assert_eq!(picker.selection().day, 1);
}

#[test]
fn month_wraps_both_ways() {
    let mut picker = picker_on(2024, 12, 5);
    focus(&mut picker, DateField::Month);
    picker.apply(Action::Increment);
    assert_eq!(picker.selection().month, 1);
    picker.apply(Action::Decrement);
    assert_eq!(picker.selection().month, 12);
}

#[test]
fn day_clamps_when_month_shrinks() {
    let mut picker = picker_on(2023, 1, 31);
    focus(&mut picker, DateField::Month);
    picker.apply(Action::Increment);
    let selection = picker.selection();
    assert_eq!((selection.month, selection.day), (2, 28));
}

#[test]
fn day_clamps_when_leaving_leap_year() {
    let mut picker = picker_on(2024, 2, 29);
    focus(&mut picker, DateField::Year);
    picker.apply(Action::Increment);
    let selection = picker.selection();
    assert_eq!((selection.year, selection.month, selection.day), (2025, 2, 28));
}

#[test]
fn year_clamps_to_bounds_without_wrapping() {
    let mut picker = picker_on(2100, 6, 1);
    focus(&mut picker, DateField::Year);
    picker.apply(Action::Increment);
    assert_eq!(picker.selection().year, 2100);

    let mut picker = picker_on(1900, 6, 1);
    focus(&mut picker, DateField::Year);
    picker.apply(Action::Decrement);
    assert_eq!(picker.selection().year, 1900);
}

#[test]
fn submit_freezes_selection() {
    let mut picker = picker_on(2024, 3, 15);
    let outcome = picker.apply(Action::Submit);
    assert_eq!(
        outcome,
        ApplyOutcome::Submitted(CalendarDate::new(2024, 3, 15))
    );
    assert!(picker.is_frozen());
    assert_eq!(picker.apply(Action::Increment), ApplyOutcome::Rejected);
    assert_eq!(picker.apply(Action::Submit), ApplyOutcome::Rejected);
    assert_eq!(picker.selection().day, 15);
}

#[test]
fn start_date_is_pulled_into_bounds() {
    let picker = DatePicker::new(CalendarDate::new(1850, 2, 29), bounds());
    let selection = picker.selection();
    assert_eq!((selection.year, selection.month, selection.day), (1900, 2, 28));
}

#[test]
fn leap_years_follow_gregorian_rules() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert_eq!(days_in_month(2, 2000), 29);
    assert_eq!(days_in_month(2, 2100), 28);
    assert_eq!(days_in_month(4, 2024), 30);
}

#[test]
fn civil_from_days_matches_known_dates() {
    assert_eq!(civil_from_days(0), CalendarDate::new(1970, 1, 1));
    assert_eq!(civil_from_days(19_782), CalendarDate::new(2024, 2, 29));
    assert_eq!(civil_from_days(-1), CalendarDate::new(1969, 12, 31));
}

#[test]
fn today_utc_truncates_to_day() {
    // 2024-02-29T23:59:59Z
    assert_eq!(
        today_utc(Millis(1_709_251_199_000)),
        CalendarDate::new(2024, 2, 29)
    );
}

#[test]
fn parses_iso_dates() {
    assert_eq!(
        parse_calendar_date("2024-01-31").unwrap(),
        CalendarDate::new(2024, 1, 31)
    );
    assert!(parse_calendar_date("2023-02-29").is_err());
    assert!(parse_calendar_date("2024/01/31").is_err());
    assert!(parse_calendar_date("2024-13-01").is_err());
}

#[test]
fn calendar_date_serializes_as_iso_string() {
    let json = serde_json::to_string(&CalendarDate::new(2024, 7, 4)).unwrap();
    assert_eq!(json, "\"2024-07-04\"");
}
