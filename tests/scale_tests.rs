use chrono::{Duration, NaiveDate};
use gantt_tool::scale::{self, Scale};
use gantt_tool::ScheduleError;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn scale_names_parse() {
    assert_eq!("day".parse::<Scale>().unwrap(), Scale::Day);
    assert_eq!("W".parse::<Scale>().unwrap(), Scale::Week);
    assert_eq!(" monthly ".parse::<Scale>().unwrap(), Scale::Month);
    assert_eq!("quarter".parse::<Scale>().unwrap(), Scale::Quarter);
    assert!("year".parse::<Scale>().is_err());
}

#[test]
fn quarter_scale_is_rejected() {
    let result = scale::span_length(Scale::Quarter, d(2024, 1, 1), d(2024, 6, 30));
    assert!(matches!(result, Err(ScheduleError::UnsupportedScale(Scale::Quarter))));
    let result = scale::offset(Scale::Quarter, d(2024, 1, 1), d(2024, 6, 30), false, false, false);
    assert!(result.is_err());
}

#[test]
fn day_scale_counts_days() {
    assert_eq!(scale::span_length(Scale::Day, d(2024, 1, 1), d(2024, 1, 31)).unwrap(), 30);
    assert_eq!(
        scale::offset(Scale::Day, d(2024, 1, 1), d(2024, 1, 11), false, false, false).unwrap(),
        10.0
    );
}

#[test]
fn week_span_and_offset_agree() {
    for start in [d(2024, 1, 1), d(2024, 1, 3), d(2024, 2, 29), d(2024, 12, 29)] {
        for weeks in 0..12 {
            let end = start + Duration::weeks(weeks);
            let offset = scale::offset(Scale::Week, start, end, false, false, false).unwrap();
            assert_eq!(offset, weeks as f64, "{start} + {weeks} weeks");
            assert_eq!(scale::span_length(Scale::Week, start, end).unwrap(), weeks);
        }
    }
}

#[test]
fn week_span_snaps_to_whole_weeks() {
    // Wednesday to the next Tuesday touches two calendar weeks
    assert_eq!(scale::span_length(Scale::Week, d(2024, 1, 3), d(2024, 1, 9)).unwrap(), 1);
    assert_eq!(scale::span_length(Scale::Week, d(2024, 1, 1), d(2024, 1, 7)).unwrap(), 0);
}

#[test]
fn fractional_week_offset_has_two_decimals() {
    let start = d(2024, 1, 1);
    // under a week: plain fraction of seven days
    let short = scale::offset(Scale::Week, start, d(2024, 1, 4), false, false, true).unwrap();
    assert!((short - 0.43).abs() < 1e-9, "{short}");
    // later weeks add the weekday fraction to the whole weeks
    let long = scale::offset(Scale::Week, start, d(2024, 1, 17), false, false, true).unwrap();
    assert!((long - 2.29).abs() < 1e-9, "{long}");
}

#[test]
fn month_scale_counts_started_months() {
    assert_eq!(scale::span_length(Scale::Month, d(2024, 1, 1), d(2024, 1, 31)).unwrap(), 0);
    // months are counted from the window start day
    assert_eq!(scale::span_length(Scale::Month, d(2024, 1, 15), d(2024, 3, 2)).unwrap(), 1);
    assert_eq!(scale::span_length(Scale::Month, d(2024, 1, 15), d(2024, 3, 20)).unwrap(), 2);
    assert_eq!(
        scale::offset(Scale::Month, d(2024, 1, 15), d(2024, 4, 1), false, false, false).unwrap(),
        3.0
    );
}

#[test]
fn add_months_clamps_day() {
    assert_eq!(scale::add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
    assert_eq!(scale::add_months(d(2024, 3, 31), -1), d(2024, 2, 29));
}
