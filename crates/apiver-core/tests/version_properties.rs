//! Properties of quarter resolution over whole years.

use apiver_core::{resolve, ApiVersion};
use chrono::{Datelike, NaiveDate};
use regex::Regex;

fn every_day(year: i32) -> impl Iterator<Item = NaiveDate> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    start.iter_days().take_while(move |d| d.year() == year)
}

#[test]
fn format_is_year_dash_quarter_month() {
    let pattern = Regex::new(r"^\d{4}-(01|04|07|10)$").unwrap();
    for year in [1999, 2024, 2025] {
        for day in every_day(year) {
            let v = resolve(&day).to_string();
            assert!(pattern.is_match(&v), "{day} -> {v}");
        }
    }
}

#[test]
fn quarter_never_decreases_within_a_year() {
    let mut last: Option<ApiVersion> = None;
    for day in every_day(2024) {
        let v = resolve(&day);
        if let Some(prev) = last {
            assert!(v >= prev, "{day}: {v} < {prev}");
        }
        last = Some(v);
    }
}

#[test]
fn version_month_is_at_or_before_date_month() {
    for day in every_day(2023) {
        let v = resolve(&day);
        assert_eq!(v.year(), day.year());
        let start = v.quarter().start_month();
        assert!(start <= day.month() && day.month() < start + 3, "{day} -> {v}");
    }
}

#[test]
fn current_version_has_already_been_released() {
    let now = ApiVersion::current();
    let released = now.release_date().unwrap();
    assert!(released <= chrono::Utc::now().date_naive());
}
