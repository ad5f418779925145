//! Calendar-month aligned aggregation windows
//!
//! A run is split into non-overlapping periods of `interval_months` calendar
//! months, newest first. Period 0 always starts on the 1st of the current
//! month; period i starts `i * interval_months` months earlier.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// One aggregation window: `interval_months` calendar months starting on the
/// 1st of `start`'s month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    start: NaiveDate,
    months: u32,
}

impl Period {
    pub fn new(start: NaiveDate, months: u32) -> Self {
        debug_assert_eq!(start.day(), 1);
        Self { start, months }
    }

    /// First day of the period (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day of the period (inclusive).
    pub fn end(&self) -> NaiveDate {
        month_start(month_index(self.start) + self.months as i32) - Duration::days(1)
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    /// Label used in report columns: `YYYY-MM` for a single month,
    /// `YYYY-MM to YYYY-MM` for a multi-month span.
    pub fn label(&self) -> String {
        if self.months == 1 {
            self.start.format("%Y-%m").to_string()
        } else {
            let last = month_start(month_index(self.start) + self.months as i32 - 1);
            format!("{} to {}", self.start.format("%Y-%m"), last.format("%Y-%m"))
        }
    }
}

/// Generate aggregation periods covering `total_months`, newest first.
///
/// Emits `ceil(total_months / interval_months)` periods; generation stops
/// once the month offset would reach `total_months`, so no partial trailing
/// window is synthesized.
pub fn generate_periods(total_months: u32, interval_months: u32) -> Vec<Period> {
    generate_periods_from(Local::now().date_naive(), total_months, interval_months)
}

/// Same as [`generate_periods`] with an explicit reference date.
pub fn generate_periods_from(
    today: NaiveDate,
    total_months: u32,
    interval_months: u32,
) -> Vec<Period> {
    let mut periods = Vec::new();
    if total_months == 0 || interval_months == 0 {
        return periods;
    }

    let current = month_index(today);
    let mut offset = 0u32;
    while offset < total_months {
        let start = month_start(current - offset as i32);
        periods.push(Period::new(start, interval_months));
        offset += interval_months;
    }

    log::debug!(
        "Generated {} periods ({} months, {}-month intervals)",
        periods.len(),
        total_months,
        interval_months
    );
    periods
}

/// Months since year 0 for the month containing `d`.
fn month_index(d: NaiveDate) -> i32 {
    d.year() * 12 + d.month0() as i32
}

/// First day of the month `idx` months after year 0.
fn month_start(idx: i32) -> NaiveDate {
    let year = idx.div_euclid(12);
    let month = idx.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).expect("day 1 of a 1-12 month is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_month() {
        let periods = generate_periods_from(date(2023, 7, 15), 1, 1);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start(), date(2023, 7, 1));
        assert_eq!(periods[0].end(), date(2023, 7, 31));
        assert_eq!(periods[0].label(), "2023-07");
    }

    #[test]
    fn test_monthly_count() {
        let periods = generate_periods_from(date(2023, 7, 15), 12, 1);
        assert_eq!(periods.len(), 12);
        for p in &periods {
            assert_eq!(p.start().day(), 1);
        }
    }

    #[test]
    fn test_newest_first_strictly_decreasing() {
        let periods = generate_periods_from(date(2023, 7, 15), 6, 2);
        assert_eq!(periods.len(), 3);
        for pair in periods.windows(2) {
            assert!(pair[0].start() > pair[1].start());
        }
    }

    #[test]
    fn test_ceiling_count_on_uneven_division() {
        // ceil(13 / 3) = 5
        let periods = generate_periods_from(date(2023, 7, 15), 13, 3);
        assert_eq!(periods.len(), 5);
        // ceil(12 / 5) = 3
        let periods = generate_periods_from(date(2023, 7, 15), 12, 5);
        assert_eq!(periods.len(), 3);
    }

    #[test]
    fn test_interval_larger_than_total() {
        let periods = generate_periods_from(date(2023, 7, 15), 2, 6);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start(), date(2023, 7, 1));
    }

    #[test]
    fn test_quarterly_scenario() {
        let periods = generate_periods_from(date(2023, 7, 15), 6, 3);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start(), date(2023, 7, 1));
        assert_eq!(periods[0].label(), "2023-07 to 2023-09");
        assert_eq!(periods[1].start(), date(2023, 4, 1));
        assert_eq!(periods[1].label(), "2023-04 to 2023-06");
    }

    #[test]
    fn test_periods_do_not_overlap() {
        let periods = generate_periods_from(date(2023, 7, 15), 12, 3);
        for pair in periods.windows(2) {
            // older period ends the day before the newer one starts
            assert_eq!(pair[1].end() + Duration::days(1), pair[0].start());
        }
    }

    #[test]
    fn test_year_boundary() {
        let periods = generate_periods_from(date(2024, 1, 10), 2, 1);
        assert_eq!(periods[0].start(), date(2024, 1, 1));
        assert_eq!(periods[1].start(), date(2023, 12, 1));
        assert_eq!(periods[1].label(), "2023-12");
    }

    #[test]
    fn test_leap_year_february_end() {
        let p = Period::new(date(2024, 2, 1), 1);
        assert_eq!(p.end(), date(2024, 2, 29));
        let p = Period::new(date(2023, 2, 1), 1);
        assert_eq!(p.end(), date(2023, 2, 28));
    }
}
