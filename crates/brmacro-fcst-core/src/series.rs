//! Series data model and calendar helpers.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single cleaned observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An observation as delivered by the data collaborator: possibly null,
/// in any order, possibly sharing a date with another observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl RawObservation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    /// Whether the observation carries a usable number.
    pub fn is_usable(&self) -> bool {
        matches!(self.value, Some(v) if v.is_finite())
    }
}

impl From<TimeSeriesPoint> for RawObservation {
    fn from(p: TimeSeriesPoint) -> Self {
        Self {
            date: p.date,
            value: Some(p.value),
        }
    }
}

/// Values of a cleaned series, in order.
pub fn values_of(series: &[TimeSeriesPoint]) -> Vec<f64> {
    series.iter().map(|p| p.value).collect()
}

/// `count` monthly dates, the first one month after `last`.
///
/// Day-of-month is kept where possible and clamped to the end of shorter
/// months (Jan 31 -> Feb 28/29). Each step is computed from `last`, so a
/// clamped month never shifts the following ones.
pub fn monthly_dates_after(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (1..=count)
        .map_while(|k| {
            u32::try_from(k)
                .ok()
                .and_then(|k| last.checked_add_months(Months::new(k)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_dates_after() {
        let dates = monthly_dates_after(date(2023, 12, 1), 24);
        assert_eq!(dates.len(), 24);
        assert_eq!(dates[0], date(2024, 1, 1));
        assert_eq!(dates[23], date(2025, 12, 1));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_monthly_dates_clamp_month_end() {
        let dates = monthly_dates_after(date(2024, 1, 31), 3);
        assert_eq!(dates[0], date(2024, 2, 29));
        assert_eq!(dates[1], date(2024, 3, 31));
        assert_eq!(dates[2], date(2024, 4, 30));
    }

    #[test]
    fn test_raw_observation_usable() {
        assert!(RawObservation::new(date(2024, 1, 1), Some(1.0)).is_usable());
        assert!(!RawObservation::new(date(2024, 1, 1), None).is_usable());
        assert!(!RawObservation::new(date(2024, 1, 1), Some(f64::NAN)).is_usable());
    }
}
