//! Per-day aggregation of three-hour forecast samples.

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::model::{Condition, ForecastSample};

/// All samples that fall on one calendar day.
///
/// Condition, humidity and wind speed come from the first sample seen for
/// that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub temperatures: Vec<f64>,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_speed: f64,
}

impl DayBucket {
    fn open(date: NaiveDate, sample: &ForecastSample) -> Self {
        Self {
            date,
            temperatures: vec![sample.temperature],
            condition: sample.condition.clone(),
            humidity: sample.humidity,
            wind_speed: sample.wind_speed,
        }
    }

    pub fn min_temp(&self) -> i64 {
        round_half_up(self.temperatures.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max_temp(&self) -> i64 {
        round_half_up(self.temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn avg_temp(&self) -> i64 {
        let sum: f64 = self.temperatures.iter().sum();
        round_half_up(sum / self.temperatures.len() as f64)
    }
}

/// Nearest integer, ties toward positive infinity (`-2.5` becomes `-2`).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Group samples by calendar day in the local time zone.
pub fn group_by_day(samples: &[ForecastSample]) -> Vec<DayBucket> {
    group_by_day_in(samples, &Local)
}

/// Group samples by calendar day in `tz`, preserving first-seen day order.
pub fn group_by_day_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = Vec::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();

        // Samples arrive in time order, so a day's bucket is almost always
        // the last one; fall back to a scan for out-of-order input.
        match buckets.iter_mut().rev().find(|b| b.date == date) {
            Some(bucket) => bucket.temperatures.push(sample.temperature),
            None => buckets.push(DayBucket::open(date, sample)),
        }
    }

    buckets
}

/// The first `days` buckets, as shown in the outlook list.
pub fn daily_outlook(buckets: &[DayBucket], days: usize) -> &[DayBucket] {
    &buckets[..buckets.len().min(days)]
}

/// One point of the temperature trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub min: i64,
    pub avg: i64,
    pub max: i64,
}

pub fn temperature_trend(buckets: &[DayBucket], days: usize) -> Vec<TrendPoint> {
    daily_outlook(buckets, days)
        .iter()
        .map(|b| TrendPoint {
            date: b.date,
            min: b.min_temp(),
            avg: b.avg_temp(),
            max: b.max_temp(),
        })
        .collect()
}
