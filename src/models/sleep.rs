use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Collection, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepLog {
    pub id: String,
    pub sleep_time: DateTime<Utc>,
    pub wake_time: DateTime<Utc>,
    pub hours_slept: f64,
    pub date: NaiveDate,
}

impl SleepLog {
    /// Builds a sleep log from bed and wake times.
    ///
    /// A wake time at or before the sleep time is taken to be on the next
    /// day (sleeping across midnight).
    pub fn new(sleep_time: DateTime<Utc>, wake_time: DateTime<Utc>, date: NaiveDate) -> Self {
        let wake_time = if wake_time <= sleep_time {
            wake_time + Duration::days(1)
        } else {
            wake_time
        };
        let hours = (wake_time - sleep_time).num_seconds() as f64 / 3600.0;

        Self {
            id: Uuid::new_v4().to_string(),
            sleep_time,
            wake_time,
            hours_slept: (hours * 100.0).round() / 100.0,
            date,
        }
    }
}

impl Record for SleepLog {
    const COLLECTION: Collection = Collection::SleepLogs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SleepLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}h slept", self.date, self.hours_slept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_same_day_sleep() {
        let log = SleepLog::new(
            at(2025, 1, 1, 13, 0),
            at(2025, 1, 1, 14, 30),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert_eq!(log.hours_slept, 1.5);
    }

    #[test]
    fn test_cross_midnight_sleep_adds_a_day() {
        let log = SleepLog::new(
            at(2025, 1, 1, 23, 0),
            at(2025, 1, 1, 6, 30),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );
        assert_eq!(log.hours_slept, 7.5);
        assert_eq!(log.wake_time, at(2025, 1, 2, 6, 30));
    }

    #[test]
    fn test_hours_rounded_to_two_decimals() {
        let log = SleepLog::new(
            at(2025, 1, 1, 23, 0),
            at(2025, 1, 2, 6, 20),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );
        assert_eq!(log.hours_slept, 7.33);
    }
}
