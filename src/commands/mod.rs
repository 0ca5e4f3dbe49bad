mod alcohol;
mod config_cmd;
mod exercise;
mod nutrition;
mod sleep;
mod spending;
mod sync_cmd;

pub use alcohol::AlcoholCommand;
pub use config_cmd::ConfigCommand;
pub use exercise::ExerciseCommand;
pub use nutrition::NutritionCommand;
pub use sleep::SleepCommand;
pub use spending::SpendingCommand;
pub use sync_cmd::SyncCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse a YYYY-MM-DD argument, defaulting to today when absent.
pub(crate) fn parse_date_or_today(date: &Option<String>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Day filter for list commands: a single `--date`, or an open-ended
/// `--from`/`--to` range.
pub(crate) struct DateFilter {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateFilter {
    pub fn parse(
        date: &Option<String>,
        from: &Option<String>,
        to: &Option<String>,
    ) -> Result<Self, String> {
        let parse = |d: &String| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d))
        };

        if let Some(d) = date {
            if from.is_some() || to.is_some() {
                return Err("--date cannot be combined with --from/--to".to_string());
            }
            let day = parse(d)?;
            return Ok(Self {
                from: Some(day),
                to: Some(day),
            });
        }

        Ok(Self {
            from: from.as_ref().map(parse).transpose()?,
            to: to.as_ref().map(parse).transpose()?,
        })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_single_date_filter() {
        let filter = DateFilter::parse(&Some("2025-03-01".to_string()), &None, &None).unwrap();
        assert!(filter.contains(day("2025-03-01")));
        assert!(!filter.contains(day("2025-03-02")));
    }

    #[test]
    fn test_range_filter() {
        let filter = DateFilter::parse(
            &None,
            &Some("2025-03-01".to_string()),
            &Some("2025-03-07".to_string()),
        )
        .unwrap();
        assert!(filter.contains(day("2025-03-01")));
        assert!(filter.contains(day("2025-03-07")));
        assert!(!filter.contains(day("2025-03-08")));
    }

    #[test]
    fn test_open_filter_matches_everything() {
        let filter = DateFilter::parse(&None, &None, &None).unwrap();
        assert!(filter.contains(day("1999-01-01")));
    }

    #[test]
    fn test_date_excludes_range() {
        assert!(DateFilter::parse(
            &Some("2025-03-01".to_string()),
            &Some("2025-03-01".to_string()),
            &None,
        )
        .is_err());
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(DateFilter::parse(&Some("03/01/2025".to_string()), &None, &None).is_err());
        assert!(parse_date_or_today(&Some("not-a-date".to_string())).is_err());
    }
}
