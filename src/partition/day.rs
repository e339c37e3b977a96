//! Calendar-day partition identifiers (`yyyyMMdd`).

use chrono::{Days, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::errors::MoverError;

const DAY_FORMAT: &str = "%Y%m%d";

/// One calendar-day partition. Ordered, and range-enumerable inclusive of
/// both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionDay(NaiveDate);

impl PartitionDay {
    /// Today per the process-local clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The inclusive sequence of days from `self` through `end`.
    /// A start after the end yields an empty sequence.
    pub fn range_through(self, end: Self) -> Vec<Self> {
        let mut days = Vec::new();
        let mut current = self.0;
        while current <= end.0 {
            days.push(Self(current));
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }
}

impl FromStr for PartitionDay {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 {
            return Err(MoverError::InvalidArgument(format!(
                "partition day must be 8 digits (yyyyMMdd), got '{s}'"
            )));
        }
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Self)
            .map_err(|_| {
                MoverError::InvalidArgument(format!("'{s}' is not a valid yyyyMMdd date"))
            })
    }
}

impl fmt::Display for PartitionDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> PartitionDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_round_trip() {
        assert_eq!(day("20230105").to_string(), "20230105");
    }

    #[test]
    fn rejects_wrong_length() {
        let err = "2023010".parse::<PartitionDay>().unwrap_err();
        assert!(matches!(err, MoverError::InvalidArgument(_)));
        assert!("202301011".parse::<PartitionDay>().is_err());
    }

    #[test]
    fn rejects_non_dates() {
        assert!("20231340".parse::<PartitionDay>().is_err());
        assert!("2023010a".parse::<PartitionDay>().is_err());
    }

    #[test]
    fn range_is_inclusive_of_both_endpoints() {
        let days = day("20230101").range_through(day("20230105"));
        let rendered: Vec<_> = days.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["20230101", "20230102", "20230103", "20230104", "20230105"]
        );
    }

    #[test]
    fn range_crosses_month_boundary() {
        let days = day("20230131").range_through(day("20230201"));
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].to_string(), "20230201");
    }

    #[test]
    fn single_day_range() {
        let days = day("20230101").range_through(day("20230101"));
        assert_eq!(days.len(), 1);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(day("20230105").range_through(day("20230101")).is_empty());
    }
}
