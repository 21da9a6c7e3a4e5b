//! Calendar utilities

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// A calendar month, e.g. the month a paper log sheet covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Whether `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Pick the year for a year-less `month/day` so the result lies
    /// closest to this window (handles December sheets read in January)
    pub fn nearest_year_for(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let anchor = self.year * 12 + self.month as i32;
        [self.year - 1, self.year, self.year + 1]
            .into_iter()
            .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
            .min_by_key(|d| (d.year() * 12 + d.month() as i32 - anchor).abs())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = crate::Error;

    /// Parse `YYYY-MM` (also `YYYY/MM`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidInput(format!("Expected YYYY-MM, got '{}'", s));
        let (year, month) = s.trim().split_once(['-', '/']).ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_month() {
        let ym: YearMonth = "2025-11".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2025, month: 11 });
        assert_eq!(ym.to_string(), "2025-11");

        let ym: YearMonth = "2024/3".parse().unwrap();
        assert_eq!(ym.to_string(), "2024-03");
    }

    #[test]
    fn test_parse_year_month_rejects_garbage() {
        assert!("2025".parse::<YearMonth>().is_err());
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("nov-2025".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_contains() {
        let ym = YearMonth::new(2025, 11).unwrap();
        assert!(ym.contains(NaiveDate::from_ymd_opt(2025, 11, 30).unwrap()));
        assert!(!ym.contains(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()));
        assert!(!ym.contains(NaiveDate::from_ymd_opt(2024, 11, 3).unwrap()));
    }

    #[test]
    fn test_nearest_year_crosses_new_year() {
        let january = YearMonth::new(2026, 1).unwrap();
        assert_eq!(
            january.nearest_year_for(12, 30),
            NaiveDate::from_ymd_opt(2025, 12, 30)
        );
        assert_eq!(
            january.nearest_year_for(1, 2),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );

        let december = YearMonth::new(2025, 12).unwrap();
        assert_eq!(
            december.nearest_year_for(1, 3),
            NaiveDate::from_ymd_opt(2026, 1, 3)
        );
    }

    #[test]
    fn test_nearest_year_invalid_day() {
        let window = YearMonth::new(2025, 2).unwrap();
        assert_eq!(window.nearest_year_for(2, 30), None);
        // Feb 29 exists only in the leap year candidate
        assert_eq!(
            window.nearest_year_for(2, 29),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }
}
