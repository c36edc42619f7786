//! Period resolution: interval labels to concrete inclusive date ranges.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Serialize;

use backoffice_core::{DomainError, DomainResult, ValueObject};

use crate::time::start_of_day;

/// Inclusive range of calendar days, `start <= end`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    #[serde(rename = "start_date")]
    start: NaiveDate,
    #[serde(rename = "end_date")]
    end: NaiveDate,
}

impl ValueObject for Period {}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(format!(
                "start_date {start} is after end_date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Single-day period.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `ts` falls on one of the period's days (UTC).
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        let date = ts.date_naive();
        self.start <= date && date <= self.end
    }

    /// Half-open timestamp bounds `[start 00:00, day after end 00:00)`, for
    /// range queries against a store.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let upper = self
            .end
            .succ_opt()
            .map(start_of_day)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (start_of_day(self.start), upper)
    }
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Coarse period granularity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
    Annual,
}

impl Interval {
    /// Case-insensitive tag lookup. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
            Interval::Annual => "annual",
        }
    }

    /// Canonical period of this granularity containing `date`.
    pub fn resolve(self, date: NaiveDate) -> DomainResult<Period> {
        let out_of_range = || DomainError::validation(format!("date {date} is out of range"));

        let (start, end) = match self {
            Interval::Daily => (date, date),
            Interval::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                let monday = date.checked_sub_days(Days::new(back)).ok_or_else(out_of_range)?;
                let sunday = monday.checked_add_days(Days::new(6)).ok_or_else(out_of_range)?;
                (monday, sunday)
            }
            Interval::Monthly => {
                let first = date.with_day(1).ok_or_else(out_of_range)?;
                // Adding a month to the 1st rolls December over into January.
                let last = first
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .ok_or_else(out_of_range)?;
                (first, last)
            }
            Interval::Annual => {
                let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).ok_or_else(out_of_range)?;
                let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).ok_or_else(out_of_range)?;
                (first, last)
            }
        };
        Period::new(start, end)
    }
}

impl core::fmt::Display for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Period resolved from request parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub period: Period,
    /// `None` when the caller's dates were used verbatim.
    pub interval: Option<Interval>,
}

/// Resolve request parameters to a period.
///
/// A known interval snaps `start_date` to its canonical period and ignores
/// `end_date`. Without one (absent or unknown tag) both dates are required
/// and used as given.
pub fn resolve_period(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    interval: Option<&str>,
) -> DomainResult<ResolvedPeriod> {
    let start = start_date.ok_or_else(|| DomainError::validation("start_date is required"))?;

    if let Some(interval) = interval.and_then(Interval::parse) {
        return Ok(ResolvedPeriod {
            period: interval.resolve(start)?,
            interval: Some(interval),
        });
    }

    let end = end_date.ok_or_else(|| {
        DomainError::validation("end_date is required unless a known interval is given")
    })?;
    Ok(ResolvedPeriod {
        period: Period::new(start, end)?,
        interval: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_is_a_single_day() {
        let p = Interval::Daily.resolve(d(2024, 1, 10)).unwrap();
        assert_eq!((p.start(), p.end()), (d(2024, 1, 10), d(2024, 1, 10)));
    }

    #[test]
    fn weekly_snaps_wednesday_back_to_monday() {
        // 2024-01-10 is a Wednesday.
        let p = Interval::Weekly.resolve(d(2024, 1, 10)).unwrap();
        assert_eq!(p.start(), d(2024, 1, 8));
        assert_eq!(p.end(), d(2024, 1, 14));
        assert_eq!(p.start().weekday(), chrono::Weekday::Mon);
    }

    #[test]
    fn weekly_can_cross_a_year_boundary() {
        // 2025-01-01 is a Wednesday.
        let p = Interval::Weekly.resolve(d(2025, 1, 1)).unwrap();
        assert_eq!(p.start(), d(2024, 12, 30));
        assert_eq!(p.end(), d(2025, 1, 5));
    }

    #[test]
    fn monthly_february_non_leap() {
        let p = Interval::Monthly.resolve(d(2023, 2, 15)).unwrap();
        assert_eq!((p.start(), p.end()), (d(2023, 2, 1), d(2023, 2, 28)));
    }

    #[test]
    fn monthly_february_leap() {
        let p = Interval::Monthly.resolve(d(2024, 2, 15)).unwrap();
        assert_eq!(p.end(), d(2024, 2, 29));
    }

    #[test]
    fn monthly_december_rolls_over_without_error() {
        let p = Interval::Monthly.resolve(d(2024, 12, 5)).unwrap();
        assert_eq!((p.start(), p.end()), (d(2024, 12, 1), d(2024, 12, 31)));
    }

    #[test]
    fn annual_covers_the_calendar_year() {
        let p = Interval::Annual.resolve(d(2024, 7, 4)).unwrap();
        assert_eq!((p.start(), p.end()), (d(2024, 1, 1), d(2024, 12, 31)));
    }

    #[test]
    fn known_interval_ignores_end_date() {
        let r = resolve_period(Some(d(2024, 1, 1)), Some(d(2024, 1, 31)), Some("Monthly")).unwrap();
        assert_eq!(r.interval, Some(Interval::Monthly));
        assert_eq!(r.period.end(), d(2024, 1, 31));
    }

    #[test]
    fn unknown_interval_uses_dates_verbatim() {
        let r = resolve_period(Some(d(2024, 1, 3)), Some(d(2024, 1, 9)), Some("hourly")).unwrap();
        assert_eq!(r.interval, None);
        assert_eq!((r.period.start(), r.period.end()), (d(2024, 1, 3), d(2024, 1, 9)));
    }

    #[test]
    fn missing_dates_are_validation_errors() {
        assert!(matches!(
            resolve_period(None, Some(d(2024, 1, 9)), Some("daily")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            resolve_period(Some(d(2024, 1, 3)), None, None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(Period::new(d(2024, 2, 1), d(2024, 1, 1)).is_err());
    }

    #[test]
    fn contains_covers_the_whole_end_day() {
        let p = Period::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert!(p.contains(&Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
        assert!(!p.contains(&Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));

        let (lo, hi) = p.bounds();
        assert_eq!(lo, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(hi, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }
}
