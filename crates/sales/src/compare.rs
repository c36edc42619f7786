//! Revenue comparison between two periods or two categories.
//!
//! Percentages are undefined against a zero baseline; that case is an
//! `ArithmeticFault`, never a guessed default.

use chrono::NaiveDate;
use serde::Serialize;

use backoffice_core::{CategoryId, DomainError, DomainResult};

use crate::period::Period;

/// Raw comparison parameters. Either both categories or all four dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonRequest {
    pub category1: Option<CategoryId>,
    pub category2: Option<CategoryId>,
    pub start_date1: Option<NaiveDate>,
    pub end_date1: Option<NaiveDate>,
    pub start_date2: Option<NaiveDate>,
    pub end_date2: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonMode {
    Periods(Period, Period),
    Categories(CategoryId, CategoryId),
}

impl ComparisonRequest {
    pub fn resolve(&self) -> DomainResult<ComparisonMode> {
        let any_category = self.category1.is_some() || self.category2.is_some();
        let any_date = self.start_date1.is_some()
            || self.end_date1.is_some()
            || self.start_date2.is_some()
            || self.end_date2.is_some();

        match (any_category, any_date) {
            (true, true) => Err(DomainError::validation(
                "category comparison and date comparison are mutually exclusive",
            )),
            (true, false) => match (self.category1, self.category2) {
                (Some(a), Some(b)) => Ok(ComparisonMode::Categories(a, b)),
                _ => Err(DomainError::validation(
                    "category comparison requires both category1 and category2",
                )),
            },
            (false, true) => match (
                self.start_date1,
                self.end_date1,
                self.start_date2,
                self.end_date2,
            ) {
                (Some(s1), Some(e1), Some(s2), Some(e2)) => {
                    Ok(ComparisonMode::Periods(Period::new(s1, e1)?, Period::new(s2, e2)?))
                }
                _ => Err(DomainError::validation(
                    "date comparison requires start_date1, end_date1, start_date2 and end_date2",
                )),
            },
            (false, false) => Err(DomainError::validation(
                "either category1/category2 or two date ranges are required",
            )),
        }
    }
}

/// `min(a, b) / max(a, b) * 100`.
pub fn period_percentage(first: i64, second: i64) -> DomainResult<f64> {
    if first == 0 || second == 0 {
        return Err(DomainError::arithmetic(
            "cannot compare periods when either revenue is zero",
        ));
    }
    let (lo, hi) = if first <= second { (first, second) } else { (second, first) };
    Ok(lo as f64 / hi as f64 * 100.0)
}

/// `second / first * 100`, with `first` as the baseline.
pub fn category_percentage(first: i64, second: i64) -> DomainResult<f64> {
    if first == 0 {
        return Err(DomainError::arithmetic(
            "cannot compare categories against a zero baseline revenue",
        ));
    }
    Ok(second as f64 / first as f64 * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRevenue {
    #[serde(flatten)]
    pub period: Period,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub first: PeriodRevenue,
    pub second: PeriodRevenue,
    pub percentage: f64,
}

impl PeriodComparison {
    pub fn new(first: PeriodRevenue, second: PeriodRevenue) -> DomainResult<Self> {
        let percentage = period_percentage(first.revenue, second.revenue)?;
        Ok(Self {
            first,
            second,
            percentage,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub cat_id: CategoryId,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub first: CategoryRevenue,
    pub second: CategoryRevenue,
    pub percentage: f64,
}

impl CategoryComparison {
    pub fn new(first: CategoryRevenue, second: CategoryRevenue) -> DomainResult<Self> {
        let percentage = category_percentage(first.revenue, second.revenue)?;
        Ok(Self {
            first,
            second,
            percentage,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RevenueComparison {
    Period(PeriodComparison),
    Category(CategoryComparison),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn categories_resolve_when_both_are_given() {
        let req = ComparisonRequest {
            category1: Some(CategoryId::new(1)),
            category2: Some(CategoryId::new(2)),
            ..ComparisonRequest::default()
        };
        assert_eq!(
            req.resolve().unwrap(),
            ComparisonMode::Categories(CategoryId::new(1), CategoryId::new(2))
        );
    }

    #[test]
    fn mixing_modes_is_rejected() {
        let req = ComparisonRequest {
            category1: Some(CategoryId::new(1)),
            category2: Some(CategoryId::new(2)),
            start_date1: Some(d(1)),
            ..ComparisonRequest::default()
        };
        assert!(matches!(req.resolve(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn incomplete_date_ranges_are_rejected() {
        let req = ComparisonRequest {
            start_date1: Some(d(1)),
            end_date1: Some(d(7)),
            start_date2: Some(d(8)),
            ..ComparisonRequest::default()
        };
        assert!(matches!(req.resolve(), Err(DomainError::Validation(_))));
        assert!(ComparisonRequest::default().resolve().is_err());
    }

    #[test]
    fn period_percentage_is_symmetric() {
        assert_eq!(period_percentage(50, 200).unwrap(), 25.0);
        assert_eq!(period_percentage(200, 50).unwrap(), 25.0);
    }

    #[test]
    fn zero_revenue_is_an_arithmetic_fault() {
        assert!(matches!(period_percentage(0, 10), Err(DomainError::ArithmeticFault(_))));
        assert!(matches!(period_percentage(10, 0), Err(DomainError::ArithmeticFault(_))));
        assert!(matches!(category_percentage(0, 10), Err(DomainError::ArithmeticFault(_))));
    }

    #[test]
    fn category_percentage_uses_first_as_baseline() {
        assert_eq!(category_percentage(40, 10).unwrap(), 25.0);
        assert_eq!(category_percentage(10, 40).unwrap(), 400.0);
        // A zero second category is a valid 0%.
        assert_eq!(category_percentage(10, 0).unwrap(), 0.0);
    }

    #[test]
    fn comparison_serializes_with_mode_tag() {
        let cmp = RevenueComparison::Category(
            CategoryComparison::new(
                CategoryRevenue { cat_id: CategoryId::new(1), revenue: 40 },
                CategoryRevenue { cat_id: CategoryId::new(2), revenue: 10 },
            )
            .unwrap(),
        );
        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["mode"], "category");
        assert_eq!(json["first"]["cat_id"], 1);
        assert_eq!(json["percentage"], 25.0);
    }

    #[test]
    fn period_revenue_flattens_dates() {
        let pr = PeriodRevenue {
            period: Period::new(d(1), d(7)).unwrap(),
            revenue: 12,
        };
        let json = serde_json::to_value(&pr).unwrap();
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["end_date"], "2024-01-07");
        assert_eq!(json["revenue"], 12);
    }
}
