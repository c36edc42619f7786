//! Revenue aggregation.
//!
//! Revenue of a sale set is the sum of `quantity_sold * price_per_quantity`.
//! Overflow is reported as an arithmetic fault instead of wrapping.

use backoffice_core::{DomainError, DomainResult};

use crate::period::Period;
use crate::sale::Sale;

/// Revenue of the sales whose timestamp falls within `period`.
///
/// Sales outside the period are ignored, so callers may pass a superset.
/// An empty selection yields `0`.
pub fn total_revenue<'a, I>(sales: I, period: &Period) -> DomainResult<i64>
where
    I: IntoIterator<Item = &'a Sale>,
{
    lifetime_revenue(
        sales
            .into_iter()
            .filter(|sale| period.contains(&sale.timestamp)),
    )
}

/// Revenue of every sale passed in, without a date bound.
pub fn lifetime_revenue<'a, I>(sales: I) -> DomainResult<i64>
where
    I: IntoIterator<Item = &'a Sale>,
{
    sales.into_iter().try_fold(0i64, |acc, sale| {
        acc.checked_add(sale.line_revenue()?)
            .ok_or_else(|| DomainError::arithmetic("revenue total overflows"))
    })
}
