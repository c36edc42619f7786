//! Sales domain module.
//!
//! Pure business rules over sale records: period resolution, revenue
//! aggregation, filter precedence and revenue comparison. Nothing here touches
//! storage; the infra layer feeds sales in and maps errors out.

pub mod compare;
pub mod filter;
pub mod period;
pub mod revenue;
pub mod sale;
pub mod time;

pub use compare::{
    category_percentage, period_percentage, CategoryComparison, CategoryRevenue, ComparisonMode,
    ComparisonRequest, PeriodComparison, PeriodRevenue, RevenueComparison,
};
pub use filter::{SalesFilter, SalesQuery};
pub use period::{resolve_period, Interval, Period, ResolvedPeriod};
pub use revenue::{lifetime_revenue, total_revenue};
pub use sale::Sale;
pub use time::{parse_date, parse_timestamp};
