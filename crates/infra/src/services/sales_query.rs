//! Sales lookup, revenue reporting and revenue comparison.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use backoffice_core::CategoryId;
use backoffice_sales::{
    lifetime_revenue, resolve_period, total_revenue, CategoryComparison, CategoryRevenue,
    ComparisonMode, ComparisonRequest, Interval, Period, PeriodComparison, PeriodRevenue,
    RevenueComparison, Sale, SalesFilter, SalesQuery,
};

use super::ServiceError;
use crate::store::RecordStore;

/// Total revenue over a resolved period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    #[serde(flatten)]
    pub period: Period,
    /// Set when the period was snapped to an interval.
    pub interval: Option<Interval>,
    pub total_revenue: i64,
}

/// Read-side service over sales.
#[derive(Debug, Clone)]
pub struct SalesQueryService<S> {
    store: S,
}

impl<S> SalesQueryService<S>
where
    S: RecordStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the single lookup `filter` resolves to.
    ///
    /// An empty result is `NotFound` for every lookup kind.
    #[instrument(skip(self), err)]
    pub async fn filter_sales(&self, filter: &SalesFilter) -> Result<Vec<Sale>, ServiceError> {
        match filter.resolve()? {
            SalesQuery::BySale(sale_id) => self
                .store
                .get_sale(sale_id)
                .await?
                .map(|sale| vec![sale])
                .ok_or_else(|| ServiceError::NotFound(format!("sale {sale_id} not found"))),
            SalesQuery::ByInventory(inv_id) => non_empty(
                self.store.sales_by_inventory(inv_id).await?,
                || format!("no sales recorded for inventory item {inv_id}"),
            ),
            SalesQuery::ByCategory(cat_id) => non_empty(
                self.category_sales(cat_id).await?,
                || format!("no sales recorded for category {cat_id}"),
            ),
            SalesQuery::ByPeriod(period) => non_empty(
                self.store.sales_in_period(&period).await?,
                || format!("no sales recorded from {period}"),
            ),
        }
    }

    /// Revenue over the period the parameters resolve to. Zero sales is a
    /// valid report with `total_revenue = 0`.
    #[instrument(skip(self), err)]
    pub async fn revenue(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        interval: Option<&str>,
    ) -> Result<RevenueReport, ServiceError> {
        let resolved = resolve_period(start_date, end_date, interval)?;
        let total = self.period_revenue(&resolved.period).await?;

        tracing::debug!(period = %resolved.period, total, "revenue computed");
        Ok(RevenueReport {
            period: resolved.period,
            interval: resolved.interval,
            total_revenue: total,
        })
    }

    pub async fn period_revenue(&self, period: &Period) -> Result<i64, ServiceError> {
        let sales = self.store.sales_in_period(period).await?;
        Ok(total_revenue(&sales, period)?)
    }

    /// Lifetime revenue of every item in a category.
    ///
    /// An unknown category is `NotFound`; a known category without sales is `0`.
    pub async fn category_revenue(&self, cat_id: CategoryId) -> Result<i64, ServiceError> {
        if self.store.get_category(cat_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("category {cat_id} not found")));
        }
        let sales = self.category_sales(cat_id).await?;
        Ok(lifetime_revenue(&sales)?)
    }

    #[instrument(skip(self), err)]
    pub async fn compare_revenue(
        &self,
        request: &ComparisonRequest,
    ) -> Result<RevenueComparison, ServiceError> {
        match request.resolve()? {
            ComparisonMode::Periods(first, second) => {
                let first = PeriodRevenue {
                    revenue: self.period_revenue(&first).await?,
                    period: first,
                };
                let second = PeriodRevenue {
                    revenue: self.period_revenue(&second).await?,
                    period: second,
                };
                Ok(RevenueComparison::Period(PeriodComparison::new(first, second)?))
            }
            ComparisonMode::Categories(first, second) => {
                let first = CategoryRevenue {
                    cat_id: first,
                    revenue: self.category_revenue(first).await?,
                };
                let second = CategoryRevenue {
                    cat_id: second,
                    revenue: self.category_revenue(second).await?,
                };
                Ok(RevenueComparison::Category(CategoryComparison::new(first, second)?))
            }
        }
    }

    async fn category_sales(&self, cat_id: CategoryId) -> Result<Vec<Sale>, ServiceError> {
        let inv_ids: Vec<_> = self
            .store
            .inventory_by_category(cat_id)
            .await?
            .iter()
            .map(|item| item.inv_id)
            .collect();

        if inv_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.sales_by_inventory_ids(&inv_ids).await?)
    }
}

fn non_empty(
    sales: Vec<Sale>,
    describe: impl FnOnce() -> String,
) -> Result<Vec<Sale>, ServiceError> {
    if sales.is_empty() {
        return Err(ServiceError::NotFound(describe()));
    }
    Ok(sales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use backoffice_core::{InventoryId, SaleId};
    use backoffice_inventory::{Category, InventoryItem};
    use chrono::{TimeZone, Utc};

    use crate::store::InMemoryRecordStore;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn item(inv: i64, cat: i64) -> InventoryItem {
        InventoryItem {
            inv_id: InventoryId::new(inv),
            cat_id: CategoryId::new(cat),
            current_stock: 10,
            unit_price: 5,
            low_stock_alert: "no".to_string(),
        }
    }

    fn sale(id: i64, inv: i64, m: u32, day: u32, qty: i64, price: i64) -> Sale {
        Sale {
            sale_id: SaleId::new(id),
            inv_id: InventoryId::new(inv),
            timestamp: Utc.with_ymd_and_hms(2024, m, day, 12, 0, 0).unwrap(),
            quantity_sold: qty,
            price_per_quantity: price,
        }
    }

    /// Categories 1 (items 10, 11 and the unsold 12) and 2 (item 20) plus an
    /// empty category 3.
    async fn service() -> SalesQueryService<Arc<InMemoryRecordStore>> {
        let store = Arc::new(InMemoryRecordStore::new());
        for (id, name) in [(1, "Electronics"), (2, "Books"), (3, "Garden")] {
            store
                .insert_category(&Category::new(CategoryId::new(id), name).unwrap())
                .await
                .unwrap();
        }
        for (inv, cat) in [(10, 1), (11, 1), (12, 1), (20, 2)] {
            store.insert_inventory_item(&item(inv, cat)).await.unwrap();
        }
        for s in [
            sale(100, 10, 1, 3, 2, 10),
            sale(101, 11, 1, 4, 1, 5),
            sale(102, 20, 1, 5, 1, 10),
            sale(103, 10, 2, 1, 3, 10),
        ] {
            store.insert_sale(&s).await.unwrap();
        }
        SalesQueryService::new(store)
    }

    #[tokio::test]
    async fn category_filter_unions_item_sales() {
        let svc = service().await;
        let sales = svc
            .filter_sales(&SalesFilter {
                category_id: Some(CategoryId::new(1)),
                ..SalesFilter::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = sales.iter().map(|s| s.sale_id.get()).collect();
        assert_eq!(ids, vec![100, 101, 103]);
    }

    #[tokio::test]
    async fn empty_lookups_are_not_found() {
        let svc = service().await;
        for filter in [
            SalesFilter {
                sale_id: Some(SaleId::new(999)),
                ..SalesFilter::default()
            },
            SalesFilter {
                inventory_id: Some(InventoryId::new(12)),
                ..SalesFilter::default()
            },
            SalesFilter {
                category_id: Some(CategoryId::new(3)),
                ..SalesFilter::default()
            },
            SalesFilter {
                start_date: Some(d(6, 1)),
                end_date: Some(d(6, 30)),
                ..SalesFilter::default()
            },
        ] {
            assert!(matches!(
                svc.filter_sales(&filter).await,
                Err(ServiceError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn monthly_revenue_snaps_to_calendar_month() {
        let svc = service().await;
        let report = svc.revenue(Some(d(1, 15)), None, Some("monthly")).await.unwrap();
        assert_eq!(report.period.start(), d(1, 1));
        assert_eq!(report.period.end(), d(1, 31));
        assert_eq!(report.interval, Some(Interval::Monthly));
        assert_eq!(report.total_revenue, 35);
    }

    #[tokio::test]
    async fn revenue_without_sales_is_zero() {
        let svc = service().await;
        let report = svc.revenue(Some(d(7, 1)), Some(d(7, 2)), None).await.unwrap();
        assert_eq!(report.total_revenue, 0);
    }

    #[tokio::test]
    async fn category_comparison_uses_first_as_baseline() {
        let svc = service().await;
        let cmp = svc
            .compare_revenue(&ComparisonRequest {
                category1: Some(CategoryId::new(1)),
                category2: Some(CategoryId::new(2)),
                ..ComparisonRequest::default()
            })
            .await
            .unwrap();
        match cmp {
            RevenueComparison::Category(c) => {
                assert_eq!(c.first.revenue, 55);
                assert_eq!(c.second.revenue, 10);
                assert!((c.percentage - 10.0 / 55.0 * 100.0).abs() < 1e-9);
            }
            other => panic!("expected category comparison, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_baseline_category_is_an_arithmetic_fault() {
        let svc = service().await;
        let err = svc
            .compare_revenue(&ComparisonRequest {
                category1: Some(CategoryId::new(3)),
                category2: Some(CategoryId::new(1)),
                ..ComparisonRequest::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ArithmeticFault(_)));
    }

    #[tokio::test]
    async fn period_comparison_reports_min_over_max() {
        let svc = service().await;
        let cmp = svc
            .compare_revenue(&ComparisonRequest {
                start_date1: Some(d(1, 1)),
                end_date1: Some(d(1, 31)),
                start_date2: Some(d(2, 1)),
                end_date2: Some(d(2, 29)),
                ..ComparisonRequest::default()
            })
            .await
            .unwrap();
        match cmp {
            RevenueComparison::Period(p) => {
                assert_eq!((p.first.revenue, p.second.revenue), (35, 30));
                assert!((p.percentage - 30.0 / 35.0 * 100.0).abs() < 1e-9);
            }
            other => panic!("expected period comparison, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_store_is_not_an_empty_result() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.set_offline(true);
        let svc = SalesQueryService::new(store);
        let err = svc.revenue(Some(d(1, 1)), Some(d(1, 2)), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));
    }
}
