//! Postgres-backed record store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Domain(AlreadyExists)` | Concurrent insert of the same key |
//! | Database (foreign key violation) | `23503` | `Domain(InvariantViolation)` | Item or sale referencing a missing parent |
//! | Database (check constraint violation) | `23514` | `Domain(Validation)` | Negative stock/price, non-positive quantity |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolTimedOut / PoolClosed / Io / Tls | N/A | `Unavailable` | Database unreachable |
//! | ColumnDecode / Decode / ColumnNotFound | N/A | `Corrupt` | Stored row does not decode |
//! | Other | N/A | `Backend` | Anything else |
//!
//! ## Atomicity
//!
//! `apply_inventory_update` locks the item row (`SELECT ... FOR UPDATE`) and
//! writes the item and its change row in one transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{field, instrument, Span};

use backoffice_core::{CategoryId, ChangeId, DomainError, InventoryId, SaleId};
use backoffice_inventory::{
    plan_change, Category, ChangeHistoryPolicy, ChangeWrite, InventoryChange, InventoryItem,
    InventoryUpdate, TrackedUpdate,
};
use backoffice_sales::{Period, Sale};

use super::r#trait::{InsertOutcome, RecordStore, StoreError, StoreResult};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        cat_id   BIGINT PRIMARY KEY,
        cat_name TEXT   NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        inv_id          BIGINT PRIMARY KEY,
        cat_id          BIGINT NOT NULL REFERENCES categories (cat_id),
        current_stock   BIGINT NOT NULL CHECK (current_stock >= 0),
        unit_price      BIGINT NOT NULL CHECK (unit_price >= 0),
        low_stock_alert TEXT   NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        sale_id            BIGINT      PRIMARY KEY,
        inv_id             BIGINT      NOT NULL REFERENCES inventory (inv_id),
        sold_at            TIMESTAMPTZ NOT NULL,
        quantity_sold      BIGINT      NOT NULL CHECK (quantity_sold > 0),
        price_per_quantity BIGINT      NOT NULL CHECK (price_per_quantity > 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_changes (
        ch_id         BIGSERIAL   PRIMARY KEY,
        inv_id        BIGINT      NOT NULL REFERENCES inventory (inv_id),
        ch_date       TIMESTAMPTZ NOT NULL,
        current_stock BIGINT      CHECK (current_stock >= 0),
        unit_price    BIGINT      CHECK (unit_price >= 0)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_inventory_cat_id ON inventory (cat_id)",
    "CREATE INDEX IF NOT EXISTS idx_sales_inv_id ON sales (inv_id)",
    "CREATE INDEX IF NOT EXISTS idx_sales_sold_at ON sales (sold_at)",
    "CREATE INDEX IF NOT EXISTS idx_inventory_changes_inv_id ON inventory_changes (inv_id, ch_date)",
];

const SALE_COLUMNS: &str = "sale_id, inv_id, sold_at, quantity_sold, price_per_quantity";
const ITEM_COLUMNS: &str = "inv_id, cat_id, current_stock, unit_price, low_stock_alert";
const CHANGE_COLUMNS: &str = "ch_id, inv_id, ch_date, current_stock, unit_price";

/// Postgres-backed record store.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `config.url` and make sure the schema exists.
    #[instrument(skip(config), fields(max_connections = config.max_connections), err)]
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        tracing::debug!(statements = SCHEMA.len(), "schema ensured");
        Ok(())
    }

    async fn fetch_sales(
        &self,
        operation: &'static str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> StoreResult<Vec<Sale>> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        let sales = rows
            .iter()
            .map(|row| SaleRow::from_row(row).map(Sale::from).map_err(|e| corrupt("sales", e)))
            .collect::<StoreResult<Vec<_>>>()?;

        Span::current().record("row_count", sales.len());
        Ok(sales)
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, category), fields(cat_id = %category.cat_id), err)]
    async fn insert_category(&self, category: &Category) -> StoreResult<InsertOutcome> {
        category.validate()?;
        let result = sqlx::query(
            "INSERT INTO categories (cat_id, cat_name) VALUES ($1, $2) ON CONFLICT (cat_id) DO NOTHING",
        )
        .bind(category.cat_id.get())
        .bind(&category.cat_name)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;

        Ok(insert_outcome(result.rows_affected()))
    }

    #[instrument(skip(self, item), fields(inv_id = %item.inv_id, cat_id = %item.cat_id), err)]
    async fn insert_inventory_item(&self, item: &InventoryItem) -> StoreResult<InsertOutcome> {
        item.validate()?;
        let result = sqlx::query(
            r#"
            INSERT INTO inventory (inv_id, cat_id, current_stock, unit_price, low_stock_alert)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (inv_id) DO NOTHING
            "#,
        )
        .bind(item.inv_id.get())
        .bind(item.cat_id.get())
        .bind(item.current_stock)
        .bind(item.unit_price)
        .bind(&item.low_stock_alert)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_inventory_item", e))?;

        Ok(insert_outcome(result.rows_affected()))
    }

    #[instrument(skip(self, sale), fields(sale_id = %sale.sale_id, inv_id = %sale.inv_id), err)]
    async fn insert_sale(&self, sale: &Sale) -> StoreResult<InsertOutcome> {
        sale.validate()?;
        let result = sqlx::query(
            r#"
            INSERT INTO sales (sale_id, inv_id, sold_at, quantity_sold, price_per_quantity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (sale_id) DO NOTHING
            "#,
        )
        .bind(sale.sale_id.get())
        .bind(sale.inv_id.get())
        .bind(sale.timestamp)
        .bind(sale.quantity_sold)
        .bind(sale.price_per_quantity)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_sale", e))?;

        Ok(insert_outcome(result.rows_affected()))
    }

    #[instrument(skip(self), err)]
    async fn get_category(&self, cat_id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT cat_id, cat_name FROM categories WHERE cat_id = $1")
            .bind(cat_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;

        row.map(|r| {
            Ok(Category {
                cat_id: CategoryId::new(r.try_get("cat_id").map_err(|e| corrupt("categories", e))?),
                cat_name: r.try_get("cat_name").map_err(|e| corrupt("categories", e))?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_inventory_item(&self, inv_id: InventoryId) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM inventory WHERE inv_id = $1"))
            .bind(inv_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_inventory_item", e))?;

        row.map(|r| decode_item(&r)).transpose()
    }

    #[instrument(skip(self), fields(row_count = field::Empty), err)]
    async fn inventory_by_category(&self, cat_id: CategoryId) -> StoreResult<Vec<InventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE cat_id = $1 ORDER BY inv_id"
        ))
        .bind(cat_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("inventory_by_category", e))?;

        let items = rows.iter().map(decode_item).collect::<StoreResult<Vec<_>>>()?;
        Span::current().record("row_count", items.len());
        Ok(items)
    }

    #[instrument(skip(self), err)]
    async fn get_sale(&self, sale_id: SaleId) -> StoreResult<Option<Sale>> {
        let row = sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_id = $1"))
            .bind(sale_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_sale", e))?;

        row.map(|r| SaleRow::from_row(&r).map(Sale::from).map_err(|e| corrupt("sales", e)))
            .transpose()
    }

    #[instrument(skip(self), fields(row_count = field::Empty), err)]
    async fn sales_by_inventory(&self, inv_id: InventoryId) -> StoreResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE inv_id = $1 ORDER BY sold_at, sale_id"
        );
        self.fetch_sales("sales_by_inventory", sqlx::query(&sql).bind(inv_id.get()))
            .await
    }

    #[instrument(skip(self), fields(row_count = field::Empty), err)]
    async fn sales_by_inventory_ids(&self, inv_ids: &[InventoryId]) -> StoreResult<Vec<Sale>> {
        let ids: Vec<i64> = inv_ids.iter().map(|id| id.get()).collect();
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE inv_id = ANY($1) ORDER BY sold_at, sale_id"
        );
        self.fetch_sales("sales_by_inventory_ids", sqlx::query(&sql).bind(ids))
            .await
    }

    #[instrument(skip(self), fields(period = %period, row_count = field::Empty), err)]
    async fn sales_in_period(&self, period: &Period) -> StoreResult<Vec<Sale>> {
        let (from, until) = period.bounds();
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE sold_at >= $1 AND sold_at < $2 ORDER BY sold_at, sale_id"
        );
        self.fetch_sales("sales_in_period", sqlx::query(&sql).bind(from).bind(until))
            .await
    }

    #[instrument(skip(self, update), fields(policy = %policy), err)]
    async fn apply_inventory_update(
        &self,
        inv_id: InventoryId,
        update: &InventoryUpdate,
        policy: ChangeHistoryPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<TrackedUpdate> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("apply_inventory_update", e))?;

        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE inv_id = $1 FOR UPDATE"
        ))
        .bind(inv_id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_inventory_update", e))?;

        let mut item = match row {
            Some(r) => decode_item(&r)?,
            None => {
                let msg = format!("inventory item {inv_id} not found");
                return Err(DomainError::not_found(msg).into());
            }
        };

        if let Some(cat_id) = update.cat_id {
            let exists = sqlx::query("SELECT 1 FROM categories WHERE cat_id = $1")
                .bind(cat_id.get())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("apply_inventory_update", e))?
                .is_some();
            if !exists {
                return Err(DomainError::not_found(format!("category {cat_id} not found")).into());
            }
        }

        item.apply_update(update)?;

        sqlx::query(
            "UPDATE inventory SET cat_id = $2, current_stock = $3, unit_price = $4 WHERE inv_id = $1",
        )
        .bind(inv_id.get())
        .bind(item.cat_id.get())
        .bind(item.current_stock)
        .bind(item.unit_price)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_inventory_update", e))?;

        let latest = sqlx::query(&format!(
            "SELECT {CHANGE_COLUMNS} FROM inventory_changes WHERE inv_id = $1 ORDER BY ch_date DESC, ch_id DESC LIMIT 1"
        ))
        .bind(inv_id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_inventory_update", e))?
        .map(|r| decode_change(&r))
        .transpose()?;

        let change = match plan_change(policy, latest.as_ref(), inv_id, update, now) {
            None => None,
            Some(ChangeWrite::Insert(new)) => {
                let ch_id: i64 = sqlx::query(
                    r#"
                    INSERT INTO inventory_changes (inv_id, ch_date, current_stock, unit_price)
                    VALUES ($1, $2, $3, $4)
                    RETURNING ch_id
                    "#,
                )
                .bind(new.inv_id.get())
                .bind(new.ch_date)
                .bind(new.current_stock)
                .bind(new.unit_price)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("apply_inventory_update", e))?
                .try_get("ch_id")
                .map_err(|e| corrupt("inventory_changes", e))?;
                Some(new.with_id(ChangeId::new(ch_id)))
            }
            Some(ChangeWrite::Overwrite(row)) => {
                sqlx::query(
                    "UPDATE inventory_changes SET current_stock = $2, unit_price = $3 WHERE ch_id = $1",
                )
                .bind(row.ch_id.get())
                .bind(row.current_stock)
                .bind(row.unit_price)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("apply_inventory_update", e))?;
                Some(row)
            }
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("apply_inventory_update", e))?;

        Ok(TrackedUpdate { item, change })
    }

    #[instrument(skip(self), fields(row_count = field::Empty), err)]
    async fn inventory_changes(&self, inv_id: InventoryId) -> StoreResult<Vec<InventoryChange>> {
        let rows = sqlx::query(&format!(
            "SELECT {CHANGE_COLUMNS} FROM inventory_changes WHERE inv_id = $1 ORDER BY ch_date, ch_id"
        ))
        .bind(inv_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("inventory_changes", e))?;

        let changes = rows.iter().map(decode_change).collect::<StoreResult<Vec<_>>>()?;
        Span::current().record("row_count", changes.len());
        Ok(changes)
    }
}

fn insert_outcome(rows_affected: u64) -> InsertOutcome {
    if rows_affected == 0 {
        InsertOutcome::AlreadyExists
    } else {
        InsertOutcome::Inserted
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("23505") => DomainError::already_exists(msg).into(),
                Some("23503") => DomainError::invariant(msg).into(),
                Some("23514") => DomainError::validation(msg).into(),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!(
                "connection pool unavailable in {}: {}",
                operation, err
            ))
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Unavailable(format!("connection failed in {}: {}", operation, err))
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("decode error in {}: {}", operation, err))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn corrupt(table: &str, err: sqlx::Error) -> StoreError {
    StoreError::Corrupt(format!("failed to decode {table} row: {err}"))
}

fn decode_item(row: &PgRow) -> StoreResult<InventoryItem> {
    InventoryRow::from_row(row)
        .map(InventoryItem::from)
        .map_err(|e| corrupt("inventory", e))
}

fn decode_change(row: &PgRow) -> StoreResult<InventoryChange> {
    ChangeRow::from_row(row)
        .map(InventoryChange::from)
        .map_err(|e| corrupt("inventory_changes", e))
}

// SQLx row types

#[derive(Debug)]
struct InventoryRow {
    inv_id: i64,
    cat_id: i64,
    current_stock: i64,
    unit_price: i64,
    low_stock_alert: String,
}

impl<'r> sqlx::FromRow<'r, PgRow> for InventoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InventoryRow {
            inv_id: row.try_get("inv_id")?,
            cat_id: row.try_get("cat_id")?,
            current_stock: row.try_get("current_stock")?,
            unit_price: row.try_get("unit_price")?,
            low_stock_alert: row.try_get("low_stock_alert")?,
        })
    }
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            inv_id: InventoryId::new(row.inv_id),
            cat_id: CategoryId::new(row.cat_id),
            current_stock: row.current_stock,
            unit_price: row.unit_price,
            low_stock_alert: row.low_stock_alert,
        }
    }
}

#[derive(Debug)]
struct SaleRow {
    sale_id: i64,
    inv_id: i64,
    sold_at: DateTime<Utc>,
    quantity_sold: i64,
    price_per_quantity: i64,
}

impl<'r> sqlx::FromRow<'r, PgRow> for SaleRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SaleRow {
            sale_id: row.try_get("sale_id")?,
            inv_id: row.try_get("inv_id")?,
            sold_at: row.try_get("sold_at")?,
            quantity_sold: row.try_get("quantity_sold")?,
            price_per_quantity: row.try_get("price_per_quantity")?,
        })
    }
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            sale_id: SaleId::new(row.sale_id),
            inv_id: InventoryId::new(row.inv_id),
            timestamp: row.sold_at,
            quantity_sold: row.quantity_sold,
            price_per_quantity: row.price_per_quantity,
        }
    }
}

#[derive(Debug)]
struct ChangeRow {
    ch_id: i64,
    inv_id: i64,
    ch_date: DateTime<Utc>,
    current_stock: Option<i64>,
    unit_price: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ChangeRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ChangeRow {
            ch_id: row.try_get("ch_id")?,
            inv_id: row.try_get("inv_id")?,
            ch_date: row.try_get("ch_date")?,
            current_stock: row.try_get("current_stock")?,
            unit_price: row.try_get("unit_price")?,
        })
    }
}

impl From<ChangeRow> for InventoryChange {
    fn from(row: ChangeRow) -> Self {
        InventoryChange {
            ch_id: ChangeId::new(row.ch_id),
            inv_id: InventoryId::new(row.inv_id),
            ch_date: row.ch_date,
            current_stock: row.current_stock,
            unit_price: row.unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_affected_means_duplicate() {
        assert_eq!(insert_outcome(0), InsertOutcome::AlreadyExists);
        assert_eq!(insert_outcome(1), InsertOutcome::Inserted);
    }

    #[test]
    fn pool_failures_map_to_unavailable() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn schema_keeps_sale_timestamp_in_sold_at() {
        let sales = SCHEMA
            .iter()
            .find(|s| s.contains("CREATE TABLE IF NOT EXISTS sales"))
            .unwrap();
        assert!(sales.contains("sold_at"));
        assert!(!sales.contains("timestamp "));
        assert!(SALE_COLUMNS.contains("sold_at"));
    }
}
