use std::sync::Arc;

use anyhow::Context;

use backoffice_infra::config::AppConfig;
use backoffice_infra::services::{InventoryChangeTracker, SalesQueryService};
use backoffice_infra::store::{InMemoryRecordStore, PostgresRecordStore, SharedStore};
use backoffice_inventory::ChangeHistoryPolicy;

/// Services shared by every handler (via `Extension<Arc<AppServices>>`).
pub struct AppServices {
    pub sales: SalesQueryService<SharedStore>,
    pub inventory: InventoryChangeTracker<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore, policy: ChangeHistoryPolicy) -> Self {
        Self {
            sales: SalesQueryService::new(store.clone()),
            inventory: InventoryChangeTracker::new(store, policy),
        }
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = build_store(config).await?;
    tracing::info!(change_history = %config.change_history, "services ready");
    Ok(AppServices::new(store, config.change_history))
}

/// Postgres when `DATABASE_URL` is configured, otherwise the in-memory store.
pub async fn build_store(config: &AppConfig) -> anyhow::Result<SharedStore> {
    match &config.database {
        Some(db) => {
            let store = PostgresRecordStore::connect(db)
                .await
                .context("failed to connect to postgres")?;
            tracing::info!(max_connections = db.max_connections, "using postgres record store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; using in-memory record store (data is lost on exit)"
            );
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}
