//! Load an exported JSON data file into the configured record store.
//!
//! Usage: `backoffice-ingest <data.json>`. Prints the ingestion report as JSON.

use anyhow::Context;

use backoffice_infra::config::AppConfig;
use backoffice_infra::ingest::{ExportFile, Ingestor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    backoffice_observability::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: backoffice-ingest <data.json>")?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let export = ExportFile::from_json(&raw).with_context(|| format!("failed to parse {path}"))?;

    let config = AppConfig::from_env().context("invalid configuration")?;
    let store = backoffice_api::app::services::build_store(&config).await?;

    let report = Ingestor::new(store)
        .ingest(&export)
        .await
        .context("ingestion aborted")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
