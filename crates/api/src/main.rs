use anyhow::Context;

use backoffice_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    backoffice_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = backoffice_api::app::services::build_services(&config).await?;
    let app = backoffice_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
