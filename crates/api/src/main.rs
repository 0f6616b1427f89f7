use chrono::Utc;

use labtrack_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    labtrack_observability::init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let app = labtrack_api::app::build_app(config.clone(), Utc::now()).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
