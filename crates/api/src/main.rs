use anyhow::Context;

use coffeeshop_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("pretty") => coffeeshop_observability::init_pretty(),
        _ => coffeeshop_observability::init(),
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = coffeeshop_api::app::services::build_state(&config).await?;
    let app = coffeeshop_api::app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}
