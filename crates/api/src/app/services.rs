//! Service wiring: storage and token verification, built once from config.

use std::sync::Arc;

use anyhow::{Context, bail};

use coffeeshop_auth::{JwksVerifier, TokenVerifier};
use coffeeshop_infra::external::JwksClient;
use coffeeshop_infra::{AppConfig, DrinkRepository, InMemoryDrinkRepository, SqliteDrinkRepository};

/// Everything a handler may touch, injected through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkRepository>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(drinks: Arc<dyn DrinkRepository>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { drinks, verifier }
    }
}

/// Connect storage, apply the opt-in reset, and load the signing keys.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let drinks = build_repository(config).await?;

    if config.reset_database {
        tracing::warn!("RESET_DATABASE is set; dropping all drinks");
        drinks
            .drop_and_create_all()
            .await
            .context("failed to reset the drinks table")?;
    }

    let verifier = build_verifier(config).await?;
    Ok(AppState::new(drinks, verifier))
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn DrinkRepository>> {
    if config.uses_in_memory_store() {
        tracing::warn!("DATABASE_URL=memory; drinks will not survive a restart");
        return Ok(Arc::new(InMemoryDrinkRepository::new()));
    }

    let repo = SqliteDrinkRepository::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    tracing::info!(database_url = %config.database_url, "connected to drinks database");
    Ok(Arc::new(repo))
}

async fn build_verifier(config: &AppConfig) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    let keys = JwksClient::new(&config.jwks_url)
        .fetch()
        .await
        .context("failed to load identity provider keys")?;

    let verifier = JwksVerifier::new(&keys, &config.api_audience, &config.issuer());
    if verifier.key_count() == 0 {
        bail!("no usable signing keys at {}", config.jwks_url);
    }

    tracing::info!(
        keys = verifier.key_count(),
        audience = %config.api_audience,
        issuer = %config.issuer(),
        "token verifier ready"
    );
    Ok(Arc::new(verifier))
}
