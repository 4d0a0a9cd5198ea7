//! Factory: build the auth services from application `Config`.
use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::repos::identity_repo::{IdentityStore, PgIdentityStore};
use crate::repos::memory::MemoryIdentityStore;
use crate::services::auth::{AuthenticationService, RequestGate, TokenCodec, password::Argon2Hasher};

pub fn build_token_codec(config: &Config) -> anyhow::Result<Arc<TokenCodec>> {
    let ttl = Duration::try_seconds(config.token_ttl_seconds)
        .context("TOKEN_TTL_SECONDS out of range")?;
    let codec =
        TokenCodec::new(&config.jwt_secret_key, ttl).context("failed to build token codec")?;

    Ok(Arc::new(codec))
}

pub async fn build_identity_store(config: &Config) -> anyhow::Result<Arc<dyn IdentityStore>> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; identities are kept in memory");
        return Ok(Arc::new(MemoryIdentityStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(Arc::new(PgIdentityStore::new(pool)))
}

pub fn build_services(
    codec: Arc<TokenCodec>,
    store: Arc<dyn IdentityStore>,
) -> (Arc<AuthenticationService>, Arc<RequestGate>) {
    let auth = AuthenticationService::new(
        store.clone(),
        Arc::new(Argon2Hasher::new()),
        codec.clone(),
    );
    let gate = RequestGate::new(codec, store);

    (Arc::new(auth), Arc::new(gate))
}
