use std::sync::Arc;

use color_eyre::eyre::{eyre, Result, WrapErr};
use rota_overtime::{
    app_state::AppState,
    domain::SystemClock,
    get_postgres_pool, get_redis_client,
    services::{
        data_stores::{
            PostgresLeaveStore, PostgresProfileStore,
            RedisIdentitySelectionStore,
        },
        LineMessagingClient,
    },
    utils::{config::AppConfig, tracing::init_tracing},
    Application,
};
use sqlx::PgPool;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let config = AppConfig::from_env().wrap_err("invalid configuration")?;

    let pg_pool = configure_postgresql(&config).await?;
    let redis_connection = Arc::new(RwLock::new(configure_redis(&config)?));

    let line_client = LineMessagingClient::new(
        config.line_api_base_url.clone(),
        config.line_channel_access_token.clone(),
        config.notification_timeout,
    )
    .wrap_err("failed to build LINE client")?;

    let address = config.app_address.clone();
    let app_state = AppState::new(
        Arc::new(RwLock::new(PostgresLeaveStore::new(pg_pool.clone()))),
        Arc::new(RwLock::new(PostgresProfileStore::new(pg_pool))),
        Arc::new(RwLock::new(RedisIdentitySelectionStore::new(
            redis_connection,
        ))),
        Arc::new(line_client),
        Arc::new(SystemClock),
        Arc::new(config),
    );

    let app = Application::build(app_state, &address)
        .await
        .map_err(|e| eyre!("failed to build app: {e}"))?;

    app.run().await.wrap_err("failed to run app")?;
    Ok(())
}

async fn configure_postgresql(config: &AppConfig) -> Result<PgPool> {
    let pg_pool = get_postgres_pool(&config.database_url)
        .await
        .wrap_err("failed to create Postgres connection pool")?;

    sqlx::migrate!()
        .run(&pg_pool)
        .await
        .wrap_err("failed to run migrations")?;

    Ok(pg_pool)
}

fn configure_redis(config: &AppConfig) -> Result<redis::Connection> {
    get_redis_client(config.redis_host_name.clone())
        .wrap_err("failed to create Redis client")?
        .get_connection()
        .wrap_err("failed to get Redis connection")
}
