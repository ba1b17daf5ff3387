//! Server entry point: reads settings, opens the store, mounts common and `/api` routes.

use school_registry::{app, ensure_database_exists, AppState, EntityStore, JwtIssuer, MemoryStore, PgStore, Settings, StoreBackend};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("school_registry=info")),
        )
        .init();

    let store: Arc<dyn EntityStore> = match settings.store {
        StoreBackend::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.database_url)
                .await?;
            let store = PgStore::new(pool, settings.schema.clone());
            store.ensure_collections().await?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let tokens = Arc::new(JwtIssuer::new(&settings.long_token_secret, settings.long_token_ttl_days));
    let state = AppState::new(store, tokens)?;

    let listener = TcpListener::bind(settings.listen_addr()).await?;
    tracing::info!(service = %settings.service_name, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, settings.body_limit_bytes)).await?;
    Ok(())
}
