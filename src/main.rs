use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

use zwcd_srs::{
    handlers::srs::srs_router, AppConfig, InMemoryReviewStore, ReviewStore, SqliteReviewStore,
    SrsService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    // Storage
    let store: Arc<dyn ReviewStore> = if config.uses_memory_store() {
        log::warn!("DATABASE_URL=memory, reviews will not survive a restart");
        Arc::new(InMemoryReviewStore::new())
    } else {
        Arc::new(SqliteReviewStore::connect(&config.database_url)?)
    };

    let service = Arc::new(SrsService::new(store, config.engine.clone()));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", srs_router(service));

    // Start server
    let listener = TcpListener::bind(&config.bind_addr).await.map_err(|e| {
        log::error!("Failed to bind to {}: {}", config.bind_addr, e);
        e
    })?;

    log::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
