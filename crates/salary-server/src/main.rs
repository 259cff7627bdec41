use std::sync::Arc;

use anyhow::{Context, Result};
use salary_config::ServiceConfig;
use salary_predictor::build_predictor;
use salary_server::{build_router, init_tracing, ServerState};
use salary_store::SqliteStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env().context("invalid configuration")?;
    init_tracing();

    let store = SqliteStore::open(&config.database_url).context("failed to open prediction store")?;
    info!("{} predictions on record", store.count()?);

    let predictor = build_predictor(&config.predictor).await;
    let state = Arc::new(ServerState::new(predictor, Arc::new(store)));
    let app = build_router(state);

    let addr = config.bind_addr();
    info!("Starting server on {} (predictor: {})", addr, config.predictor.kind());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
