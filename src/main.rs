use std::sync::Arc;

use anyhow::Context;

use vitalog_api::config::Config;
use vitalog_api::repository::{MemoryRecordRepository, PgRecordRepository, RecordRepository};
use vitalog_api::{app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitalog_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let repo: Arc<dyn RecordRepository> = match &config.database_url {
        Some(url) => Arc::new(PgRecordRepository::new(db::create_pool(url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryRecordRepository::new())
        }
    };

    let addr = config.listen_addr();
    let state = AppState::new(repo, config);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
