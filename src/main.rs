use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::migrate::Migrator;
use tracing_subscriber::prelude::*;

use clearing_core::accounts::AccountClient;
use clearing_core::adapters::PostgresTransactionRepository;
use clearing_core::ports::TransactionRepository;
use clearing_core::settlement::SettlementEngine;
use clearing_core::{AppState, config, create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Account service gateway client
    let account_client = AccountClient::new(
        config.account_service_url.clone(),
        Duration::from_secs(config.account_service_timeout_secs),
    );
    tracing::info!(
        "Account gateway client initialized with URL: {}",
        config.account_service_url
    );

    let repository: Arc<dyn TransactionRepository> =
        Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let engine = SettlementEngine::new(Arc::new(account_client.clone()), repository.clone());

    let state = AppState {
        db: pool,
        account_client,
        repository,
        engine,
    };
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
