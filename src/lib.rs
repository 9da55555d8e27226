pub mod accounts;
pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod ports;
pub mod settlement;
pub mod validation;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::accounts::AccountClient;
use crate::ports::TransactionRepository;
use crate::settlement::SettlementEngine;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub account_client: AccountClient,
    pub repository: Arc<dyn TransactionRepository>,
    pub engine: SettlementEngine,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/transactions",
            post(handlers::transactions::create_transaction)
                .get(handlers::transactions::list_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::transactions::get_transaction),
        )
        .route(
            "/transactions/reference/:reference",
            get(handlers::transactions::get_transaction_by_reference),
        )
        .route(
            "/accounts/:id/transactions",
            get(handlers::transactions::list_account_transactions),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
