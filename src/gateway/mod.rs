//! HTTP gateway
//!
//! Thin axum surface over the core services. All domain rules live in the
//! services; handlers parse, delegate, and map errors through the unified
//! envelope.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

use crate::config::GatewayConfig;
use openapi::ApiDoc;
use state::AppState;

/// Assemble the full route table.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // System
        .route("/api/v1/health", get(handlers::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Wallets
        .route("/api/v1/wallets", post(handlers::open_wallet))
        .route("/api/v1/wallets/{id}", get(handlers::get_wallet))
        // Funding intake
        .route("/api/v1/funding/deposits", post(handlers::submit_deposit))
        .route(
            "/api/v1/funding/withdrawals",
            post(handlers::submit_withdrawal),
        )
        // Transactions
        .route("/api/v1/transactions/{id}", get(handlers::get_transaction))
        // Pre-authorized transfers
        .route("/api/v1/transfers/begin", post(handlers::begin_transfer))
        .route(
            "/api/v1/transfers/complete",
            post(handlers::complete_transfer),
        )
        .route(
            "/api/v1/transfers/codes/request",
            post(handlers::request_transfer_code),
        )
        .route(
            "/api/v1/transfers/codes/verify",
            post(handlers::verify_transfer_code),
        )
        // Admin decisions
        .route(
            "/api/v1/admin/transactions/{id}/approve",
            post(handlers::approve_transaction),
        )
        .route(
            "/api/v1/admin/transactions/{id}/reject",
            post(handlers::reject_transaction),
        )
        .route(
            "/api/v1/admin/codes/issue",
            post(handlers::issue_transfer_code),
        )
        .route(
            "/api/v1/admin/codes/reset",
            post(handlers::reset_transfer_code),
        )
        // Loans
        .route("/api/v1/loans", post(handlers::apply_loan))
        .route("/api/v1/loans/{id}", get(handlers::get_loan))
        .route(
            "/api/v1/loans/{id}/fee-proof",
            post(handlers::submit_fee_proof),
        )
        .route(
            "/api/v1/admin/loans/{id}/request-fee",
            post(handlers::request_loan_fee),
        )
        .route(
            "/api/v1/admin/loans/{id}/verify-fee",
            post(handlers::verify_loan_fee),
        )
        .route(
            "/api/v1/admin/loans/{id}/approve",
            post(handlers::approve_loan),
        )
        .route(
            "/api/v1/admin/loans/{id}/reject",
            post(handlers::reject_loan),
        )
        .route(
            "/api/v1/admin/loans/{id}/propose",
            post(handlers::propose_loan),
        )
        .route(
            "/api/v1/admin/loans/{id}/disburse",
            post(handlers::disburse_loan),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, config: &GatewayConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("gateway listening on {}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
