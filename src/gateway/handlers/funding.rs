//! Deposit/withdrawal intake handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use crate::money::{self, Currency};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FundingRequest {
    #[schema(example = 1_u64)]
    pub wallet_id: u64,
    #[schema(example = "100.00")]
    pub amount: String,
    #[schema(example = "USD")]
    pub currency: String,
    /// External idempotency key, e.g. a chain transaction hash
    #[schema(example = "0xabc123")]
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmittedTransaction {
    pub transaction_id: String,
    pub status: String,
}

/// Queue an inbound deposit for approval
#[utoipa::path(
    post,
    path = "/api/v1/funding/deposits",
    request_body = FundingRequest,
    responses(
        (status = 200, description = "Deposit queued", body = SubmittedTransaction),
        (status = 400, description = "Invalid parameters"),
        (status = 409, description = "Duplicate reference")
    ),
    tag = "Funding"
)]
pub async fn submit_deposit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundingRequest>,
) -> ApiResult<SubmittedTransaction> {
    let amount = money::parse_amount(&req.amount, money::MAX_SCALE)?;
    let tx_id = state.funding.submit_deposit(
        req.wallet_id,
        amount,
        Currency::new(req.currency),
        &req.reference,
    )?;
    ok(SubmittedTransaction {
        transaction_id: tx_id.to_string(),
        status: "PENDING".to_string(),
    })
}

/// Queue an outbound withdrawal for approval
#[utoipa::path(
    post,
    path = "/api/v1/funding/withdrawals",
    request_body = FundingRequest,
    responses(
        (status = 200, description = "Withdrawal queued", body = SubmittedTransaction),
        (status = 400, description = "Invalid parameters"),
        (status = 409, description = "Duplicate reference")
    ),
    tag = "Funding"
)]
pub async fn submit_withdrawal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundingRequest>,
) -> ApiResult<SubmittedTransaction> {
    let amount = money::parse_amount(&req.amount, money::MAX_SCALE)?;
    let tx_id = state.funding.submit_withdrawal(
        req.wallet_id,
        amount,
        Currency::new(req.currency),
        &req.reference,
    )?;
    ok(SubmittedTransaction {
        transaction_id: tx_id.to_string(),
        status: "PENDING".to_string(),
    })
}
