//! Transaction query handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use serde::Serialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use super::helpers::parse_tx_id;
use crate::settlement::TransactionRecord;

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    pub id: String,
    pub kind: String,
    pub status: String,
    #[schema(example = "500.00")]
    pub amount: String,
    pub currency: String,
    pub sender_wallet_id: Option<u64>,
    pub receiver_wallet_id: Option<u64>,
    pub reference: String,
    pub reason: Option<String>,
    pub created_at: i64,
    pub decided_at: Option<i64>,
    pub decided_by: Option<u64>,
}

impl From<TransactionRecord> for TransactionDto {
    fn from(r: TransactionRecord) -> Self {
        Self {
            id: r.id.to_string(),
            kind: r.kind.to_string(),
            status: r.status.to_string(),
            amount: r.amount.to_string(),
            currency: r.currency.to_string(),
            sender_wallet_id: r.sender_wallet_id,
            receiver_wallet_id: r.receiver_wallet_id,
            reference: r.reference,
            reason: r.reason,
            created_at: r.created_at,
            decided_at: r.decided_at,
            decided_by: r.decided_by,
        }
    }
}

/// Look up a transaction record
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    responses(
        (status = 200, description = "Transaction snapshot", body = TransactionDto),
        (status = 404, description = "Transaction not found")
    ),
    tag = "Approval"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TransactionDto> {
    let tx_id = parse_tx_id(&id)?;
    match state.transactions.snapshot(tx_id) {
        Some(record) => ok(record.into()),
        None => ApiError::not_found(format!("transaction {}", id)).into_err(),
    }
}
