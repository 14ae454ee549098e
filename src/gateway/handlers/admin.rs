//! Admin decision handlers
//!
//! One generic approval surface covers every transaction kind. Role
//! gating sits in front of this router; `admin_id` is the decided-by
//! audit identity.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use super::helpers::{parse_code_type, parse_tx_id};
use crate::money;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    #[schema(example = 9_u64)]
    pub admin_id: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub admin_id: u64,
    /// Stored verbatim for audit
    #[schema(example = "source of funds unclear")]
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub transaction_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCodeRequest {
    pub user_id: u64,
    #[schema(example = "COT")]
    pub code_type: String,
    pub code: String,
    #[schema(example = "25.00")]
    pub amount: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetCodeRequest {
    pub user_id: u64,
    #[schema(example = "COT")]
    pub code_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CodeIssued {
    pub code_type: String,
    pub active: bool,
}

/// Approve a pending transaction (settles the ledger legs)
#[utoipa::path(
    post,
    path = "/api/v1/admin/transactions/{id}/approve",
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision applied", body = DecisionResponse),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Already processed")
    ),
    tag = "Approval"
)]
pub async fn approve_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<DecisionResponse> {
    let tx_id = parse_tx_id(&id)?;
    let status = state.approval.approve(tx_id, req.admin_id)?;
    ok(DecisionResponse {
        transaction_id: tx_id.to_string(),
        status: status.to_string(),
    })
}

/// Reject a pending transaction (no ledger effect)
#[utoipa::path(
    post,
    path = "/api/v1/admin/transactions/{id}/reject",
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Decision applied", body = DecisionResponse),
        (status = 400, description = "Reason required"),
        (status = 409, description = "Already processed")
    ),
    tag = "Approval"
)]
pub async fn reject_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> ApiResult<DecisionResponse> {
    let tx_id = parse_tx_id(&id)?;
    let status = state.approval.reject(tx_id, req.admin_id, &req.reason)?;
    ok(DecisionResponse {
        transaction_id: tx_id.to_string(),
        status: status.to_string(),
    })
}

/// Issue (and activate) a transfer code for a user
#[utoipa::path(
    post,
    path = "/api/v1/admin/codes/issue",
    request_body = IssueCodeRequest,
    responses(
        (status = 200, description = "Code issued", body = CodeIssued),
        (status = 400, description = "Invalid parameters")
    ),
    tag = "Approval"
)]
pub async fn issue_transfer_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueCodeRequest>,
) -> ApiResult<CodeIssued> {
    let code_type = parse_code_type(&req.code_type)?;
    let amount = match req.amount {
        Some(raw) => Some(money::parse_amount(&raw, money::MAX_SCALE)?),
        None => None,
    };
    state
        .codes
        .issue_code(req.user_id, code_type, req.code, amount);
    ok(CodeIssued {
        code_type: code_type.to_string(),
        active: true,
    })
}

/// Reset a user's transfer code verification
#[utoipa::path(
    post,
    path = "/api/v1/admin/codes/reset",
    request_body = ResetCodeRequest,
    responses(
        (status = 200, description = "Code reset", body = CodeIssued),
        (status = 400, description = "Unknown code type")
    ),
    tag = "Approval"
)]
pub async fn reset_transfer_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetCodeRequest>,
) -> ApiResult<CodeIssued> {
    let code_type = parse_code_type(&req.code_type)?;
    state.codes.reset_code(req.user_id, code_type);
    ok(CodeIssued {
        code_type: code_type.to_string(),
        active: false,
    })
}
