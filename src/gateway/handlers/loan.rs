//! Loan handlers: user surface + admin LoanFeeGate surface

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use super::helpers::parse_loan_id;
use crate::loan::LoanApplication;
use crate::money;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoanApplyRequest {
    #[schema(example = 1001_u64)]
    pub user_id: u64,
    /// Disbursement target wallet
    pub wallet_id: u64,
    #[schema(example = "50000.00")]
    pub amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoanDto {
    pub id: String,
    pub user_id: u64,
    pub wallet_id: u64,
    #[schema(example = "50000.00")]
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub processing_fee: Option<String>,
    pub fee_wallet_address: Option<String>,
    pub fee_payment_proof: Option<String>,
    pub approval_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<LoanApplication> for LoanDto {
    fn from(l: LoanApplication) -> Self {
        Self {
            id: l.id.to_string(),
            user_id: l.user_id,
            wallet_id: l.wallet_id,
            amount: l.amount.to_string(),
            currency: l.currency.to_string(),
            status: l.status.to_string(),
            processing_fee: l.processing_fee.map(|f| f.to_string()),
            fee_wallet_address: l.fee_wallet_address,
            fee_payment_proof: l.fee_payment_proof,
            approval_note: l.approval_note,
            rejection_reason: l.rejection_reason,
            reviewed_at: l.reviewed_at,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoanStatusResponse {
    pub loan_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeeProofRequest {
    pub user_id: u64,
    #[schema(example = "wire-ref-8841")]
    pub proof_ref: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestFeeRequest {
    #[schema(example = "20.00")]
    pub fee: String,
    pub wallet_address: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoanApproveRequest {
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoanRejectRequest {
    #[schema(example = "income verification failed")]
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProposeRequest {
    #[schema(example = "30000.00")]
    pub amount: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DisburseRequest {
    #[schema(example = 9_u64)]
    pub admin_id: u64,
}

fn status_of(state: &AppState, loan_id: crate::loan::LoanId) -> ApiResult<LoanStatusResponse> {
    match state.loans.snapshot(loan_id) {
        Some(loan) => ok(LoanStatusResponse {
            loan_id: loan.id.to_string(),
            status: loan.status.to_string(),
        }),
        None => ApiError::not_found(format!("loan {}", loan_id)).into_err(),
    }
}

/// Apply for a loan
#[utoipa::path(
    post,
    path = "/api/v1/loans",
    request_body = LoanApplyRequest,
    responses(
        (status = 200, description = "Application created", body = LoanStatusResponse),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Loan"
)]
pub async fn apply_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoanApplyRequest>,
) -> ApiResult<LoanStatusResponse> {
    let amount = money::parse_amount(&req.amount, money::MAX_SCALE)?;
    let loan_id = state.loans.apply(req.user_id, req.wallet_id, amount)?;
    status_of(&state, loan_id)
}

/// Look up a loan application
#[utoipa::path(
    get,
    path = "/api/v1/loans/{id}",
    responses(
        (status = 200, description = "Loan snapshot", body = LoanDto),
        (status = 404, description = "Loan not found")
    ),
    tag = "Loan"
)]
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<LoanDto> {
    let loan_id = parse_loan_id(&id)?;
    match state.loans.snapshot(loan_id) {
        Some(loan) => ok(loan.into()),
        None => ApiError::not_found(format!("loan {}", id)).into_err(),
    }
}

/// Submit proof that the processing fee was paid
#[utoipa::path(
    post,
    path = "/api/v1/loans/{id}/fee-proof",
    request_body = FeeProofRequest,
    responses(
        (status = 200, description = "Proof recorded", body = LoanStatusResponse),
        (status = 409, description = "Not awaiting a fee")
    ),
    tag = "Loan"
)]
pub async fn submit_fee_proof(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<FeeProofRequest>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    state
        .loans
        .submit_fee_proof(loan_id, req.user_id, &req.proof_ref)?;
    status_of(&state, loan_id)
}

/// Admin: insert the processing-fee step
#[utoipa::path(
    post,
    path = "/api/v1/admin/loans/{id}/request-fee",
    request_body = RequestFeeRequest,
    responses(
        (status = 200, description = "Fee requested", body = LoanStatusResponse),
        (status = 409, description = "Not pending")
    ),
    tag = "Loan"
)]
pub async fn request_loan_fee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RequestFeeRequest>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    let fee = money::parse_amount(&req.fee, money::MAX_SCALE)?;
    state
        .loans
        .request_fee(loan_id, fee, &req.wallet_address, req.note)?;
    status_of(&state, loan_id)
}

/// Admin: confirm the fee arrived
#[utoipa::path(
    post,
    path = "/api/v1/admin/loans/{id}/verify-fee",
    responses(
        (status = 200, description = "Fee verified", body = LoanStatusResponse),
        (status = 409, description = "No fee proof to verify")
    ),
    tag = "Loan"
)]
pub async fn verify_loan_fee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    state.loans.verify_fee(loan_id)?;
    status_of(&state, loan_id)
}

/// Admin: approve directly, skipping the fee step
#[utoipa::path(
    post,
    path = "/api/v1/admin/loans/{id}/approve",
    request_body = LoanApproveRequest,
    responses(
        (status = 200, description = "Approved", body = LoanStatusResponse),
        (status = 409, description = "Not pending")
    ),
    tag = "Loan"
)]
pub async fn approve_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<LoanApproveRequest>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    state.loans.approve(loan_id, req.note)?;
    status_of(&state, loan_id)
}

/// Admin: reject the application
#[utoipa::path(
    post,
    path = "/api/v1/admin/loans/{id}/reject",
    request_body = LoanRejectRequest,
    responses(
        (status = 200, description = "Rejected", body = LoanStatusResponse),
        (status = 400, description = "Reason required"),
        (status = 409, description = "Not rejectable")
    ),
    tag = "Loan"
)]
pub async fn reject_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<LoanRejectRequest>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    state.loans.reject(loan_id, &req.reason)?;
    status_of(&state, loan_id)
}

/// Admin: amend the requested amount
#[utoipa::path(
    post,
    path = "/api/v1/admin/loans/{id}/propose",
    request_body = ProposeRequest,
    responses(
        (status = 200, description = "Amount amended", body = LoanStatusResponse),
        (status = 409, description = "Not pending")
    ),
    tag = "Loan"
)]
pub async fn propose_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ProposeRequest>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    let amount = money::parse_amount(&req.amount, money::MAX_SCALE)?;
    state.loans.propose(loan_id, amount, req.note)?;
    status_of(&state, loan_id)
}

/// Admin: disburse the principal (the single ledger-crediting transition)
#[utoipa::path(
    post,
    path = "/api/v1/admin/loans/{id}/disburse",
    request_body = DisburseRequest,
    responses(
        (status = 200, description = "Disbursed", body = LoanStatusResponse),
        (status = 409, description = "Already processed or not approved")
    ),
    tag = "Loan"
)]
pub async fn disburse_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DisburseRequest>,
) -> ApiResult<LoanStatusResponse> {
    let loan_id = parse_loan_id(&id)?;
    state.loans.disburse(loan_id, req.admin_id)?;
    status_of(&state, loan_id)
}
