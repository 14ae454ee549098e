//! Transfer pre-authorization handlers
//!
//! The transfer submission surface is the gate itself: there is no way to
//! create a transfer record without passing the OTP and transfer-code
//! checks first.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResult, ok};
use super::helpers::{parse_challenge_id, parse_code_type};
use crate::money::{self, Currency};
use crate::preauth::PendingTransfer;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BeginTransferRequest {
    #[schema(example = 1001_u64)]
    pub user_id: u64,
    pub sender_wallet_id: u64,
    pub receiver_wallet_id: u64,
    #[schema(example = "500.00")]
    pub amount: String,
    #[schema(example = "USD")]
    pub currency: String,
    /// Client idempotency key; generated when absent
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeResponse {
    /// Present this id together with the code delivered out-of-band
    pub challenge_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteTransferRequest {
    pub user_id: u64,
    pub challenge_id: String,
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferAdmitted {
    pub transaction_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CodeActionRequest {
    pub user_id: u64,
    #[schema(example = "COT")]
    pub code_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    pub user_id: u64,
    #[schema(example = "COT")]
    pub code_type: String,
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CodeStatus {
    pub code_type: String,
    pub verified: bool,
}

/// Validate a transfer and open the OTP challenge carrying it
#[utoipa::path(
    post,
    path = "/api/v1/transfers/begin",
    request_body = BeginTransferRequest,
    responses(
        (status = 200, description = "Challenge created", body = ChallengeResponse),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Transfer"
)]
pub async fn begin_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BeginTransferRequest>,
) -> ApiResult<ChallengeResponse> {
    let amount = money::parse_amount(&req.amount, money::MAX_SCALE)?;
    let challenge_id = state.gate.begin_transfer(
        req.user_id,
        PendingTransfer {
            sender_wallet_id: req.sender_wallet_id,
            receiver_wallet_id: req.receiver_wallet_id,
            amount,
            currency: Currency::new(req.currency),
            reference: req.reference,
        },
    )?;
    ok(ChallengeResponse {
        challenge_id: challenge_id.to_string(),
    })
}

/// Verify the OTP and admit the transfer to the approval queue
#[utoipa::path(
    post,
    path = "/api/v1/transfers/complete",
    request_body = CompleteTransferRequest,
    responses(
        (status = 200, description = "Transfer admitted", body = TransferAdmitted),
        (status = 403, description = "Gate check failed"),
        (status = 404, description = "Challenge not found")
    ),
    tag = "Transfer"
)]
pub async fn complete_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteTransferRequest>,
) -> ApiResult<TransferAdmitted> {
    let challenge_id = parse_challenge_id(&req.challenge_id)?;
    let tx_id = state
        .gate
        .complete_transfer(req.user_id, challenge_id, &req.code)?;
    ok(TransferAdmitted {
        transaction_id: tx_id.to_string(),
        status: "PENDING".to_string(),
    })
}

/// Flag that a transfer code is needed (fulfilled out-of-band by an admin)
#[utoipa::path(
    post,
    path = "/api/v1/transfers/codes/request",
    request_body = CodeActionRequest,
    responses(
        (status = 200, description = "Request recorded", body = CodeStatus),
        (status = 400, description = "Unknown code type")
    ),
    tag = "Transfer"
)]
pub async fn request_transfer_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CodeActionRequest>,
) -> ApiResult<CodeStatus> {
    let code_type = parse_code_type(&req.code_type)?;
    state.codes.request_code(req.user_id, code_type);
    ok(CodeStatus {
        code_type: code_type.to_string(),
        verified: state.codes.is_verified(req.user_id, code_type),
    })
}

/// Submit a transfer code value
#[utoipa::path(
    post,
    path = "/api/v1/transfers/codes/verify",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code verified", body = CodeStatus),
        (status = 403, description = "Code check failed")
    ),
    tag = "Transfer"
)]
pub async fn verify_transfer_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyCodeRequest>,
) -> ApiResult<CodeStatus> {
    let code_type = parse_code_type(&req.code_type)?;
    state.codes.verify_code(req.user_id, code_type, &req.code)?;
    ok(CodeStatus {
        code_type: code_type.to_string(),
        verified: true,
    })
}
