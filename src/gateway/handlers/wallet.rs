//! Wallet handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use crate::ledger::Wallet;
use crate::money::{self, Currency};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenWalletRequest {
    #[schema(example = 1001_u64)]
    pub owner_id: u64,
    #[schema(example = "USD")]
    pub currency: String,
    /// Seeding/migration path; normal accounts start at zero
    #[schema(example = "1000.00")]
    pub opening_balance: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletDto {
    pub id: u64,
    pub owner_id: u64,
    #[schema(example = "1000.00")]
    pub balance: String,
    pub currency: String,
    pub version: u64,
    pub updated_at: i64,
}

impl From<Wallet> for WalletDto {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id(),
            owner_id: w.owner_id(),
            balance: w.balance().to_string(),
            currency: w.currency().to_string(),
            version: w.version(),
            updated_at: w.updated_at(),
        }
    }
}

/// Open a wallet for an account
#[utoipa::path(
    post,
    path = "/api/v1/wallets",
    request_body = OpenWalletRequest,
    responses(
        (status = 200, description = "Wallet opened", body = WalletDto),
        (status = 400, description = "Invalid parameters")
    ),
    tag = "Wallet"
)]
pub async fn open_wallet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenWalletRequest>,
) -> ApiResult<WalletDto> {
    let currency = Currency::new(req.currency);
    let wallet_id = match req.opening_balance {
        Some(raw) => {
            let balance = money::parse_amount(&raw, money::MAX_SCALE)?;
            state
                .ledger
                .open_wallet_with_balance(req.owner_id, currency, balance)
        }
        None => state.ledger.open_wallet(req.owner_id, currency),
    };
    let wallet = state.ledger.get(wallet_id)?;
    ok(wallet.into())
}

/// Look up a wallet snapshot
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{id}",
    responses(
        (status = 200, description = "Wallet snapshot", body = WalletDto),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<WalletDto> {
    match state.ledger.get(id) {
        Ok(wallet) => ok(wallet.into()),
        Err(_) => ApiError::not_found(format!("wallet {}", id)).into_err(),
    }
}
