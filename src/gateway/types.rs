//! Gateway response types
//!
//! - `ApiResponse<T>`: unified response envelope
//! - `ApiError`: domain-error to HTTP mapping
//!
//! Every domain error carries its own `code()`/`http_status()`; this
//! module only translates them into the envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::funding::FundingError;
use crate::ledger::LedgerError;
use crate::loan::LoanError;
use crate::money::MoneyError;
use crate::preauth::PreAuthError;
use crate::settlement::SettlementError;

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = HTTP-aligned error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

/// Handler result: envelope on success, mapped error otherwise
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Error half of the envelope, carrying the HTTP status to respond with.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: u16, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(400, "INVALID_PARAMETER", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(404, "NOT_FOUND", msg)
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.status.as_u16() as i32,
            msg: format!("{}: {}", self.code, self.msg),
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

macro_rules! impl_from_domain_error {
    ($($err:ty),+ $(,)?) => {
        $(
            impl From<$err> for ApiError {
                fn from(e: $err) -> Self {
                    ApiError::new(e.http_status(), e.code(), e.to_string())
                }
            }
        )+
    };
}

impl_from_domain_error!(
    LedgerError,
    SettlementError,
    PreAuthError,
    LoanError,
    FundingError,
);

impl From<MoneyError> for ApiError {
    fn from(e: MoneyError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}
