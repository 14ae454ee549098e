//! OpenAPI Documentation
//!
//! Auto-generated OpenAPI 3.0 document for the banking core API, served
//! as JSON at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::gateway::handlers::admin::{
    CodeIssued, DecisionRequest, DecisionResponse, IssueCodeRequest, RejectRequest,
    ResetCodeRequest,
};
use crate::gateway::handlers::funding::{FundingRequest, SubmittedTransaction};
use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::handlers::loan::{
    DisburseRequest, FeeProofRequest, LoanApplyRequest, LoanApproveRequest, LoanDto,
    LoanRejectRequest, LoanStatusResponse, ProposeRequest, RequestFeeRequest,
};
use crate::gateway::handlers::query::TransactionDto;
use crate::gateway::handlers::transfer::{
    BeginTransferRequest, ChallengeResponse, CodeActionRequest, CodeStatus,
    CompleteTransferRequest, TransferAdmitted, VerifyCodeRequest,
};
use crate::gateway::handlers::wallet::{OpenWalletRequest, WalletDto};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aegis Bank Core API",
        version = "1.0.0",
        description = "Funds-movement core: wallet ledger, settlement state machine, multi-factor pre-authorization.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::wallet::open_wallet,
        crate::gateway::handlers::wallet::get_wallet,
        crate::gateway::handlers::funding::submit_deposit,
        crate::gateway::handlers::funding::submit_withdrawal,
        crate::gateway::handlers::query::get_transaction,
        crate::gateway::handlers::transfer::begin_transfer,
        crate::gateway::handlers::transfer::complete_transfer,
        crate::gateway::handlers::transfer::request_transfer_code,
        crate::gateway::handlers::transfer::verify_transfer_code,
        crate::gateway::handlers::admin::approve_transaction,
        crate::gateway::handlers::admin::reject_transaction,
        crate::gateway::handlers::admin::issue_transfer_code,
        crate::gateway::handlers::admin::reset_transfer_code,
        crate::gateway::handlers::loan::apply_loan,
        crate::gateway::handlers::loan::get_loan,
        crate::gateway::handlers::loan::submit_fee_proof,
        crate::gateway::handlers::loan::request_loan_fee,
        crate::gateway::handlers::loan::verify_loan_fee,
        crate::gateway::handlers::loan::approve_loan,
        crate::gateway::handlers::loan::reject_loan,
        crate::gateway::handlers::loan::propose_loan,
        crate::gateway::handlers::loan::disburse_loan,
    ),
    components(
        schemas(
            HealthResponse,
            OpenWalletRequest,
            WalletDto,
            FundingRequest,
            SubmittedTransaction,
            TransactionDto,
            BeginTransferRequest,
            ChallengeResponse,
            CompleteTransferRequest,
            TransferAdmitted,
            CodeActionRequest,
            VerifyCodeRequest,
            CodeStatus,
            DecisionRequest,
            RejectRequest,
            DecisionResponse,
            IssueCodeRequest,
            ResetCodeRequest,
            CodeIssued,
            LoanApplyRequest,
            LoanDto,
            LoanStatusResponse,
            FeeProofRequest,
            RequestFeeRequest,
            LoanApproveRequest,
            LoanRejectRequest,
            ProposeRequest,
            DisburseRequest,
        )
    ),
    tags(
        (name = "System", description = "Health checks and system info"),
        (name = "Wallet", description = "Wallet creation and snapshots"),
        (name = "Funding", description = "Deposit/withdrawal intake"),
        (name = "Transfer", description = "Pre-authorized transfers (OTP + transfer codes)"),
        (name = "Approval", description = "Admin decisions over pending transactions"),
        (name = "Loan", description = "Loan applications and the fee gate")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Aegis Bank Core API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/transfers/begin"));
        assert!(
            paths
                .paths
                .contains_key("/api/v1/admin/transactions/{id}/approve")
        );
        assert!(paths.paths.contains_key("/api/v1/admin/loans/{id}/disburse"));
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("Aegis Bank Core API"));
    }
}
