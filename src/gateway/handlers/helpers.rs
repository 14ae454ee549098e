//! Shared handler plumbing: path/body field parsing into domain types

use crate::gateway::types::ApiError;
use crate::loan::LoanId;
use crate::preauth::{ChallengeId, TransferCodeType};
use crate::settlement::TransactionId;

pub fn parse_tx_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid transaction id: {}", raw)))
}

pub fn parse_loan_id(raw: &str) -> Result<LoanId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid loan id: {}", raw)))
}

pub fn parse_challenge_id(raw: &str) -> Result<ChallengeId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid challenge id: {}", raw)))
}

pub fn parse_code_type(raw: &str) -> Result<TransferCodeType, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("unknown transfer code type: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_type() {
        assert_eq!(parse_code_type("cot").unwrap(), TransferCodeType::Cot);
        assert!(parse_code_type("XYZ").is_err());
    }

    #[test]
    fn test_parse_ids() {
        let id = TransactionId::new();
        assert_eq!(parse_tx_id(&id.to_string()).unwrap(), id);
        assert!(parse_tx_id("not-a-ulid!").is_err());
    }
}
