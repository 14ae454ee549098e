//! Composed pre-authorization gate
//!
//! `begin_transfer` validates the request and parks it in an OTP
//! challenge; `complete_transfer` re-checks the transfer-code
//! preconditions, verifies the OTP, and creates the PENDING record from
//! the metadata captured at challenge time. The client's parameters are
//! never read a second time, so nothing can be tampered with between
//! challenge and settlement.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::PreAuthError;
use super::otp::{ChallengeId, OtpService};
use super::transfer_code::{TransferCodeRegistry, TransferCodeType};
use crate::core_types::{UserId, WalletId};
use crate::ledger::WalletLedger;
use crate::money::{self, Currency};
use crate::settlement::{TransactionId, TransactionRecord, TransactionStore};

/// OTP purpose under which pending transfers are parked.
pub const TRANSFER_PURPOSE: &str = "transfer";

/// Transfer parameters captured at challenge time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingTransfer {
    pub sender_wallet_id: WalletId,
    pub receiver_wallet_id: WalletId,
    pub amount: Decimal,
    pub currency: Currency,
    /// Client idempotency key; generated when absent
    pub reference: Option<String>,
}

pub struct PreAuthorizationGate {
    otp: Arc<OtpService>,
    codes: Arc<TransferCodeRegistry>,
    store: Arc<TransactionStore>,
    ledger: Arc<WalletLedger>,
    required_codes: Vec<TransferCodeType>,
}

impl PreAuthorizationGate {
    pub fn new(
        otp: Arc<OtpService>,
        codes: Arc<TransferCodeRegistry>,
        store: Arc<TransactionStore>,
        ledger: Arc<WalletLedger>,
        required_codes: Vec<TransferCodeType>,
    ) -> Self {
        Self {
            otp,
            codes,
            store,
            ledger,
            required_codes,
        }
    }

    pub fn required_codes(&self) -> &[TransferCodeType] {
        &self.required_codes
    }

    /// Validate a transfer request and open an OTP challenge carrying it.
    pub fn begin_transfer(
        &self,
        owner_id: UserId,
        params: PendingTransfer,
    ) -> Result<ChallengeId, PreAuthError> {
        money::require_positive(params.amount)?;
        if params.sender_wallet_id == params.receiver_wallet_id {
            return Err(PreAuthError::InvalidRequest(
                "sender and receiver wallet are the same".into(),
            ));
        }
        let sender = self
            .ledger
            .get(params.sender_wallet_id)
            .map_err(|_| PreAuthError::WalletNotFound(params.sender_wallet_id))?;
        if sender.owner_id() != owner_id {
            return Err(PreAuthError::InvalidRequest(
                "sender wallet does not belong to the caller".into(),
            ));
        }
        self.ledger
            .get(params.receiver_wallet_id)
            .map_err(|_| PreAuthError::WalletNotFound(params.receiver_wallet_id))?;

        let metadata = serde_json::to_value(&params)
            .map_err(|e| PreAuthError::InvalidRequest(e.to_string()))?;
        self.otp.start(owner_id, TRANSFER_PURPOSE, metadata)
    }

    /// Verify the OTP and, with every required transfer code verified,
    /// admit the transfer to the approval queue.
    ///
    /// The code precondition is checked before the single-use OTP is
    /// consumed, so a user with codes still outstanding keeps the
    /// challenge alive.
    pub fn complete_transfer(
        &self,
        owner_id: UserId,
        challenge_id: ChallengeId,
        code: &str,
    ) -> Result<TransactionId, PreAuthError> {
        let outstanding = self.codes.outstanding(owner_id, &self.required_codes);
        if !outstanding.is_empty() {
            return Err(PreAuthError::TransferCodeRequired(outstanding));
        }

        let metadata = self.otp.verify(owner_id, challenge_id, code)?;
        let params: PendingTransfer = serde_json::from_value(metadata)
            .map_err(|e| PreAuthError::InvalidRequest(e.to_string()))?;

        let reference = params
            .reference
            .clone()
            .unwrap_or_else(|| format!("tfr-{}", ulid::Ulid::new()));
        let record = TransactionRecord::transfer(
            params.sender_wallet_id,
            params.receiver_wallet_id,
            params.amount,
            params.currency.clone(),
            reference,
        );
        let tx_id = self.store.insert(record).map_err(|e| match e {
            crate::settlement::SettlementError::DuplicateReference(r) => {
                PreAuthError::DuplicateReference(r)
            }
            other => PreAuthError::InvalidRequest(other.to_string()),
        })?;

        info!(
            tx_id = %tx_id,
            owner_id,
            "transfer admitted to approval queue"
        );
        Ok(tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use crate::settlement::TxStatus;
    use rust_decimal_macros::dec;

    struct Fixture {
        gate: PreAuthorizationGate,
        codes: Arc<TransferCodeRegistry>,
        store: Arc<TransactionStore>,
        ledger: Arc<WalletLedger>,
        sink: Arc<MemorySink>,
        sender: WalletId,
        receiver: WalletId,
    }

    fn fixture(required: Vec<TransferCodeType>) -> Fixture {
        let sink = Arc::new(MemorySink::new());
        let otp = Arc::new(OtpService::new(300, 5, sink.clone()));
        let codes = Arc::new(TransferCodeRegistry::new(sink.clone()));
        let store = Arc::new(TransactionStore::new());
        let ledger = Arc::new(WalletLedger::new());
        let usd = Currency::new("USD");
        let sender = ledger.open_wallet_with_balance(7, usd.clone(), dec!(1000));
        let receiver = ledger.open_wallet_with_balance(8, usd, dec!(200));
        let gate = PreAuthorizationGate::new(
            otp,
            codes.clone(),
            store.clone(),
            ledger.clone(),
            required,
        );
        Fixture {
            gate,
            codes,
            store,
            ledger,
            sink,
            sender,
            receiver,
        }
    }

    fn params(f: &Fixture) -> PendingTransfer {
        PendingTransfer {
            sender_wallet_id: f.sender,
            receiver_wallet_id: f.receiver,
            amount: dec!(500),
            currency: Currency::new("USD"),
            reference: None,
        }
    }

    #[test]
    fn test_happy_path_creates_pending_record() {
        let f = fixture(Vec::new());
        let challenge = f.gate.begin_transfer(7, params(&f)).unwrap();
        let code = f.sink.last_otp_code(7).unwrap();

        let tx_id = f.gate.complete_transfer(7, challenge, &code).unwrap();
        let snapshot = f.store.snapshot(tx_id).unwrap();
        assert_eq!(snapshot.status, TxStatus::Pending);
        assert_eq!(snapshot.sender_wallet_id, Some(f.sender));
        assert_eq!(snapshot.receiver_wallet_id, Some(f.receiver));
        assert_eq!(snapshot.amount, dec!(500));
        // Gate admission queues only; no balance moved
        assert_eq!(f.ledger.balance(f.sender).unwrap(), dec!(1000));
    }

    #[test]
    fn test_begin_validates_request() {
        let f = fixture(Vec::new());
        let mut bad = params(&f);
        bad.receiver_wallet_id = bad.sender_wallet_id;
        assert!(matches!(
            f.gate.begin_transfer(7, bad),
            Err(PreAuthError::InvalidRequest(_))
        ));

        let mut zero = params(&f);
        zero.amount = dec!(0);
        assert!(matches!(
            f.gate.begin_transfer(7, zero),
            Err(PreAuthError::InvalidAmount(_))
        ));

        let mut unknown = params(&f);
        unknown.receiver_wallet_id = 999;
        assert!(matches!(
            f.gate.begin_transfer(7, unknown),
            Err(PreAuthError::WalletNotFound(999))
        ));

        // Not the sender wallet's owner
        assert!(matches!(
            f.gate.begin_transfer(8, params(&f)),
            Err(PreAuthError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_required_codes_block_until_verified() {
        let f = fixture(vec![TransferCodeType::Cot]);
        let challenge = f.gate.begin_transfer(7, params(&f)).unwrap();
        let code = f.sink.last_otp_code(7).unwrap();

        let err = f.gate.complete_transfer(7, challenge, &code).unwrap_err();
        assert!(matches!(
            err,
            PreAuthError::TransferCodeRequired(ref t) if t == &vec![TransferCodeType::Cot]
        ));

        // Verify the code out-of-band, then the same challenge still works:
        // the precondition check ran before the OTP was consumed
        f.codes.issue_code(7, TransferCodeType::Cot, "C-1".into(), None);
        f.codes.verify_code(7, TransferCodeType::Cot, "C-1").unwrap();
        f.gate.complete_transfer(7, challenge, &code).unwrap();
    }

    #[test]
    fn test_metadata_drives_record_not_client_params() {
        let f = fixture(Vec::new());
        let challenge = f.gate.begin_transfer(7, params(&f)).unwrap();
        let code = f.sink.last_otp_code(7).unwrap();

        let tx_id = f.gate.complete_transfer(7, challenge, &code).unwrap();
        let snapshot = f.store.snapshot(tx_id).unwrap();
        // Amount comes from the challenge metadata captured at begin time
        assert_eq!(snapshot.amount, dec!(500));
    }

    #[test]
    fn test_client_reference_replay_rejected() {
        let f = fixture(Vec::new());
        let mut with_ref = params(&f);
        with_ref.reference = Some("client-1".into());

        let challenge = f.gate.begin_transfer(7, with_ref.clone()).unwrap();
        let code = f.sink.last_otp_code(7).unwrap();
        f.gate.complete_transfer(7, challenge, &code).unwrap();

        let challenge = f.gate.begin_transfer(7, with_ref).unwrap();
        let code = f.sink.last_otp_code(7).unwrap();
        assert!(matches!(
            f.gate.complete_transfer(7, challenge, &code),
            Err(PreAuthError::DuplicateReference(_))
        ));
    }
}
