//! Transfer codes (COT/IMF/TAX)
//!
//! Admin-issued secondary authorization tokens. Unlike an OTP, a verified
//! code is a persistent precondition: `is_verified` stays true until an
//! admin resets it. Failed submissions are logged but not capped.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::error::PreAuthError;
use crate::core_types::UserId;
use crate::notify::{Notification, NotificationSink};

/// Transfer code categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum TransferCodeType {
    /// Cost of Transfer
    Cot = 1,
    /// International Monetary Fund clearance
    Imf = 2,
    /// Tax clearance
    Tax = 3,
}

impl TransferCodeType {
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransferCodeType::Cot),
            2 => Some(TransferCodeType::Imf),
            3 => Some(TransferCodeType::Tax),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferCodeType::Cot => "COT",
            TransferCodeType::Imf => "IMF",
            TransferCodeType::Tax => "TAX",
        }
    }
}

impl fmt::Display for TransferCodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferCodeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COT" => Ok(TransferCodeType::Cot),
            "IMF" => Ok(TransferCodeType::Imf),
            "TAX" => Ok(TransferCodeType::Tax),
            _ => Err(()),
        }
    }
}

/// One admin-issued code for one user.
#[derive(Debug, Clone)]
pub struct TransferCode {
    pub owner_id: UserId,
    pub code_type: TransferCodeType,
    pub code: String,
    pub amount: Option<Decimal>,
    pub is_active: bool,
    pub is_verified: bool,
}

pub struct TransferCodeRegistry {
    codes: DashMap<(UserId, TransferCodeType), Arc<Mutex<TransferCode>>>,
    sink: Arc<dyn NotificationSink>,
}

impl TransferCodeRegistry {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            codes: DashMap::new(),
            sink,
        }
    }

    /// User flags that a code of this type is needed; fulfilled
    /// out-of-band by an admin issuing one.
    pub fn request_code(&self, owner_id: UserId, code_type: TransferCodeType) {
        self.sink.emit(Notification::CodeRequested {
            owner_id,
            code_type: code_type.as_str().to_string(),
        });
        info!(owner_id, code_type = %code_type, "transfer code requested");
    }

    /// Admin issues (or re-issues) a code and activates it. An existing
    /// verification is not cleared here; `reset_code` does that.
    pub fn issue_code(
        &self,
        owner_id: UserId,
        code_type: TransferCodeType,
        code: String,
        amount: Option<Decimal>,
    ) {
        let entry = self
            .codes
            .entry((owner_id, code_type))
            .or_insert_with(|| {
                Arc::new(Mutex::new(TransferCode {
                    owner_id,
                    code_type,
                    code: String::new(),
                    amount: None,
                    is_active: false,
                    is_verified: false,
                }))
            })
            .clone();
        let mut guard = entry.lock().expect("transfer code lock poisoned");
        guard.code = code;
        guard.amount = amount;
        guard.is_active = true;
        info!(owner_id, code_type = %code_type, "transfer code issued");
    }

    /// Admin clears a verification (and deactivates the code).
    pub fn reset_code(&self, owner_id: UserId, code_type: TransferCodeType) {
        if let Some(entry) = self.codes.get(&(owner_id, code_type)) {
            let mut guard = entry.lock().expect("transfer code lock poisoned");
            guard.is_verified = false;
            guard.is_active = false;
            info!(owner_id, code_type = %code_type, "transfer code reset");
        }
    }

    /// User submits a code value. Succeeds only when the code is active
    /// and matches; flips `is_verified`, which then persists.
    pub fn verify_code(
        &self,
        owner_id: UserId,
        code_type: TransferCodeType,
        submitted: &str,
    ) -> Result<(), PreAuthError> {
        let entry = self
            .codes
            .get(&(owner_id, code_type))
            .map(|e| e.value().clone())
            .ok_or(PreAuthError::CodeNotIssued(code_type))?;
        let mut guard = entry.lock().expect("transfer code lock poisoned");

        if !guard.is_active {
            return Err(PreAuthError::CodeInactive(code_type));
        }
        if guard.code != submitted {
            // Counted in logs, deliberately not capped
            warn!(owner_id, code_type = %code_type, "transfer code mismatch");
            return Err(PreAuthError::CodeMismatch(code_type));
        }
        guard.is_verified = true;
        info!(owner_id, code_type = %code_type, "transfer code verified");
        Ok(())
    }

    pub fn is_verified(&self, owner_id: UserId, code_type: TransferCodeType) -> bool {
        self.codes
            .get(&(owner_id, code_type))
            .map(|entry| {
                entry
                    .lock()
                    .expect("transfer code lock poisoned")
                    .is_verified
            })
            .unwrap_or(false)
    }

    /// Required types the user has not verified yet.
    pub fn outstanding(
        &self,
        owner_id: UserId,
        required: &[TransferCodeType],
    ) -> Vec<TransferCodeType> {
        required
            .iter()
            .copied()
            .filter(|code_type| !self.is_verified(owner_id, *code_type))
            .collect()
    }

    pub fn snapshot(
        &self,
        owner_id: UserId,
        code_type: TransferCodeType,
    ) -> Option<TransferCode> {
        let entry = self.codes.get(&(owner_id, code_type))?.value().clone();
        let guard = entry.lock().expect("transfer code lock poisoned");
        Some(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemorySink, NoopSink};
    use rust_decimal_macros::dec;

    fn registry() -> TransferCodeRegistry {
        TransferCodeRegistry::new(Arc::new(NoopSink))
    }

    #[test]
    fn test_type_roundtrip() {
        for code_type in [
            TransferCodeType::Cot,
            TransferCodeType::Imf,
            TransferCodeType::Tax,
        ] {
            assert_eq!(TransferCodeType::from_id(code_type.id()), Some(code_type));
            assert_eq!(
                code_type.as_str().parse::<TransferCodeType>().unwrap(),
                code_type
            );
        }
        assert!("XYZ".parse::<TransferCodeType>().is_err());
        assert_eq!("cot".parse::<TransferCodeType>(), Ok(TransferCodeType::Cot));
    }

    #[test]
    fn test_verify_requires_issued_active_code() {
        let registry = registry();
        assert!(matches!(
            registry.verify_code(1, TransferCodeType::Cot, "C-123"),
            Err(PreAuthError::CodeNotIssued(_))
        ));

        registry.issue_code(1, TransferCodeType::Cot, "C-123".into(), Some(dec!(25)));
        assert!(matches!(
            registry.verify_code(1, TransferCodeType::Cot, "wrong"),
            Err(PreAuthError::CodeMismatch(_))
        ));
        assert!(!registry.is_verified(1, TransferCodeType::Cot));

        registry.verify_code(1, TransferCodeType::Cot, "C-123").unwrap();
        assert!(registry.is_verified(1, TransferCodeType::Cot));
    }

    #[test]
    fn test_verification_persists_until_reset() {
        let registry = registry();
        registry.issue_code(1, TransferCodeType::Imf, "I-9".into(), None);
        registry.verify_code(1, TransferCodeType::Imf, "I-9").unwrap();

        // Still verified afterwards; it is a precondition, not a token
        assert!(registry.is_verified(1, TransferCodeType::Imf));
        assert!(registry.is_verified(1, TransferCodeType::Imf));

        registry.reset_code(1, TransferCodeType::Imf);
        assert!(!registry.is_verified(1, TransferCodeType::Imf));
        assert!(matches!(
            registry.verify_code(1, TransferCodeType::Imf, "I-9"),
            Err(PreAuthError::CodeInactive(_))
        ));
    }

    #[test]
    fn test_outstanding() {
        let registry = registry();
        let required = [TransferCodeType::Cot, TransferCodeType::Tax];
        assert_eq!(registry.outstanding(1, &required), required.to_vec());

        registry.issue_code(1, TransferCodeType::Cot, "C-1".into(), None);
        registry.verify_code(1, TransferCodeType::Cot, "C-1").unwrap();
        assert_eq!(
            registry.outstanding(1, &required),
            vec![TransferCodeType::Tax]
        );
    }

    #[test]
    fn test_request_code_notifies_admin() {
        let sink = Arc::new(MemorySink::new());
        let registry = TransferCodeRegistry::new(sink.clone());
        registry.request_code(5, TransferCodeType::Tax);

        assert_eq!(
            sink.events(),
            vec![Notification::CodeRequested {
                owner_id: 5,
                code_type: "TAX".into(),
            }]
        );
    }
}
