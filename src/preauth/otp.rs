//! OTP challenge service
//!
//! Time-boxed, single-use, attempt-limited proof of channel control.
//! Codes are delivered out-of-band by the notification collaborator and
//! stored only as argon2 hashes. Expiry is checked lazily at verify time;
//! there is no timer thread.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use dashmap::DashMap;
use rand::Rng;
use tracing::{debug, info};

use super::error::PreAuthError;
use crate::core_types::UserId;
use crate::notify::{Notification, NotificationSink};

/// Challenge ID - ULID-based unique identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChallengeId(ulid::Ulid);

impl ChallengeId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for ChallengeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChallengeId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// One live-or-dead OTP challenge.
///
/// `metadata` is an opaque payload echoed back on successful verification:
/// the caller parks its pending operation parameters here so they cannot
/// be tampered with between challenge and completion.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: ChallengeId,
    pub owner_id: UserId,
    pub purpose: String,
    pub metadata: serde_json::Value,
    pub code_hash: String,
    pub expires_at: i64,
    pub attempts_remaining: u32,
    pub consumed_at: Option<i64>,
}

impl OtpChallenge {
    fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

pub struct OtpService {
    challenges: DashMap<ChallengeId, Arc<Mutex<OtpChallenge>>>,
    /// (owner, purpose) -> the single live challenge
    live: DashMap<(UserId, String), ChallengeId>,
    ttl_secs: u64,
    max_attempts: u32,
    sink: Arc<dyn NotificationSink>,
}

impl OtpService {
    pub fn new(ttl_secs: u64, max_attempts: u32, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            challenges: DashMap::new(),
            live: DashMap::new(),
            ttl_secs,
            max_attempts,
            sink,
        }
    }

    /// Start a challenge for `(owner, purpose)`, invalidating any prior
    /// live challenge for the same pair. The fresh code goes to the
    /// notification sink for out-of-band delivery; only its hash is kept.
    pub fn start(
        &self,
        owner_id: UserId,
        purpose: &str,
        metadata: serde_json::Value,
    ) -> Result<ChallengeId, PreAuthError> {
        let code = generate_code();
        let code_hash = hash_code(&code)?;

        let id = ChallengeId::new();
        let challenge = OtpChallenge {
            id,
            owner_id,
            purpose: purpose.to_string(),
            metadata,
            code_hash,
            expires_at: Utc::now().timestamp_millis() + (self.ttl_secs as i64) * 1000,
            attempts_remaining: self.max_attempts,
            consumed_at: None,
        };
        self.challenges.insert(id, Arc::new(Mutex::new(challenge)));

        if let Some(prior_id) = self.live.insert((owner_id, purpose.to_string()), id) {
            // Supersede: a later verify of the old challenge must fail
            if let Some(prior) = self.challenges.get(&prior_id) {
                let mut guard = prior.lock().expect("challenge lock poisoned");
                if !guard.is_consumed() {
                    guard.consumed_at = Some(Utc::now().timestamp_millis());
                    debug!(challenge_id = %prior_id, "prior challenge invalidated");
                }
            }
        }

        self.sink.emit(Notification::OtpIssued {
            owner_id,
            code,
        });
        info!(challenge_id = %id, owner_id, purpose, "otp challenge started");
        Ok(id)
    }

    /// Verify a code against a challenge. On match the challenge is
    /// consumed and the stored metadata is returned to the caller.
    pub fn verify(
        &self,
        owner_id: UserId,
        challenge_id: ChallengeId,
        code: &str,
    ) -> Result<serde_json::Value, PreAuthError> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .map(|e| e.value().clone())
            .ok_or(PreAuthError::ChallengeNotFound)?;
        let mut guard = challenge.lock().expect("challenge lock poisoned");

        if guard.owner_id != owner_id {
            return Err(PreAuthError::ChallengeNotFound);
        }
        if guard.is_consumed() {
            return Err(PreAuthError::OtpAlreadyConsumed);
        }
        if guard.is_expired(Utc::now().timestamp_millis()) {
            return Err(PreAuthError::OtpExpired);
        }
        if guard.attempts_remaining == 0 {
            return Err(PreAuthError::OtpAttemptsExceeded);
        }

        if !code_matches(code, &guard.code_hash)? {
            guard.attempts_remaining -= 1;
            debug!(
                challenge_id = %challenge_id,
                attempts_remaining = guard.attempts_remaining,
                "otp mismatch"
            );
            return if guard.attempts_remaining == 0 {
                Err(PreAuthError::OtpAttemptsExceeded)
            } else {
                Err(PreAuthError::OtpMismatch {
                    attempts_remaining: guard.attempts_remaining,
                })
            };
        }

        guard.consumed_at = Some(Utc::now().timestamp_millis());
        self.live
            .remove_if(&(owner_id, guard.purpose.clone()), |_, live_id| {
                *live_id == challenge_id
            });
        info!(challenge_id = %challenge_id, owner_id, "otp verified");
        Ok(guard.metadata.clone())
    }

    /// Snapshot for queries/tests.
    pub fn snapshot(&self, challenge_id: ChallengeId) -> Option<OtpChallenge> {
        let challenge = self.challenges.get(&challenge_id)?.value().clone();
        let guard = challenge.lock().expect("challenge lock poisoned");
        Some(guard.clone())
    }
}

fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

fn hash_code(code: &str) -> Result<String, PreAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PreAuthError::HashFailure(e.to_string()))
}

fn code_matches(code: &str, stored_hash: &str) -> Result<bool, PreAuthError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| PreAuthError::HashFailure(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(code.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use serde_json::json;

    fn service(ttl_secs: u64, max_attempts: u32) -> (OtpService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (
            OtpService::new(ttl_secs, max_attempts, sink.clone()),
            sink,
        )
    }

    #[test]
    fn test_verify_returns_metadata() {
        let (otp, sink) = service(300, 5);
        let id = otp.start(7, "transfer", json!({"amount": "500"})).unwrap();
        let code = sink.last_otp_code(7).unwrap();

        let metadata = otp.verify(7, id, &code).unwrap();
        assert_eq!(metadata, json!({"amount": "500"}));
    }

    #[test]
    fn test_single_use() {
        let (otp, sink) = service(300, 5);
        let id = otp.start(7, "transfer", json!({})).unwrap();
        let code = sink.last_otp_code(7).unwrap();

        otp.verify(7, id, &code).unwrap();
        assert!(matches!(
            otp.verify(7, id, &code),
            Err(PreAuthError::OtpAlreadyConsumed)
        ));
    }

    #[test]
    fn test_expired_challenge_rejects_correct_code() {
        let (otp, sink) = service(0, 5);
        let id = otp.start(7, "transfer", json!({})).unwrap();
        let code = sink.last_otp_code(7).unwrap();

        // ttl of zero: already past expires_at at verify time
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(matches!(
            otp.verify(7, id, &code),
            Err(PreAuthError::OtpExpired)
        ));
    }

    #[test]
    fn test_mismatch_decrements_then_exceeds() {
        let (otp, sink) = service(300, 2);
        let id = otp.start(7, "transfer", json!({})).unwrap();
        let code = sink.last_otp_code(7).unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(matches!(
            otp.verify(7, id, wrong),
            Err(PreAuthError::OtpMismatch {
                attempts_remaining: 1
            })
        ));
        assert!(matches!(
            otp.verify(7, id, wrong),
            Err(PreAuthError::OtpAttemptsExceeded)
        ));
        // Attempts stay exhausted even for the right code
        assert!(matches!(
            otp.verify(7, id, &code),
            Err(PreAuthError::OtpAttemptsExceeded)
        ));
    }

    #[test]
    fn test_new_challenge_invalidates_prior() {
        let (otp, sink) = service(300, 5);
        let first = otp.start(7, "transfer", json!({})).unwrap();
        let first_code = sink.last_otp_code(7).unwrap();

        let second = otp.start(7, "transfer", json!({})).unwrap();
        let second_code = sink.last_otp_code(7).unwrap();

        assert!(matches!(
            otp.verify(7, first, &first_code),
            Err(PreAuthError::OtpAlreadyConsumed)
        ));
        otp.verify(7, second, &second_code).unwrap();
    }

    #[test]
    fn test_owner_mismatch_hides_challenge() {
        let (otp, sink) = service(300, 5);
        let id = otp.start(7, "transfer", json!({})).unwrap();
        let code = sink.last_otp_code(7).unwrap();
        assert!(matches!(
            otp.verify(8, id, &code),
            Err(PreAuthError::ChallengeNotFound)
        ));
    }

    #[test]
    fn test_different_purposes_live_independently() {
        let (otp, sink) = service(300, 5);
        let transfer = otp.start(7, "transfer", json!({})).unwrap();
        let transfer_code = sink.last_otp_code(7).unwrap();
        let withdrawal = otp.start(7, "withdrawal", json!({})).unwrap();
        let withdrawal_code = sink.last_otp_code(7).unwrap();

        otp.verify(7, transfer, &transfer_code).unwrap();
        otp.verify(7, withdrawal, &withdrawal_code).unwrap();
    }
}
