//! Notification collaborator
//!
//! The core emits events; delivery (email/push) lives outside. Emission is
//! best-effort and non-blocking: a sink that cannot accept an event must
//! never roll back or delay a settlement.

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::core_types::UserId;

/// Events emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A TransactionRecord or LoanApplication changed status
    StatusChange {
        entity_id: String,
        old_status: String,
        new_status: String,
    },
    /// An OTP code must be delivered to the owner out-of-band
    OtpIssued { owner_id: UserId, code: String },
    /// A user flagged that a transfer code is needed (admin fulfils)
    CodeRequested { owner_id: UserId, code_type: String },
}

/// Fire-and-forget event sink.
///
/// Implementations must not block and must not propagate failure.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: Notification);

    fn on_status_change(&self, entity_id: &str, old_status: &str, new_status: &str) {
        self.emit(Notification::StatusChange {
            entity_id: entity_id.to_string(),
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
        });
    }
}

/// Sink that forwards events to an unbounded channel.
///
/// `send` on an unbounded channel never blocks; if the receiver is gone the
/// event is dropped with a warning.
pub struct ChannelSink {
    tx: UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn emit(&self, event: Notification) {
        if self.tx.send(event).is_err() {
            warn!("notification receiver gone, event dropped");
        }
    }
}

/// Sink that discards everything.
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn emit(&self, _event: Notification) {}
}

/// Sink that records every event, for assertions in tests.
pub struct MemorySink {
    events: std::sync::Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("sink poisoned").clone()
    }

    /// Last OTP code delivered to `owner_id`, if any.
    pub fn last_otp_code(&self, owner_id: UserId) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                Notification::OtpIssued {
                    owner_id: owner,
                    code,
                } if owner == owner_id => Some(code),
                _ => None,
            })
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MemorySink {
    fn emit(&self, event: Notification) {
        self.events.lock().expect("sink poisoned").push(event);
    }
}
