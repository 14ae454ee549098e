//! Transaction record store
//!
//! In-memory record map with a unique-reference index. The reference index
//! is claimed before the record is visible, so two submissions racing on
//! the same idempotency key cannot both create a record.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::error::SettlementError;
use super::types::{TransactionId, TransactionRecord};

pub struct TransactionStore {
    records: DashMap<TransactionId, Arc<Mutex<TransactionRecord>>>,
    by_reference: DashMap<String, TransactionId>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            by_reference: DashMap::new(),
        }
    }

    /// Insert a new PENDING record; its `reference` must be globally unique.
    pub fn insert(&self, record: TransactionRecord) -> Result<TransactionId, SettlementError> {
        let id = record.id;
        match self.by_reference.entry(record.reference.clone()) {
            Entry::Occupied(_) => {
                return Err(SettlementError::DuplicateReference(record.reference));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        self.records.insert(id, Arc::new(Mutex::new(record)));
        Ok(id)
    }

    /// Shared handle to a record for locked mutation.
    pub fn get(&self, id: TransactionId) -> Option<Arc<Mutex<TransactionRecord>>> {
        self.records.get(&id).map(|e| e.value().clone())
    }

    pub fn get_by_reference(&self, reference: &str) -> Option<Arc<Mutex<TransactionRecord>>> {
        let id = *self.by_reference.get(reference)?.value();
        self.get(id)
    }

    /// Point-in-time copy for queries.
    pub fn snapshot(&self, id: TransactionId) -> Option<TransactionRecord> {
        let record = self.get(id)?;
        let guard = record.lock().expect("transaction lock poisoned");
        Some(guard.clone())
    }
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insert_and_snapshot() {
        let store = TransactionStore::new();
        let record =
            TransactionRecord::deposit(1, dec!(100), Currency::new("USD"), "dep-1".into());
        let id = store.insert(record).unwrap();

        let snapshot = store.snapshot(id).unwrap();
        assert_eq!(snapshot.reference, "dep-1");
        assert!(store.get_by_reference("dep-1").is_some());
        assert!(store.get_by_reference("dep-2").is_none());
    }

    #[test]
    fn test_duplicate_reference_rejected() {
        let store = TransactionStore::new();
        let first = TransactionRecord::deposit(1, dec!(100), Currency::new("USD"), "dep-1".into());
        let second = TransactionRecord::deposit(2, dec!(50), Currency::new("USD"), "dep-1".into());

        store.insert(first).unwrap();
        let err = store.insert(second).unwrap_err();
        assert!(matches!(err, SettlementError::DuplicateReference(r) if r == "dep-1"));
    }
}
