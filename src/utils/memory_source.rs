//! In-memory record source for testing

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory record source for testing and development
///
/// Records are kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: Arc<RwLock<Vec<ReconciliationRecord>>>,
}

impl MemoryRecordSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source pre-loaded with records, bypassing ingestion checks
    pub fn with_records(records: Vec<ReconciliationRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> ReconciliationResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> ReconciliationResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ReconciliationResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> ReconciliationResult<RwLockReadGuard<'_, Vec<ReconciliationRecord>>> {
        self.records
            .read()
            .map_err(|_| ReconciliationError::Source("record lock poisoned".to_string()))
    }

    fn write(&self) -> ReconciliationResult<RwLockWriteGuard<'_, Vec<ReconciliationRecord>>> {
        self.records
            .write()
            .map_err(|_| ReconciliationError::Source("record lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn fetch_records(&self) -> ReconciliationResult<Vec<ReconciliationRecord>> {
        Ok(self.read()?.clone())
    }

    async fn get_record(
        &self,
        id: &RecordId,
    ) -> ReconciliationResult<Option<ReconciliationRecord>> {
        Ok(self.read()?.iter().find(|r| &r.id == id).cloned())
    }

    async fn save_record(&mut self, record: &ReconciliationRecord) -> ReconciliationResult<()> {
        let mut records = self.write()?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(ReconciliationError::DuplicateRecord(record.id.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn update_record(&mut self, record: &ReconciliationRecord) -> ReconciliationResult<()> {
        let mut records = self.write()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(ReconciliationError::RecordNotFound(record.id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[tokio::test]
    async fn test_save_keeps_insertion_order() {
        let mut source = MemoryRecordSource::new();
        for id in [3i64, 1, 2] {
            source
                .save_record(&ReconciliationRecord::new(
                    id,
                    format!("Deposit {}", id),
                    BigDecimal::from(10),
                ))
                .await
                .unwrap();
        }

        let ids: Vec<RecordId> = source
            .fetch_records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(
            ids,
            vec![RecordId::Number(3), RecordId::Number(1), RecordId::Number(2)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_records() {
        let record = ReconciliationRecord::new("po_1", "Payout".to_string(), BigDecimal::from(10));
        let mut source = MemoryRecordSource::new();
        source.save_record(&record).await.unwrap();

        assert!(matches!(
            source.save_record(&record).await,
            Err(ReconciliationError::DuplicateRecord(_))
        ));

        let stranger =
            ReconciliationRecord::new("po_2", "Payout".to_string(), BigDecimal::from(10));
        assert!(matches!(
            source.update_record(&stranger).await,
            Err(ReconciliationError::RecordNotFound(_))
        ));

        assert_eq!(source.len().unwrap(), 1);
        source.clear().unwrap();
        assert!(source.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_reported() {
        let source = MemoryRecordSource::with_records(vec![ReconciliationRecord::new(
            1i64,
            "Deposit".to_string(),
            BigDecimal::from(10),
        )]);

        let shared = source.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.records.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(source.len(), Err(ReconciliationError::Source(_))));
        assert!(matches!(source.is_empty(), Err(ReconciliationError::Source(_))));
        assert!(source.fetch_records().await.is_err());
    }
}
