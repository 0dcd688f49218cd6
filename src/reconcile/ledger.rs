//! In-memory bookkeeping of derivative records.

use crate::core::error::ReconcileError;
use crate::core::types::OutputFormat;
use crate::execution::pipeline::PipelineResult;
use crate::reconcile::naming::{base_name, derivative_file_name, storage_key};
use crate::reconcile::record::{DerivativeRecord, DerivativeStatus};
use crate::reconcile::resolver::DerivativeResolver;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out monotonic ids and tracks every record created through it.
///
/// Safe to share between batch workers: ids come from an atomic counter
/// and records sit behind a lock that is held only for the update itself.
#[derive(Debug)]
pub struct DerivativeLedger {
    next_id: AtomicU64,
    records: RwLock<Vec<DerivativeRecord>>,
}

impl DerivativeLedger {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Continue a ledger from existing records; new ids start above the
    /// largest existing one.
    pub fn from_records(records: Vec<DerivativeRecord>) -> Self {
        let next = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            next_id: AtomicU64::new(next),
            records: RwLock::new(records),
        }
    }

    /// Create a pending record for a new run over `original_file_name`.
    ///
    /// The record name is a storage key wrapping the derivative file name.
    pub fn begin(&self, original_file_name: &str, format: OutputFormat, params_hash: Option<String>) -> DerivativeRecord {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = storage_key(&derivative_file_name(original_file_name, format));

        let mut record = DerivativeRecord::pending(id, base_name(original_file_name), name);
        record.params_hash = params_hash;

        log::debug!("Derivative {} created for {}", id, original_file_name);
        self.records.write().push(record.clone());
        record
    }

    pub fn mark_processing(&self, id: u64) -> Result<DerivativeRecord, ReconcileError> {
        self.update(id, |record| record.start_processing())
    }

    /// Settle a record from a pipeline outcome.
    ///
    /// Success completes it with `url`; failure records the error message.
    pub fn finish(&self, id: u64, result: &PipelineResult, url: impl Into<String>) -> Result<DerivativeRecord, ReconcileError> {
        match result {
            Ok(_) => {
                let url = url.into();
                self.update(id, move |record| record.complete(url))
            }
            Err(error) => {
                log::warn!("Derivative {} failed: {}", id, error);
                self.update(id, |record| record.fail(error.to_string()))
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<DerivativeRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn records(&self) -> Vec<DerivativeRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn count_by_status(&self, status: DerivativeStatus) -> usize {
        self.records.read().iter().filter(|r| r.status == status).count()
    }

    /// Current derivative of `original_base_name` under `resolver`.
    pub fn current(&self, resolver: &DerivativeResolver, original_base_name: &str) -> Option<DerivativeRecord> {
        let records = self.records.read();
        resolver.resolve_current(original_base_name, &records).cloned()
    }

    fn update<F>(&self, id: u64, apply: F) -> Result<DerivativeRecord, ReconcileError>
    where
        F: FnOnce(&mut DerivativeRecord) -> Result<(), ReconcileError>,
    {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ReconcileError::UnknownRecord(id))?;
        apply(record)?;
        Ok(record.clone())
    }
}

impl Default for DerivativeLedger {
    fn default() -> Self {
        Self::new()
    }
}
