//! Deduplication, comparison pairing and export listing.
//!
//! Before a batch runs, every original is checked against the derivatives
//! that already exist. A completed derivative whose parameter fingerprint
//! matches the request is reused; everything else is scheduled.

use crate::execution::pipeline::FilterPipeline;
use crate::reconcile::naming::{base_name, strip_storage_prefix};
use crate::reconcile::record::DerivativeRecord;
use crate::reconcile::resolver::DerivativeResolver;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// An original image as the caller knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalImage {
    pub document_id: String,
    pub file_name: String,
}

impl OriginalImage {
    pub fn new(document_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            file_name: file_name.into(),
        }
    }

    pub fn base_name(&self) -> &str {
        base_name(&self.file_name)
    }
}

/// SHA-256 over `"<document_id>:<canonical JSON>"`, as lowercase hex.
///
/// The JSON holds the pipeline's effective filter configuration and its
/// output settings, with object keys sorted. Requests that differ only in
/// disabled parameters get the same fingerprint.
pub fn params_fingerprint(document_id: &str, pipeline: &FilterPipeline) -> serde_json::Result<String> {
    // serde_json maps are ordered by key
    let params = serde_json::json!({
        "filters": serde_json::to_value(pipeline.effective_config())?,
        "output": serde_json::to_value(pipeline.output())?,
    });
    let canonical = serde_json::to_string(&params)?;

    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(b":");
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// What to do with one original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    /// An identical derivative exists already.
    #[serde(rename_all = "camelCase")]
    Reuse { record_id: u64 },
    /// Run the pipeline.
    Process,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub document_id: String,
    pub original_base_name: String,
    pub params_hash: String,
    #[serde(flatten)]
    pub action: PlanAction,
}

/// One original next to its current derivative, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonPair<'a> {
    pub original: &'a OriginalImage,
    pub derivative: Option<&'a DerivativeRecord>,
}

/// A completed derivative ready to be written into an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub record_id: u64,
    /// `<id>_<file name>`, unique within an archive.
    pub archive_name: String,
    pub url: Option<String>,
}

impl ExportEntry {
    fn from_record(record: &DerivativeRecord) -> Self {
        Self {
            record_id: record.id,
            archive_name: format!("{}_{}", record.id, strip_storage_prefix(&record.name)),
            url: record.url.clone(),
        }
    }
}

/// Reconciles originals with existing derivative records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationPlanner {
    resolver: DerivativeResolver,
}

impl ReconciliationPlanner {
    pub fn new(resolver: DerivativeResolver) -> Self {
        Self { resolver }
    }

    /// Decide, per original, between reuse and processing.
    pub fn plan(
        &self,
        originals: &[OriginalImage],
        pipeline: &FilterPipeline,
        existing: &[DerivativeRecord],
    ) -> serde_json::Result<Vec<PlanEntry>> {
        originals
            .iter()
            .map(|original| {
                let params_hash = params_fingerprint(&original.document_id, pipeline)?;
                let reusable = existing
                    .iter()
                    .filter(|r| r.is_completed() && r.params_hash.as_deref() == Some(params_hash.as_str()))
                    .max_by_key(|r| r.id);

                let action = match reusable {
                    Some(record) => {
                        log::debug!("Reusing derivative {} for {}", record.id, original.file_name);
                        PlanAction::Reuse { record_id: record.id }
                    }
                    None => PlanAction::Process,
                };

                Ok(PlanEntry {
                    document_id: original.document_id.clone(),
                    original_base_name: original.base_name().to_string(),
                    params_hash,
                    action,
                })
            })
            .collect()
    }

    /// Pair every original with its current derivative.
    pub fn pair_for_comparison<'a>(
        &self,
        originals: &'a [OriginalImage],
        records: &'a [DerivativeRecord],
    ) -> Vec<ComparisonPair<'a>> {
        originals
            .iter()
            .map(|original| ComparisonPair {
                original,
                derivative: self.resolver.resolve_current(original.base_name(), records),
            })
            .collect()
    }

    /// Current derivatives of `originals`, ready for export.
    ///
    /// Originals without a current derivative are skipped; a derivative
    /// claimed by more than one original is listed once.
    pub fn export_current(&self, originals: &[OriginalImage], records: &[DerivativeRecord]) -> Vec<ExportEntry> {
        let mut seen = std::collections::BTreeSet::new();
        self.pair_for_comparison(originals, records)
            .into_iter()
            .filter_map(|pair| pair.derivative)
            .filter(|record| seen.insert(record.id))
            .map(ExportEntry::from_record)
            .collect()
    }
}

/// Every completed derivative, in id order.
pub fn exportable_derivatives(records: &[DerivativeRecord]) -> Vec<ExportEntry> {
    let mut completed: Vec<&DerivativeRecord> = records.iter().filter(|r| r.is_completed()).collect();
    completed.sort_by_key(|r| r.id);
    completed.into_iter().map(ExportEntry::from_record).collect()
}
