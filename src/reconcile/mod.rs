//! Reconciliation of derivatives with their originals.
//!
//! Tracks the derivative records a batch produces, picks the current one per
//! original, and plans reuse, comparison and export on top of that.

pub mod ledger;
pub mod naming;
pub mod planning;
pub mod record;
pub mod resolver;

pub use ledger::DerivativeLedger;
pub use naming::{base_name, derivative_file_name, storage_key, strip_storage_prefix, DERIVATIVE_PREFIX};
pub use planning::{
    exportable_derivatives, params_fingerprint, ComparisonPair, ExportEntry, OriginalImage, PlanAction, PlanEntry,
    ReconciliationPlanner,
};
pub use record::{DerivativeRecord, DerivativeStatus};
pub use resolver::{DerivativeResolver, MatchPolicy};
