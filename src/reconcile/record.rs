//! Derivative records and their status lifecycle.

use crate::core::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a derivative.
///
/// `Pending` and `Processing` only move forward; `Completed` and `Failed` are
/// terminal. Re-running a filter creates a new record instead of touching a
/// terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivativeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DerivativeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DerivativeStatus::Completed | DerivativeStatus::Failed)
    }

    /// Whether a record in this status may move to `next`.
    pub fn can_transition_to(&self, next: DerivativeStatus) -> bool {
        use DerivativeStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Pending, Completed) | (Pending, Failed) | (Processing, Completed) | (Processing, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivativeStatus::Pending => "pending",
            DerivativeStatus::Processing => "processing",
            DerivativeStatus::Completed => "completed",
            DerivativeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DerivativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One derivative produced (or being produced) from an original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivativeRecord {
    /// Monotonic; a larger id was created later.
    pub id: u64,
    pub original_base_name: String,
    /// Derivative file name, possibly carrying a storage-key prefix.
    pub name: String,
    pub status: DerivativeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DerivativeRecord {
    /// A new pending record.
    pub fn pending(id: u64, original_base_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            original_base_name: original_base_name.into(),
            name: name.into(),
            status: DerivativeStatus::Pending,
            url: None,
            params_hash: None,
            error_message: None,
        }
    }

    pub fn with_params_hash(mut self, hash: impl Into<String>) -> Self {
        self.params_hash = Some(hash.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == DerivativeStatus::Completed
    }

    /// Move to `next`, rejecting backward moves and changes to terminal records.
    pub fn transition(&mut self, next: DerivativeStatus) -> Result<(), ReconcileError> {
        if !self.status.can_transition_to(next) {
            return Err(ReconcileError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn start_processing(&mut self) -> Result<(), ReconcileError> {
        self.transition(DerivativeStatus::Processing)
    }

    pub fn complete(&mut self, url: impl Into<String>) -> Result<(), ReconcileError> {
        self.transition(DerivativeStatus::Completed)?;
        self.url = Some(url.into());
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ReconcileError> {
        self.transition(DerivativeStatus::Failed)?;
        self.error_message = Some(message.into());
        Ok(())
    }
}
