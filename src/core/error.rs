//! Error types for pixbatch.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Stay local to one image: a pipeline error never escapes a batch
//! - Carry enough context to be shown to a user as-is
//! - Convert into the umbrella [`PixbatchError`] with `?`

use crate::core::types::OutputFormat;
use crate::reconcile::DerivativeStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for pixbatch.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum PixbatchError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Source bytes could not be turned into a raster.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Failed to decode image: {reason}")]
pub struct DecodeError {
    pub reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(error: image::ImageError) -> Self {
        Self::new(error.to_string())
    }
}

/// A raster could not be serialized to the requested container.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Failed to encode {format}: {reason}")]
pub struct EncodeError {
    pub format: OutputFormat,
    pub reason: String,
}

/// The requested output format is not implemented.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Unsupported output format '{format}' (expected png, jpg, jpeg or webp)")]
pub struct UnsupportedFormatError {
    pub format: String,
}

/// Errors from a single pipeline run.
///
/// Inside a batch each of these becomes the `Failure` outcome of one image.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),
}

/// Errors while loading a filter preset.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON preset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML preset: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),
}

/// Errors from derivative bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Derivative {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: u64,
        from: DerivativeStatus,
        to: DerivativeStatus,
    },

    #[error("No derivative with id {0}")]
    UnknownRecord(u64),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl PipelineError {
    /// Short machine-readable label; matches the `kind` tag of the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "decode",
            PipelineError::Encode(_) => "encode",
            PipelineError::UnsupportedFormat(_) => "unsupported_format",
        }
    }

    /// Whether retrying the same image with a different request could succeed.
    ///
    /// A decode failure is a property of the source bytes; the other two depend
    /// on the requested output.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PipelineError::Decode(_))
    }
}

/// Result type alias for pixbatch operations.
pub type PixbatchResult<T> = Result<T, PixbatchError>;

/// Result type alias for preset loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_kinds() {
        let decode: PipelineError = DecodeError::new("truncated").into();
        assert_eq!(decode.kind(), "decode");
        assert!(!decode.is_recoverable());

        let unsupported: PipelineError = UnsupportedFormatError {
            format: "gif".to_string(),
        }
        .into();
        assert_eq!(unsupported.kind(), "unsupported_format");
        assert!(unsupported.is_recoverable());
    }

    #[test]
    fn test_kind_matches_serialized_tag() {
        let errors: Vec<PipelineError> = vec![
            DecodeError::new("truncated").into(),
            EncodeError {
                format: OutputFormat::Png,
                reason: "disk full".to_string(),
            }
            .into(),
            UnsupportedFormatError {
                format: "gif".to_string(),
            }
            .into(),
        ];
        for error in errors {
            let json = serde_json::to_value(&error).unwrap();
            assert_eq!(json["kind"], error.kind());
        }
    }

    #[test]
    fn test_error_messages() {
        let error = EncodeError {
            format: OutputFormat::Jpeg,
            reason: "buffer too large".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to encode JPEG: buffer too large");

        let wrapped = PixbatchError::from(PipelineError::from(error));
        assert!(wrapped.to_string().starts_with("Pipeline error: Failed to encode JPEG"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let error = ReconcileError::InvalidTransition {
            id: 4,
            from: DerivativeStatus::Completed,
            to: DerivativeStatus::Failed,
        };
        assert_eq!(
            error.to_string(),
            "Derivative 4 cannot move from completed to failed"
        );
    }
}
