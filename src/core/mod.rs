//! Core types for the pixbatch filter pipeline.
//!
//! This module contains the foundational types everything else builds on:
//! - The owned RGBA raster
//! - Output formats and quality
//! - Error types

pub mod error;
pub mod raster;
pub mod types;

// Re-export commonly used types
pub use error::{
    ConfigError, DecodeError, EncodeError, PipelineError, PixbatchError, ReconcileError,
    UnsupportedFormatError,
};
pub use raster::RasterBuffer;
pub use types::{ImageId, OutputFormat, OutputSpec, Quality};
