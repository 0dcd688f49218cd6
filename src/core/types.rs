//! Plain value types shared by the pipeline, the batch processor and the
//! reconciliation layer.

use crate::core::error::UnsupportedFormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output container formats.
///
/// PNG and WebP are written losslessly; JPEG honours [`Quality`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// All supported formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::WebP]
    }

    /// Get the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    /// MIME type of the encoded output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Whether [`Quality`] has any effect on the encoded bytes.
    pub fn is_lossy(&self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(UnsupportedFormatError {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "PNG"),
            OutputFormat::Jpeg => write!(f, "JPEG"),
            OutputFormat::WebP => write!(f, "WebP"),
        }
    }
}

/// Quality setting for lossy encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    /// Build from a 0.0-1.0 fraction, the scale browsers use for `toBlob`.
    pub fn from_fraction(fraction: f32) -> Self {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction };
        Self::new((fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Requested output container and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputSpec {
    pub format: OutputFormat,
    #[serde(default)]
    pub quality: Quality,
}

impl OutputSpec {
    pub fn new(format: OutputFormat, quality: Quality) -> Self {
        Self { format, quality }
    }

    /// Lossless PNG, the default container.
    pub fn png() -> Self {
        Self::new(OutputFormat::Png, Quality::default())
    }

    pub fn jpeg(quality: Quality) -> Self {
        Self::new(OutputFormat::Jpeg, quality)
    }
}

/// Caller-supplied identity of a source image inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ImageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!(".webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);

        let err = "gif".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.format, "gif");
    }

    #[test]
    fn test_format_content_types() {
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(!OutputFormat::WebP.is_lossy());
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
    }

    #[test]
    fn test_quality_clamps() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(75).value(), 75);
        assert_eq!(Quality::new(400).value(), 100);
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn test_quality_from_fraction() {
        assert_eq!(Quality::from_fraction(0.9).value(), 90);
        assert_eq!(Quality::from_fraction(2.0).value(), 100);
        assert_eq!(Quality::from_fraction(-1.0).value(), 1);
        assert_eq!(Quality::from_fraction(f32::NAN).value(), 1);
    }

    #[test]
    fn test_image_id_conversions() {
        assert_eq!(ImageId::from(42u64).as_str(), "42");
        assert_eq!(ImageId::from("dawn").to_string(), "dawn");
    }
}
