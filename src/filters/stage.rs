//! The closed set of filter stages.

use crate::core::raster::RasterBuffer;
use crate::filters::config::{FilterConfiguration, FilterKey, FilterKind, NEUTRAL_INTENSITY};
use crate::filters::{blur, effects, tonal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One pixel or neighborhood transform together with its parameter.
///
/// Stages are stateless: [`FilterStage::apply`] is a pure function of the
/// input raster and the stage's parameter. The raster is moved in and a
/// raster is moved out, so no two stages ever hold the same pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "filter", content = "intensity", rename_all = "camelCase")]
pub enum FilterStage {
    Brightness(u8),
    Contrast(u8),
    Saturation(u8),
    Vintage,
    EdgeDetection,
    Sharpen,
    /// Recorded as applied; performs no pixel work.
    FaceDetection,
    Blur(u8),
}

impl FilterStage {
    /// Build the stage for `key` using the parameter stored in `config`.
    pub fn from_config(key: FilterKey, config: &FilterConfiguration) -> Self {
        match key {
            FilterKey::Brightness => FilterStage::Brightness(config.brightness),
            FilterKey::Contrast => FilterStage::Contrast(config.contrast),
            FilterKey::Saturation => FilterStage::Saturation(config.saturation),
            FilterKey::Vintage => FilterStage::Vintage,
            FilterKey::EdgeDetection => FilterStage::EdgeDetection,
            FilterKey::Sharpen => FilterStage::Sharpen,
            FilterKey::FaceDetection => FilterStage::FaceDetection,
            FilterKey::Blur => FilterStage::Blur(config.blur),
        }
    }

    pub fn key(&self) -> FilterKey {
        match self {
            FilterStage::Brightness(_) => FilterKey::Brightness,
            FilterStage::Contrast(_) => FilterKey::Contrast,
            FilterStage::Saturation(_) => FilterKey::Saturation,
            FilterStage::Vintage => FilterKey::Vintage,
            FilterStage::EdgeDetection => FilterKey::EdgeDetection,
            FilterStage::Sharpen => FilterKey::Sharpen,
            FilterStage::FaceDetection => FilterKey::FaceDetection,
            FilterStage::Blur(_) => FilterKey::Blur,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.key().kind()
    }

    /// Whether running this stage can change any pixel.
    pub fn modifies_pixels(&self) -> bool {
        match *self {
            FilterStage::Brightness(v) | FilterStage::Contrast(v) | FilterStage::Saturation(v) => {
                v != NEUTRAL_INTENSITY
            }
            FilterStage::Blur(v) => blur::blur_radius(v) > 0,
            FilterStage::FaceDetection => false,
            FilterStage::Vintage | FilterStage::EdgeDetection | FilterStage::Sharpen => true,
        }
    }

    /// Run the stage.
    pub fn apply(&self, raster: RasterBuffer) -> RasterBuffer {
        match *self {
            FilterStage::Brightness(v) => tonal::brightness(raster, v),
            FilterStage::Contrast(v) => tonal::contrast(raster, v),
            FilterStage::Saturation(v) => tonal::saturation(raster, v),
            FilterStage::Vintage => effects::vintage(raster),
            FilterStage::EdgeDetection => effects::edge_detection(raster),
            FilterStage::Sharpen => effects::sharpen(raster),
            FilterStage::FaceDetection => raster,
            FilterStage::Blur(v) => blur::box_blur(raster, v),
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::Brightness(v) | FilterStage::Contrast(v) | FilterStage::Saturation(v) | FilterStage::Blur(v) => {
                write!(f, "{}({})", self.key(), v)
            }
            _ => write!(f, "{}", self.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_round_trips_key() {
        let config = FilterConfiguration::default().with_brightness(70).with_blur(12);
        for key in FilterKey::all() {
            let stage = FilterStage::from_config(*key, &config);
            assert_eq!(stage.key(), *key);
            assert_eq!(stage.kind(), key.kind());
        }
        assert_eq!(
            FilterStage::from_config(FilterKey::Brightness, &config),
            FilterStage::Brightness(70)
        );
    }

    #[test]
    fn test_modifies_pixels() {
        assert!(!FilterStage::Brightness(50).modifies_pixels());
        assert!(FilterStage::Brightness(51).modifies_pixels());
        assert!(!FilterStage::Blur(0).modifies_pixels());
        assert!(FilterStage::Blur(1).modifies_pixels());
        assert!(!FilterStage::FaceDetection.modifies_pixels());
        assert!(FilterStage::Vintage.modifies_pixels());
    }

    #[test]
    fn test_face_detection_is_label_only() {
        let raster = RasterBuffer::filled(4, 4, [1, 2, 3, 4]);
        assert_eq!(FilterStage::FaceDetection.apply(raster.clone()), raster);
    }

    #[test]
    fn test_deserialized_intensity_is_clamped_on_apply() {
        let stage: FilterStage = serde_json::from_str(r#"{"filter":"contrast","intensity":200}"#).unwrap();
        assert_eq!(stage, FilterStage::Contrast(200));

        let raster = RasterBuffer::filled(3, 3, [100, 100, 100, 255]);
        assert_eq!(stage.apply(raster.clone()), FilterStage::Contrast(100).apply(raster));
    }

    #[test]
    fn test_display() {
        assert_eq!(FilterStage::Contrast(80).to_string(), "contrast(80)");
        assert_eq!(FilterStage::EdgeDetection.to_string(), "edgeDetection");
    }
}
