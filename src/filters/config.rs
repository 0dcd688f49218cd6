//! Filter keys, filter configurations and the enabled-key set.
//!
//! The filter catalog is closed: [`FilterKey`] enumerates every filter the
//! pipeline knows, in pipeline order, so dispatch is an exhaustive `match`
//! rather than a string lookup.
//!
//! A [`FilterConfiguration`] holds one parameter per key. It deserializes from
//! the camelCase map the upload layer sends (`{"brightness": 75,
//! "edgeDetection": true}`); unknown keys are ignored and numbers outside
//! 0-100 are clamped instead of rejected.

use crate::core::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Value at which brightness, contrast and saturation leave pixels unchanged.
pub const NEUTRAL_INTENSITY: u8 = 50;

/// Upper bound of every intensity; larger values are clamped to it.
pub const MAX_INTENSITY: u8 = 100;

/// Every filter the pipeline can run, declared in pipeline order.
///
/// The derived `Ord` follows declaration order, which is the fixed execution
/// order; sorting a set of keys therefore yields the order they run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    Brightness,
    Contrast,
    Saturation,
    Vintage,
    EdgeDetection,
    Sharpen,
    FaceDetection,
    Blur,
}

/// How a filter is parameterized and where it sits in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Intensity-driven global color adjustment (brightness/contrast/saturation).
    Tonal,
    /// Boolean-gated, parameterless transform.
    Effect,
    /// Intensity-driven transform applied after everything else (blur).
    PostProcess,
}

impl FilterKey {
    /// All keys in pipeline order.
    pub fn all() -> &'static [FilterKey] {
        &[
            FilterKey::Brightness,
            FilterKey::Contrast,
            FilterKey::Saturation,
            FilterKey::Vintage,
            FilterKey::EdgeDetection,
            FilterKey::Sharpen,
            FilterKey::FaceDetection,
            FilterKey::Blur,
        ]
    }

    /// The wire name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Brightness => "brightness",
            FilterKey::Contrast => "contrast",
            FilterKey::Saturation => "saturation",
            FilterKey::Vintage => "vintage",
            FilterKey::EdgeDetection => "edgeDetection",
            FilterKey::Sharpen => "sharpen",
            FilterKey::FaceDetection => "faceDetection",
            FilterKey::Blur => "blur",
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterKey::Brightness | FilterKey::Contrast | FilterKey::Saturation => {
                FilterKind::Tonal
            }
            FilterKey::Vintage
            | FilterKey::EdgeDetection
            | FilterKey::Sharpen
            | FilterKey::FaceDetection => FilterKind::Effect,
            FilterKey::Blur => FilterKind::PostProcess,
        }
    }

    /// Whether this key takes a 0-100 intensity rather than a flag.
    pub fn is_intensity(&self) -> bool {
        self.kind() != FilterKind::Effect
    }

    /// The intensity at which this filter does nothing, for intensity keys.
    pub fn neutral_intensity(&self) -> Option<u8> {
        match self.kind() {
            FilterKind::Tonal => Some(NEUTRAL_INTENSITY),
            FilterKind::PostProcess => Some(0),
            FilterKind::Effect => None,
        }
    }
}

impl FromStr for FilterKey {
    type Err = ConfigError;

    /// Accepts the camelCase wire names as well as snake_case and
    /// lower-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        FilterKey::all()
            .iter()
            .copied()
            .find(|key| key.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ConfigError::UnknownFilter(s.to_string()))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One parameter per filter key.
///
/// Defaults are neutral: tonal keys at 50, blur at 0, every flag off. A
/// default configuration therefore leaves a raster unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawFilterConfiguration")]
pub struct FilterConfiguration {
    pub brightness: u8,
    pub contrast: u8,
    pub saturation: u8,
    pub blur: u8,
    pub sharpen: bool,
    pub vintage: bool,
    pub edge_detection: bool,
    pub face_detection: bool,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            brightness: NEUTRAL_INTENSITY,
            contrast: NEUTRAL_INTENSITY,
            saturation: NEUTRAL_INTENSITY,
            blur: 0,
            sharpen: false,
            vintage: false,
            edge_detection: false,
            face_detection: false,
        }
    }
}

impl FilterConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON preset.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a TOML preset.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_brightness(mut self, value: i64) -> Self {
        self.set(FilterKey::Brightness, value);
        self
    }

    pub fn with_contrast(mut self, value: i64) -> Self {
        self.set(FilterKey::Contrast, value);
        self
    }

    pub fn with_saturation(mut self, value: i64) -> Self {
        self.set(FilterKey::Saturation, value);
        self
    }

    pub fn with_blur(mut self, value: i64) -> Self {
        self.set(FilterKey::Blur, value);
        self
    }

    pub fn with_flag(mut self, key: FilterKey, on: bool) -> Self {
        self.set(key, on as i64);
        self
    }

    /// Set any key from an integer.
    ///
    /// Intensity keys are clamped to 0-100; flag keys are on for any non-zero
    /// value.
    pub fn set(&mut self, key: FilterKey, value: i64) {
        let intensity = value.clamp(0, MAX_INTENSITY as i64) as u8;
        let flag = value != 0;
        match key {
            FilterKey::Brightness => self.brightness = intensity,
            FilterKey::Contrast => self.contrast = intensity,
            FilterKey::Saturation => self.saturation = intensity,
            FilterKey::Blur => self.blur = intensity,
            FilterKey::Vintage => self.vintage = flag,
            FilterKey::EdgeDetection => self.edge_detection = flag,
            FilterKey::Sharpen => self.sharpen = flag,
            FilterKey::FaceDetection => self.face_detection = flag,
        }
    }

    /// The intensity of an intensity key, `None` for flag keys.
    pub fn intensity(&self, key: FilterKey) -> Option<u8> {
        match key {
            FilterKey::Brightness => Some(self.brightness),
            FilterKey::Contrast => Some(self.contrast),
            FilterKey::Saturation => Some(self.saturation),
            FilterKey::Blur => Some(self.blur),
            _ => None,
        }
    }

    /// The state of a flag key, `None` for intensity keys.
    pub fn flag(&self, key: FilterKey) -> Option<bool> {
        match key {
            FilterKey::Vintage => Some(self.vintage),
            FilterKey::EdgeDetection => Some(self.edge_detection),
            FilterKey::Sharpen => Some(self.sharpen),
            FilterKey::FaceDetection => Some(self.face_detection),
            _ => None,
        }
    }

    /// Whether `key` is at its do-nothing setting.
    pub fn is_neutral(&self, key: FilterKey) -> bool {
        match (self.intensity(key), key.neutral_intensity()) {
            (Some(value), Some(neutral)) => value == neutral,
            _ => !self.flag(key).unwrap_or(false),
        }
    }
}

/// Wire shape of a configuration before clamping.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawFilterConfiguration {
    brightness: Option<f64>,
    contrast: Option<f64>,
    saturation: Option<f64>,
    blur: Option<f64>,
    sharpen: Option<bool>,
    vintage: Option<bool>,
    edge_detection: Option<bool>,
    face_detection: Option<bool>,
}

fn clamp_intensity(value: Option<f64>, fallback: u8) -> u8 {
    match value {
        Some(v) if !v.is_nan() => v.round().clamp(0.0, 100.0) as u8,
        _ => fallback,
    }
}

impl From<RawFilterConfiguration> for FilterConfiguration {
    fn from(raw: RawFilterConfiguration) -> Self {
        let defaults = FilterConfiguration::default();
        Self {
            brightness: clamp_intensity(raw.brightness, defaults.brightness),
            contrast: clamp_intensity(raw.contrast, defaults.contrast),
            saturation: clamp_intensity(raw.saturation, defaults.saturation),
            blur: clamp_intensity(raw.blur, defaults.blur),
            sharpen: raw.sharpen.unwrap_or(defaults.sharpen),
            vintage: raw.vintage.unwrap_or(defaults.vintage),
            edge_detection: raw.edge_detection.unwrap_or(defaults.edge_detection),
            face_detection: raw.face_detection.unwrap_or(defaults.face_detection),
        }
    }
}

/// The set of filters a caller explicitly switched on.
///
/// Iteration yields keys in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledFilters(BTreeSet<FilterKey>);

impl EnabledFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every filter enabled.
    pub fn all() -> Self {
        FilterKey::all().iter().copied().collect()
    }

    /// Enable exactly the keys whose configured value is not neutral.
    ///
    /// Useful for callers that only have a configuration and no separate
    /// toggle state.
    pub fn from_config(config: &FilterConfiguration) -> Self {
        FilterKey::all()
            .iter()
            .copied()
            .filter(|key| !config.is_neutral(*key))
            .collect()
    }

    /// Enable keys by wire name, ignoring names that are not filters.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| match name.as_ref().parse::<FilterKey>() {
                Ok(key) => Some(key),
                Err(_) => {
                    log::debug!("Ignoring unknown filter key '{}'", name.as_ref());
                    None
                }
            })
            .collect()
    }

    pub fn with(mut self, key: FilterKey) -> Self {
        self.insert(key);
        self
    }

    pub fn insert(&mut self, key: FilterKey) -> bool {
        self.0.insert(key)
    }

    pub fn remove(&mut self, key: FilterKey) -> bool {
        self.0.remove(&key)
    }

    pub fn contains(&self, key: FilterKey) -> bool {
        self.0.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FilterKey> for EnabledFilters {
    fn from_iter<I: IntoIterator<Item = FilterKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
