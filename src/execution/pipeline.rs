//! The filter pipeline: fixed-order stage composition followed by encoding.

use crate::core::error::PipelineError;
use crate::core::raster::RasterBuffer;
use crate::core::types::{OutputFormat, OutputSpec};
use crate::filters::config::{EnabledFilters, FilterConfiguration, FilterKey, FilterKind};
use crate::filters::stage::FilterStage;
use std::time::Instant;

/// Outcome of one pipeline run.
pub type PipelineResult = Result<PipelineOutput, PipelineError>;

/// A successfully filtered and encoded image.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The filtered pixels, before encoding.
    pub raster: RasterBuffer,
    /// Keys that were applied, in the order they ran.
    pub applied: Vec<FilterKey>,
    /// Container the bytes are encoded in.
    pub format: OutputFormat,
    /// Complete encoded image.
    pub bytes: Vec<u8>,
}

impl PipelineOutput {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Applied keys as their wire names.
    pub fn applied_names(&self) -> Vec<&'static str> {
        self.applied.iter().map(FilterKey::as_str).collect()
    }
}

/// A prepared stage sequence plus output settings.
///
/// Construction resolves which stages run and with which parameter:
///
/// - brightness, contrast, saturation and blur take their configured value
///   only when their key is enabled, and their neutral value otherwise;
/// - the boolean effects run when their flag is set or their key is enabled;
/// - blur at intensity 0 is skipped and not reported as applied.
///
/// Stages always run in [`FilterKey`] order (brightness, contrast,
/// saturation, vintage, edge detection, sharpen, face detection, blur), and
/// encoding happens last. A pipeline holds no pixel data and can be shared
/// freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPipeline {
    effective: FilterConfiguration,
    stages: Vec<FilterStage>,
    output: OutputSpec,
}

impl FilterPipeline {
    pub fn new(config: &FilterConfiguration, enabled: &EnabledFilters, output: OutputSpec) -> Self {
        let effective = effective_config(config, enabled);

        let stages = FilterKey::all()
            .iter()
            .copied()
            .filter(|key| is_applied(*key, &effective, enabled))
            .map(|key| FilterStage::from_config(key, &effective))
            .collect();

        Self {
            effective,
            stages,
            output,
        }
    }

    /// Pipeline that enables every key whose configured value is not neutral.
    pub fn from_config(config: &FilterConfiguration, output: OutputSpec) -> Self {
        Self::new(config, &EnabledFilters::from_config(config), output)
    }

    /// Configuration after applying the enabled-key rules.
    ///
    /// Two requests that produce the same effective configuration produce
    /// the same pixels, so this is what fingerprints are computed from.
    pub fn effective_config(&self) -> &FilterConfiguration {
        &self.effective
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn applied_keys(&self) -> Vec<FilterKey> {
        self.stages.iter().map(FilterStage::key).collect()
    }

    pub fn output(&self) -> OutputSpec {
        self.output
    }

    /// Whether running this pipeline leaves every pixel as it was.
    pub fn is_identity(&self) -> bool {
        self.stages.iter().all(|stage| !stage.modifies_pixels())
    }

    /// Run every stage without encoding.
    pub fn apply(&self, raster: RasterBuffer) -> RasterBuffer {
        self.stages.iter().fold(raster, |raster, stage| {
            let started = Instant::now();
            let out = stage.apply(raster);
            log::debug!("Applied {} in {:?}", stage, started.elapsed());
            out
        })
    }

    /// Run every stage, then encode.
    pub fn run(&self, raster: RasterBuffer) -> PipelineResult {
        let raster = self.apply(raster);
        let bytes = raster.encode(self.output)?;

        log::debug!(
            "Encoded {}x{} raster as {} ({} bytes)",
            raster.width(),
            raster.height(),
            self.output.format,
            bytes.len()
        );

        Ok(PipelineOutput {
            raster,
            applied: self.applied_keys(),
            format: self.output.format,
            bytes,
        })
    }

    /// Decode `bytes`, then [`run`](Self::run).
    pub fn run_bytes(&self, bytes: &[u8]) -> PipelineResult {
        let raster = RasterBuffer::decode(bytes)?;
        self.run(raster)
    }
}

/// One-shot form of [`FilterPipeline::run`].
pub fn run(
    raster: RasterBuffer,
    config: &FilterConfiguration,
    enabled: &EnabledFilters,
    output: OutputSpec,
) -> PipelineResult {
    FilterPipeline::new(config, enabled, output).run(raster)
}

fn effective_config(config: &FilterConfiguration, enabled: &EnabledFilters) -> FilterConfiguration {
    let mut effective = *config;
    for key in FilterKey::all().iter().copied() {
        match (key.neutral_intensity(), config.flag(key)) {
            (Some(neutral), _) if !enabled.contains(key) => effective.set(key, neutral as i64),
            (Some(_), _) => {
                if let Some(value) = config.intensity(key) {
                    effective.set(key, value as i64);
                }
            }
            (_, Some(on)) => effective.set(key, (on || enabled.contains(key)) as i64),
            _ => {}
        }
    }
    effective
}

fn is_applied(key: FilterKey, effective: &FilterConfiguration, enabled: &EnabledFilters) -> bool {
    match key.kind() {
        FilterKind::Tonal => enabled.contains(key),
        FilterKind::PostProcess => enabled.contains(key) && effective.intensity(key).unwrap_or(0) > 0,
        FilterKind::Effect => effective.flag(key).unwrap_or(false),
    }
}
