//! Filter catalog, configuration and the pixel transforms themselves.

pub mod blur;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod stage;
pub mod tonal;

pub use catalog::{FilterCatalog, FilterCategory, FilterDescriptor};
pub use config::{EnabledFilters, FilterConfiguration, FilterKey, FilterKind, MAX_INTENSITY, NEUTRAL_INTENSITY};
pub use stage::FilterStage;
