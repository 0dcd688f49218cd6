//! Descriptive catalog of the available filters.
//!
//! The catalog is what a user interface lists: a display name, a category and
//! a one-line description per filter, in presentation order. It has no part in
//! execution; the pipeline dispatches on [`FilterKey`] directly.

use crate::filters::config::{FilterKey, FilterKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Grouping used when presenting filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    /// Everyday adjustments with an intensity slider.
    Basic,
    /// Stylistic effects.
    Advanced,
    /// Analysis-style filters.
    Detection,
}

impl FilterCategory {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterCategory::Basic => "Basic",
            FilterCategory::Advanced => "Advanced",
            FilterCategory::Detection => "Detection",
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [FilterCategory] {
        &[
            FilterCategory::Basic,
            FilterCategory::Advanced,
            FilterCategory::Detection,
        ]
    }
}

/// Catalog entry for one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    pub key: FilterKey,
    pub name: &'static str,
    pub category: FilterCategory,
    pub description: &'static str,
}

impl FilterDescriptor {
    pub fn kind(&self) -> FilterKind {
        self.key.kind()
    }
}

/// All filters, indexed by key, in presentation order.
pub struct FilterCatalog {
    filters: IndexMap<FilterKey, FilterDescriptor>,
}

impl FilterCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        let entries = [
            (FilterKey::Brightness, "Brightness", FilterCategory::Basic, "Adjust image brightness"),
            (FilterKey::Contrast, "Contrast", FilterCategory::Basic, "Enhance contrast levels"),
            (FilterKey::Saturation, "Saturation", FilterCategory::Basic, "Modify color saturation"),
            (FilterKey::Blur, "Blur", FilterCategory::Basic, "Soften the image with a box blur"),
            (FilterKey::Sharpen, "Sharpen", FilterCategory::Advanced, "Enhance image sharpness"),
            (FilterKey::Vintage, "Vintage", FilterCategory::Advanced, "Apply vintage effect"),
            (FilterKey::EdgeDetection, "Edge Detection", FilterCategory::Detection, "Detect edges in image"),
            (
                FilterKey::FaceDetection,
                "Face Detection",
                FilterCategory::Detection,
                "Tag the result for face detection (no pixel changes)",
            ),
        ];

        let filters = entries
            .into_iter()
            .map(|(key, name, category, description)| {
                (
                    key,
                    FilterDescriptor {
                        key,
                        name,
                        category,
                        description,
                    },
                )
            })
            .collect();

        Self { filters }
    }

    pub fn get(&self, key: FilterKey) -> Option<&FilterDescriptor> {
        self.filters.get(&key)
    }

    /// Find a filter by display name (case-insensitive) or wire key.
    pub fn lookup(&self, name: &str) -> Option<&FilterDescriptor> {
        self.filters
            .values()
            .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
            .or_else(|| name.parse::<FilterKey>().ok().and_then(|key| self.get(key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.values()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filters grouped by category, in display order.
    pub fn grouped_by_category(&self) -> IndexMap<FilterCategory, Vec<&FilterDescriptor>> {
        let mut grouped: IndexMap<FilterCategory, Vec<&FilterDescriptor>> = FilterCategory::all()
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();

        for descriptor in self.filters.values() {
            grouped.entry(descriptor.category).or_default().push(descriptor);
        }

        grouped
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_key() {
        let catalog = FilterCatalog::builtin();
        assert_eq!(catalog.len(), FilterKey::all().len());
        for key in FilterKey::all() {
            assert!(catalog.get(*key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_lookup_by_name_or_key() {
        let catalog = FilterCatalog::builtin();
        assert_eq!(catalog.lookup("edge detection").unwrap().key, FilterKey::EdgeDetection);
        assert_eq!(catalog.lookup("faceDetection").unwrap().name, "Face Detection");
        assert!(catalog.lookup("posterize").is_none());
    }

    #[test]
    fn test_grouping() {
        let catalog = FilterCatalog::builtin();
        let grouped = catalog.grouped_by_category();

        let basic: Vec<_> = grouped[&FilterCategory::Basic].iter().map(|d| d.key).collect();
        assert_eq!(
            basic,
            vec![FilterKey::Brightness, FilterKey::Contrast, FilterKey::Saturation, FilterKey::Blur]
        );
        assert_eq!(grouped[&FilterCategory::Detection].len(), 2);
    }
}
