//! Static quality and feature catalogs.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::entities::{FeatureOption, QualityLevel, QualitySection};

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate {kind} identifier: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("quality level {0} must have a positive multiplier")]
    InvalidMultiplier(String),
    #[error("feature {0} must have a finite adjustment")]
    InvalidAdjustment(String),
}

/// Lookup tables keyed by identifier, built once and then read-only.
#[derive(Clone, Debug)]
pub struct Catalogs {
    sections: Vec<QualitySection>,
    levels: Vec<QualityLevel>,
    features: Vec<FeatureOption>,
    level_index: HashMap<String, usize>,
    feature_index: HashMap<String, usize>,
}

impl Catalogs {
    pub fn new(
        sections: Vec<QualitySection>,
        levels: Vec<QualityLevel>,
        features: Vec<FeatureOption>,
    ) -> Result<Self, CatalogError> {
        let mut seen_sections = HashSet::new();
        for section in &sections {
            if !seen_sections.insert(section.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "section",
                    id: section.id.clone(),
                });
            }
        }

        let mut seen_levels = HashSet::new();
        for level in &levels {
            if !(level.multiplier.is_finite() && level.multiplier > 0.0) {
                return Err(CatalogError::InvalidMultiplier(level.id.clone()));
            }
            if !seen_levels.insert(level.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "quality level",
                    id: level.id.clone(),
                });
            }
        }

        let mut seen_features = HashSet::new();
        for feature in &features {
            if !feature.adjustment.is_finite() {
                return Err(CatalogError::InvalidAdjustment(feature.id.clone()));
            }
            if !seen_features.insert(feature.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "feature",
                    id: feature.id.clone(),
                });
            }
        }

        Ok(Self::from_tables(sections, levels, features))
    }

    fn from_tables(
        sections: Vec<QualitySection>,
        levels: Vec<QualityLevel>,
        features: Vec<FeatureOption>,
    ) -> Self {
        let level_index = levels
            .iter()
            .enumerate()
            .map(|(idx, level)| (level.id.clone(), idx))
            .collect();
        let feature_index = features
            .iter()
            .enumerate()
            .map(|(idx, feature)| (feature.id.clone(), idx))
            .collect();
        Self {
            sections,
            levels,
            features,
            level_index,
            feature_index,
        }
    }

    pub fn sections(&self) -> &[QualitySection] {
        &self.sections
    }

    pub fn levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    pub fn features(&self) -> &[FeatureOption] {
        &self.features
    }

    pub fn level(&self, id: &str) -> Option<&QualityLevel> {
        self.level_index.get(id).map(|&idx| &self.levels[idx])
    }

    pub fn feature(&self, id: &str) -> Option<&FeatureOption> {
        self.feature_index.get(id).map(|&idx| &self.features[idx])
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        let sections = [
            ("kitchen", "Kitchen"),
            ("bathrooms", "Bathrooms"),
            ("living", "Living areas"),
            ("exterior", "Exterior"),
            ("landscaping", "Gardens & landscaping"),
        ]
        .into_iter()
        .map(|(id, label)| QualitySection {
            id: id.to_string(),
            label: label.to_string(),
        })
        .collect();

        let levels = [
            ("needs_work", "Needs work", 0.85),
            ("original", "Original condition", 0.95),
            ("standard", "Well maintained", 1.0),
            ("renovated", "Renovated", 1.1),
            ("premium", "Premium / architect finish", 1.2),
        ]
        .into_iter()
        .map(|(id, label, multiplier)| QualityLevel {
            id: id.to_string(),
            label: label.to_string(),
            multiplier,
        })
        .collect();

        let features = [
            ("pool", "Swimming pool", 30_000.0),
            ("solar", "Solar panels", 10_000.0),
            ("ducted_heating", "Ducted heating & cooling", 12_000.0),
            ("double_garage", "Double garage", 18_000.0),
            ("ensuite", "Ensuite", 15_000.0),
            ("granny_flat", "Granny flat", 60_000.0),
            ("views", "Views", 25_000.0),
        ]
        .into_iter()
        .map(|(id, label, adjustment)| FeatureOption {
            id: id.to_string(),
            label: label.to_string(),
            adjustment,
        })
        .collect();

        Self::from_tables(sections, levels, features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: &str, multiplier: f64) -> QualityLevel {
        QualityLevel {
            id: id.to_string(),
            label: id.to_string(),
            multiplier,
        }
    }

    #[test]
    fn defaults_are_populated() {
        let catalogs = Catalogs::default();
        assert_eq!(catalogs.sections().len(), 5);
        assert_eq!(catalogs.level("renovated").map(|l| l.multiplier), Some(1.1));
        assert_eq!(catalogs.feature("pool").map(|f| f.adjustment), Some(30_000.0));
        assert!(catalogs.feature("helipad").is_none());
    }

    #[test]
    fn rejects_duplicate_levels() {
        let err = Catalogs::new(vec![], vec![level("a", 1.0), level("a", 1.1)], vec![]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateId {
                kind: "quality level",
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn rejects_non_positive_multiplier() {
        let err = Catalogs::new(vec![], vec![level("broken", 0.0)], vec![]).unwrap_err();
        assert_eq!(err, CatalogError::InvalidMultiplier("broken".to_string()));
    }
}
