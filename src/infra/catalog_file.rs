//! Optional JSON file that replaces the built-in quality and feature catalogs.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::{CatalogError, Catalogs, FeatureOption, QualityLevel, QualitySection};

#[derive(Debug, Error)]
pub enum CatalogFileError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
    #[serde(default, alias = "levels")]
    pub quality_levels: Vec<LevelEntry>,
    #[serde(default)]
    pub features: Vec<FeatureEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionEntry {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelEntry {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(alias = "value", alias = "bonus")]
    pub adjustment: f64,
}

impl TryFrom<CatalogFile> for Catalogs {
    type Error = CatalogError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        let label = |id: &str, label: Option<String>| label.unwrap_or_else(|| id.to_string());

        let sections = file
            .sections
            .into_iter()
            .map(|entry| QualitySection {
                label: label(&entry.id, entry.label),
                id: entry.id,
            })
            .collect();
        let levels = file
            .quality_levels
            .into_iter()
            .map(|entry| QualityLevel {
                label: label(&entry.id, entry.label),
                id: entry.id,
                multiplier: entry.multiplier,
            })
            .collect();
        let features = file
            .features
            .into_iter()
            .map(|entry| FeatureOption {
                label: label(&entry.id, entry.label),
                id: entry.id,
                adjustment: entry.adjustment,
            })
            .collect();

        Catalogs::new(sections, levels, features)
    }
}

pub fn parse_catalogs(content: &str) -> Result<Catalogs, CatalogFileError> {
    let file: CatalogFile = serde_json::from_str(content)?;
    Ok(Catalogs::try_from(file)?)
}

pub fn load_catalogs(path: &Path) -> Result<Catalogs, CatalogFileError> {
    let catalogs = parse_catalogs(&fs::read_to_string(path)?)?;
    info!(
        path = %path.display(),
        levels = catalogs.levels().len(),
        features = catalogs.features().len(),
        "loaded catalog file"
    );
    Ok(catalogs)
}
