use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use super::entities::EstimateQuery;
use super::parsing::{lenient_text, parse_count, parse_land_size};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("a suburb is required to select comparable sales")]
    MissingSuburb,
}

/// Raw form or JSON input for an estimate. Numeric fields may arrive as text
/// or numbers and are read with the tolerant parsers.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryInput {
    #[serde(default, deserialize_with = "lenient_text")]
    pub suburb: Option<String>,
    #[serde(default, alias = "bed", alias = "beds", deserialize_with = "lenient_text")]
    pub bedrooms: Option<String>,
    #[serde(default, alias = "bath", alias = "baths", deserialize_with = "lenient_text")]
    pub bathrooms: Option<String>,
    #[serde(default, alias = "garages", alias = "gar", deserialize_with = "lenient_text")]
    pub parking: Option<String>,
    #[serde(default, alias = "land", deserialize_with = "lenient_text")]
    pub land_size: Option<String>,
    #[serde(default, alias = "age", deserialize_with = "lenient_text")]
    pub building_age: Option<String>,
    #[serde(default)]
    pub quality: BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl EstimateQuery {
    pub fn from_input(input: QueryInput, require_suburb: bool) -> Result<Self, QueryError> {
        let suburb = input
            .suburb
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if require_suburb && suburb.is_empty() {
            return Err(QueryError::MissingSuburb);
        }

        let count = |raw: &Option<String>| raw.as_deref().and_then(parse_count);

        let quality = input
            .quality
            .into_iter()
            .map(|(section, level)| (normalize_id(&section), normalize_id(&level)))
            .filter(|(section, level)| !section.is_empty() && !level.is_empty())
            .collect();

        let features = input
            .features
            .iter()
            .map(String::as_str)
            .map(normalize_id)
            .filter(|feature| !feature.is_empty())
            .collect();

        Ok(Self {
            suburb,
            bedrooms: count(&input.bedrooms),
            bathrooms: count(&input.bathrooms),
            parking: count(&input.parking),
            land_size: input
                .land_size
                .as_deref()
                .and_then(parse_land_size)
                .filter(|size| *size > 0.0),
            building_age: count(&input.building_age),
            quality,
            features,
        })
    }
}

fn normalize_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}
