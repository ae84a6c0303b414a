use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use time::{macros::format_description, Date};

use super::breakdown::format_currency;

/// One historical sale used as a peer reference.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparableRecord {
    pub address: String,
    pub suburb: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking: Option<u32>,
    /// Whole dollars.
    pub price: Option<u64>,
    /// Square metres.
    pub land_size: Option<f64>,
    #[serde(serialize_with = "serialize_date")]
    pub sale_date: Option<Date>,
    /// House, Townhouse, Unit, ...
    pub property_type: Option<String>,
    /// Selling agency office.
    pub office: Option<String>,
}

impl ComparableRecord {
    pub fn new(address: impl Into<String>, suburb: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            suburb: suburb.into(),
            bedrooms: None,
            bathrooms: None,
            parking: None,
            price: None,
            land_size: None,
            sale_date: None,
            property_type: None,
            office: None,
        }
    }

    pub fn with_price(mut self, price: u64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_rooms(mut self, bedrooms: u32, bathrooms: u32, parking: u32) -> Self {
        self.bedrooms = Some(bedrooms);
        self.bathrooms = Some(bathrooms);
        self.parking = Some(parking);
        self
    }

    pub fn with_bedrooms(mut self, bedrooms: u32) -> Self {
        self.bedrooms = Some(bedrooms);
        self
    }

    pub fn with_land_size(mut self, land_size: f64) -> Self {
        self.land_size = Some(land_size);
        self
    }

    pub fn with_sale_date(mut self, sale_date: Date) -> Self {
        self.sale_date = Some(sale_date);
        self
    }

    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    pub fn with_office(mut self, office: impl Into<String>) -> Self {
        self.office = Some(office.into());
        self
    }

    /// Projection used by tables and JSON output.
    pub fn to_view(&self) -> ComparableView {
        ComparableView {
            address: self.address.clone(),
            suburb: self.suburb.clone(),
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            parking: self.parking,
            price: format_currency(self.price.map(|p| p as f64)),
            land: self
                .land_size
                .map(|size| format!("{size:.0} m²"))
                .unwrap_or_else(|| "N/A".to_string()),
            sale_date: self
                .sale_date
                .and_then(|date| format_iso_date(date).ok())
                .unwrap_or_else(|| "N/A".to_string()),
            property_type: text_or_na(self.property_type.as_deref()),
            office: text_or_na(self.office.as_deref()),
        }
    }
}

fn text_or_na(value: Option<&str>) -> String {
    value.unwrap_or("N/A").to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparableView {
    pub address: String,
    pub suburb: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking: Option<u32>,
    pub price: String,
    pub land: String,
    pub sale_date: String,
    pub property_type: String,
    pub office: String,
}

pub(crate) fn format_iso_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}

fn serialize_date<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => {
            let text = format_iso_date(*date).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&text)
        }
        None => serializer.serialize_none(),
    }
}

/// Attributes of the property being priced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EstimateQuery {
    pub suburb: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking: Option<u32>,
    pub land_size: Option<f64>,
    /// Building age in whole years.
    pub building_age: Option<u32>,
    /// Section identifier -> quality level identifier.
    pub quality: BTreeMap<String, String>,
    pub features: BTreeSet<String>,
}

impl EstimateQuery {
    pub fn new(suburb: impl Into<String>) -> Self {
        Self {
            suburb: suburb.into(),
            ..Self::default()
        }
    }

    pub fn with_bedrooms(mut self, bedrooms: u32) -> Self {
        self.bedrooms = Some(bedrooms);
        self
    }

    pub fn with_bathrooms(mut self, bathrooms: u32) -> Self {
        self.bathrooms = Some(bathrooms);
        self
    }

    pub fn with_parking(mut self, parking: u32) -> Self {
        self.parking = Some(parking);
        self
    }

    pub fn with_land_size(mut self, land_size: f64) -> Self {
        self.land_size = Some(land_size);
        self
    }

    pub fn with_building_age(mut self, years: u32) -> Self {
        self.building_age = Some(years);
        self
    }

    pub fn with_quality(mut self, section: impl Into<String>, level: impl Into<String>) -> Self {
        self.quality.insert(section.into(), level.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    /// Blank suburbs widen the peer group to the whole dataset.
    pub fn suburb_filter(&self) -> Option<&str> {
        let trimmed = self.suburb.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// A part of the home that can be rated (kitchen, bathrooms, ...).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualitySection {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualityLevel {
    pub id: String,
    pub label: String,
    pub multiplier: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureOption {
    pub id: String,
    pub label: String,
    /// Flat dollar amount added when selected.
    pub adjustment: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownLine {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_comparable_count(count: usize) -> Self {
        match count {
            n if n >= 8 => Confidence::High,
            n if n >= 3 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }

    /// Half-width of the price range as a fraction of the estimate.
    pub fn spread(&self) -> f64 {
        match self {
            Confidence::Low => 0.12,
            Confidence::Medium => 0.08,
            Confidence::High => 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
    pub display: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EstimateResult {
    pub estimate: f64,
    pub display: String,
    pub breakdown: Vec<BreakdownLine>,
    pub comparables: Vec<ComparableRecord>,
    pub confidence: Confidence,
    pub range: PriceRange,
}
